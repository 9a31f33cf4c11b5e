pub mod dsa_client;
pub mod retry;

pub use dsa_client::DsaClient;
pub use retry::{retry_async, RetryPolicy};
