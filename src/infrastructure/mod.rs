//! 基础设施层（Infrastructure）
//!
//! 持有稀缺资源（HTTP 客户端、并发额度），只暴露能力：
//! - `xml` - XML 元素树的解析与序列化
//! - `envelope` - DSA 请求/回应信封
//! - `connection` - 送出服务请求的连接
//! - `worker` - 分包并发执行器

pub mod connection;
pub mod envelope;
pub mod worker;
pub mod xml;

pub use connection::{HttpConnection, ServiceConnection};
pub use worker::{BatchOptions, MultiThreadWorker, Package, PackageOutcome};
pub use xml::{XmlElement, XmlNode};
