pub mod toml_loader;

pub use toml_loader::{load_all_import_files, load_import_file, ImportFile};
