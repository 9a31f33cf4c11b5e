//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责批量导入和流程调度，不做具体的记录转换。
//!
//! ### `batch_processor` - 批量导入处理器
//! - 管理应用生命周期（初始化、运行）
//! - 批量加载导入文件（Vec<ImportFile>）
//! - 控制同时处理的文件数（Semaphore）
//! - 输出全局统计与 JSON 报告
//!
//! ### `import_processor` - 单个文件处理器
//! - 依相依顺序写入各实体
//! - 区分新增与更新
//! - 标记已完成的文件
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (处理 Vec<ImportFile>)
//!     ↓
//! import_processor (处理单个 ImportFile)
//!     ↓
//! services (各实体闸道：select / insert / update / delete)
//!     ↓
//! clients (DsaClient：重试)
//!     ↓
//! infrastructure (连接、信封、XML、批次工作器)
//! ```

pub mod batch_processor;
pub mod import_processor;

pub use batch_processor::{App, FileReport, ImportReport};
pub use import_processor::{process_import_file, EntityStats, ImportStats};
