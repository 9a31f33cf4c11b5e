//! # K12 Evaluation
//!
//! 国中小评量系统的数据存取闸道：经由 DSA 服务（XML over HTTP）
//! 查询与批次写入考试别、评量设定、修课、各类成绩等记录。
//!
//! ## 架构设计
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有连接，只暴露能力
//! - `XmlElement` - 轻量 XML 树
//! - `envelope` - DSA 请求 / 回应信封
//! - `ServiceConnection` / `HttpConnection` - 送出请求的唯一通道
//! - `MultiThreadWorker` - 把批次切包并限制并行数量
//!
//! ### ② 客户端（Clients）
//! - `DsaClient` - 读取调用自动重试，写入调用只尝试一次
//!
//! ### ③ 业务能力层（Services）
//! - `Gateway<R>` - 任意记录的 select / insert / update / delete
//! - `Exam`、`SCETake` 等 - 各实体闸道与特有查询
//! - `Evaluation` - 共用同一客户端的全部闸道
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 批量导入文件，管理并发
//! - `orchestrator/import_processor` - 单个文件的依序写入

pub mod clients;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;

// 重新导出常用类型
pub use clients::{DsaClient, RetryPolicy};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use infrastructure::{BatchOptions, ServiceConnection, XmlElement};
pub use models::{ImportFile, Record};
pub use orchestrator::{process_import_file, App, ImportReport, ImportStats};
pub use services::Evaluation;
