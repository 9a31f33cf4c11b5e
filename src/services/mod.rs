//! 业务能力层（Services）
//!
//! - `gateway` - 对任意记录类型的通用 select / insert / update / delete
//! - `entities` - 各实体的闸道与特有查询，以及汇总的 `Evaluation`

pub mod entities;
pub mod gateway;

pub use entities::{
    AEInclude, AssessmentSetup, Evaluation, Exam, GradScore, MoralScore, SCAttend, SCETake,
    SemesterScore, TCInstruct,
};
pub use gateway::{Gateway, SelectQuery};
