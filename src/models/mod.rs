pub mod ae_include;
pub mod assessment_setup;
pub mod exam;
pub mod grad_score;
pub mod loaders;
pub mod moral_score;
pub mod record;
pub mod sc_attend;
pub mod sce_take;
pub mod semester_score;
pub mod tc_instruct;

pub use ae_include::AEIncludeRecord;
pub use assessment_setup::AssessmentSetupRecord;
pub use exam::ExamRecord;
pub use grad_score::GradScoreRecord;
pub use loaders::{load_all_import_files, load_import_file, ImportFile};
pub use moral_score::MoralScoreRecord;
pub use record::{Record, ServiceNames};
pub use sc_attend::SCAttendRecord;
pub use sce_take::SCETakeRecord;
pub use semester_score::{DomainScore, SemesterScoreRecord, SubjectScore};
pub use tc_instruct::TCInstructRecord;
