use crate::error::AppResult;
use crate::infrastructure::xml::XmlElement;
use crate::models::assessment_setup::AssessmentSetupRecord;
use crate::models::exam::ExamRecord;
use crate::models::record::{self, Record, ServiceNames};
use crate::services::{AssessmentSetup, Exam};
use serde::{Deserialize, Serialize};

/// 评量设定所包含的考试（含比重与输入项目）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AEIncludeRecord {
    pub id: Option<String>,
    pub ref_assessment_setup_id: String,
    pub ref_exam_id: String,
    /// 比重（百分比）
    pub weight: Option<f64>,
    pub use_score: bool,
    pub use_effort: bool,
    pub use_text: bool,
    /// 开放输入起始时间（依服务端格式）
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub extension: Option<String>,
}

impl AEIncludeRecord {
    /// 所属考试
    pub async fn exam(&self, exams: &Exam) -> AppResult<Option<ExamRecord>> {
        exams.select_by_id(&self.ref_exam_id).await
    }

    /// 所属评量设定
    pub async fn assessment_setup(
        &self,
        setups: &AssessmentSetup,
    ) -> AppResult<Option<AssessmentSetupRecord>> {
        setups.select_by_id(&self.ref_assessment_setup_id).await
    }
}

impl Record for AEIncludeRecord {
    const ELEMENT: &'static str = "AEInclude";
    const SERVICES: ServiceNames = ServiceNames {
        select: "SmartSchool.ExamTemplate.GetIncludeExam",
        insert: "SmartSchool.ExamTemplate.InsertIncludeExam",
        update: "SmartSchool.ExamTemplate.UpdateIncludeExam",
        delete: "SmartSchool.ExamTemplate.DeleteIncludeExam",
    };

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn from_element(element: &XmlElement) -> AppResult<Self> {
        Ok(Self {
            id: record::read_id(element),
            ref_assessment_setup_id: record::read_text(element, "ExamTemplateID"),
            ref_exam_id: record::read_text(element, "RefExamID"),
            weight: record::read_decimal(element, "Weight")?,
            use_score: record::read_flag(element, "UseScore"),
            use_effort: record::read_flag(element, "UseEffort"),
            use_text: record::read_flag(element, "UseText"),
            start_time: record::read_opt_text(element, "StartTime"),
            end_time: record::read_opt_text(element, "EndTime"),
            extension: record::read_fragment(element, "Extension"),
        })
    }

    fn field_elements(&self) -> AppResult<Vec<XmlElement>> {
        Ok(vec![
            record::text_field("ExamTemplateID", &self.ref_assessment_setup_id),
            record::text_field("RefExamID", &self.ref_exam_id),
            record::opt_field("Weight", self.weight),
            record::flag_field("UseScore", self.use_score),
            record::flag_field("UseEffort", self.use_effort),
            record::flag_field("UseText", self.use_text),
            record::opt_field("StartTime", self.start_time.as_deref()),
            record::opt_field("EndTime", self.end_time.as_deref()),
            record::fragment_field("Extension", self.extension.as_deref())?,
        ])
    }
}
