use crate::error::AppResult;
use crate::infrastructure::xml::XmlElement;
use crate::models::record::{self, Record, ServiceNames};
use serde::{Deserialize, Serialize};

/// 学生修课记录（课程总成绩）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SCAttendRecord {
    pub id: Option<String>,
    pub ref_student_id: String,
    pub ref_course_id: String,
    pub score: Option<f64>,
    pub effort: Option<i32>,
    pub text: String,
    /// 平时评量
    pub ordinarily_score: Option<f64>,
    pub extension: Option<String>,
}

impl SCAttendRecord {
    pub fn new(ref_student_id: impl Into<String>, ref_course_id: impl Into<String>) -> Self {
        Self {
            ref_student_id: ref_student_id.into(),
            ref_course_id: ref_course_id.into(),
            ..Self::default()
        }
    }
}

impl Record for SCAttendRecord {
    const ELEMENT: &'static str = "SCAttend";
    const SERVICES: ServiceNames = ServiceNames {
        select: "SmartSchool.Course.GetSCAttend",
        insert: "SmartSchool.Course.InsertSCAttend",
        update: "SmartSchool.Course.UpdateSCAttend",
        delete: "SmartSchool.Course.DeleteSCAttend",
    };

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn from_element(element: &XmlElement) -> AppResult<Self> {
        Ok(Self {
            id: record::read_id(element),
            ref_student_id: record::read_text(element, "RefStudentID"),
            ref_course_id: record::read_text(element, "RefCourseID"),
            score: record::read_decimal(element, "Score")?,
            effort: record::read_int(element, "Effort")?,
            text: record::read_text(element, "Text"),
            ordinarily_score: record::read_decimal(element, "OrdinarilyScore")?,
            extension: record::read_fragment(element, "Extensions"),
        })
    }

    fn field_elements(&self) -> AppResult<Vec<XmlElement>> {
        Ok(vec![
            record::text_field("RefStudentID", &self.ref_student_id),
            record::text_field("RefCourseID", &self.ref_course_id),
            record::opt_field("Score", self.score),
            record::opt_field("Effort", self.effort),
            record::text_field("Text", &self.text),
            record::opt_field("OrdinarilyScore", self.ordinarily_score),
            record::fragment_field("Extensions", self.extension.as_deref())?,
        ])
    }
}
