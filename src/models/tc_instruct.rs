use crate::error::AppResult;
use crate::infrastructure::xml::XmlElement;
use crate::models::record::{self, Record, ServiceNames};
use serde::{Deserialize, Serialize};

/// 教师授课安排
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TCInstructRecord {
    pub id: Option<String>,
    pub ref_teacher_id: String,
    pub ref_course_id: String,
    /// 第几位授课教师（1 为主要授课教师）
    pub sequence: Option<i32>,
}

impl TCInstructRecord {
    pub fn new(ref_teacher_id: impl Into<String>, ref_course_id: impl Into<String>, sequence: i32) -> Self {
        Self {
            id: None,
            ref_teacher_id: ref_teacher_id.into(),
            ref_course_id: ref_course_id.into(),
            sequence: Some(sequence),
        }
    }
}

impl Record for TCInstructRecord {
    const ELEMENT: &'static str = "TCInstruct";
    const SERVICES: ServiceNames = ServiceNames {
        select: "SmartSchool.Course.GetTCInstruct",
        insert: "SmartSchool.Course.InsertTCInstruct",
        update: "SmartSchool.Course.UpdateTCInstruct",
        delete: "SmartSchool.Course.DeleteTCInstruct",
    };

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn from_element(element: &XmlElement) -> AppResult<Self> {
        Ok(Self {
            id: record::read_id(element),
            ref_teacher_id: record::read_text(element, "RefTeacherID"),
            ref_course_id: record::read_text(element, "RefCourseID"),
            sequence: record::read_int(element, "Sequence")?,
        })
    }

    fn field_elements(&self) -> AppResult<Vec<XmlElement>> {
        Ok(vec![
            record::text_field("RefTeacherID", &self.ref_teacher_id),
            record::text_field("RefCourseID", &self.ref_course_id),
            record::opt_field("Sequence", self.sequence),
        ])
    }
}
