use crate::error::AppResult;
use crate::infrastructure::xml::XmlElement;
use crate::models::exam::ExamRecord;
use crate::models::record::{self, Record, ServiceNames};
use crate::models::sc_attend::SCAttendRecord;
use crate::services::{Exam, SCAttend};
use serde::{Deserialize, Serialize};

/// 学生单次考试成绩
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SCETakeRecord {
    pub id: Option<String>,
    pub ref_sc_attend_id: String,
    pub ref_exam_id: String,
    /// 以下两个栏位由服务端回填，写入时忽略
    pub ref_student_id: String,
    pub ref_course_id: String,
    pub score: Option<f64>,
    pub effort: Option<i32>,
    pub text: String,
    pub extension: Option<String>,
}

impl SCETakeRecord {
    /// 所属修课记录
    pub async fn sc_attend(&self, attends: &SCAttend) -> AppResult<Option<SCAttendRecord>> {
        attends.select_by_id(&self.ref_sc_attend_id).await
    }

    /// 所属考试
    pub async fn exam(&self, exams: &Exam) -> AppResult<Option<ExamRecord>> {
        exams.select_by_id(&self.ref_exam_id).await
    }
}

impl Record for SCETakeRecord {
    const ELEMENT: &'static str = "SCETake";
    const SERVICES: ServiceNames = ServiceNames {
        select: "SmartSchool.Course.GetSCETake",
        insert: "SmartSchool.Course.InsertSCETake",
        update: "SmartSchool.Course.UpdateSCETake",
        delete: "SmartSchool.Course.DeleteSCETake",
    };

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn from_element(element: &XmlElement) -> AppResult<Self> {
        Ok(Self {
            id: record::read_id(element),
            ref_sc_attend_id: record::read_text(element, "AttendID"),
            ref_exam_id: record::read_text(element, "ExamID"),
            ref_student_id: record::read_text(element, "RefStudentID"),
            ref_course_id: record::read_text(element, "RefCourseID"),
            score: record::read_decimal(element, "Score")?,
            effort: record::read_int(element, "Effort")?,
            text: record::read_text(element, "Text"),
            extension: record::read_fragment(element, "Extension"),
        })
    }

    fn field_elements(&self) -> AppResult<Vec<XmlElement>> {
        Ok(vec![
            record::text_field("AttendID", &self.ref_sc_attend_id),
            record::text_field("ExamID", &self.ref_exam_id),
            record::opt_field("Score", self.score),
            record::opt_field("Effort", self.effort),
            record::text_field("Text", &self.text),
            record::fragment_field("Extension", self.extension.as_deref())?,
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_filled_fields_are_not_written() {
        let take = SCETakeRecord {
            ref_sc_attend_id: "901".to_string(),
            ref_exam_id: "3".to_string(),
            ref_student_id: "15".to_string(),
            score: Some(88.0),
            ..SCETakeRecord::default()
        };
        let names: Vec<String> = take
            .field_elements()
            .unwrap()
            .iter()
            .map(|e| e.name().to_string())
            .collect();
        assert!(names.contains(&"AttendID".to_string()));
        assert!(!names.contains(&"RefStudentID".to_string()));
    }
}
