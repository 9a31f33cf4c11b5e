use crate::error::AppResult;
use crate::infrastructure::xml::XmlElement;
use crate::models::record::{self, Record, ServiceNames};
use serde::{Deserialize, Serialize};

/// 考试别（期中考、期末考……）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExamRecord {
    pub id: Option<String>,
    pub name: String,
    pub description: String,
    pub display_order: Option<i32>,
}

impl ExamRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

impl Record for ExamRecord {
    const ELEMENT: &'static str = "Exam";
    const SERVICES: ServiceNames = ServiceNames {
        select: "SmartSchool.Exam.GetExam",
        insert: "SmartSchool.Exam.InsertExam",
        update: "SmartSchool.Exam.UpdateExam",
        delete: "SmartSchool.Exam.DeleteExam",
    };

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn from_element(element: &XmlElement) -> AppResult<Self> {
        Ok(Self {
            id: record::read_id(element),
            name: record::read_text(element, "ExamName"),
            description: record::read_text(element, "Description"),
            display_order: record::read_int(element, "DisplayOrder")?,
        })
    }

    fn field_elements(&self) -> AppResult<Vec<XmlElement>> {
        Ok(vec![
            record::text_field("ExamName", &self.name),
            record::text_field("Description", &self.description),
            record::opt_field("DisplayOrder", self.display_order),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_exam() {
        let element = XmlElement::parse(
            "<Exam ID=\"3\"><ExamName>第一次段考</ExamName><Description/><DisplayOrder>2</DisplayOrder></Exam>",
        )
        .unwrap();
        let exam = ExamRecord::from_element(&element).unwrap();
        assert_eq!(exam.id.as_deref(), Some("3"));
        assert_eq!(exam.name, "第一次段考");
        assert_eq!(exam.description, "");
        assert_eq!(exam.display_order, Some(2));
    }
}
