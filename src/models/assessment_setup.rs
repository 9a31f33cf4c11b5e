use crate::error::AppResult;
use crate::infrastructure::xml::XmlElement;
use crate::models::record::{self, Record, ServiceNames};
use serde::{Deserialize, Serialize};

/// 评量设定（成绩计算样板）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssessmentSetupRecord {
    pub id: Option<String>,
    pub name: String,
    pub description: String,
    /// 扩充设定（XML 片段）
    pub extension: Option<String>,
}

impl Record for AssessmentSetupRecord {
    const ELEMENT: &'static str = "AssessmentSetup";
    const SERVICES: ServiceNames = ServiceNames {
        select: "SmartSchool.ExamTemplate.GetAbstractList",
        insert: "SmartSchool.ExamTemplate.Insert",
        update: "SmartSchool.ExamTemplate.Update",
        delete: "SmartSchool.ExamTemplate.Delete",
    };

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn from_element(element: &XmlElement) -> AppResult<Self> {
        Ok(Self {
            id: record::read_id(element),
            name: record::read_text(element, "TemplateName"),
            description: record::read_text(element, "Description"),
            extension: record::read_fragment(element, "Extension"),
        })
    }

    fn field_elements(&self) -> AppResult<Vec<XmlElement>> {
        Ok(vec![
            record::text_field("TemplateName", &self.name),
            record::text_field("Description", &self.description),
            record::fragment_field("Extension", self.extension.as_deref())?,
        ])
    }
}
