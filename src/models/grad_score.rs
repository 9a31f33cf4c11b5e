use crate::error::AppResult;
use crate::infrastructure::xml::XmlElement;
use crate::models::record::{self, Record, ServiceNames};
use crate::models::semester_score::{domains_element, read_domains, DomainScore};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 毕业成绩，每位学生一笔，以学生编号为键
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GradScoreRecord {
    pub ref_student_id: String,
    pub domains: BTreeMap<String, DomainScore>,
    pub learn_domain_score: Option<f64>,
    pub course_learn_score: Option<f64>,
}

impl Record for GradScoreRecord {
    const ELEMENT: &'static str = "Student";
    const SERVICES: ServiceNames = ServiceNames {
        select: "SmartSchool.Score.GetGradScore",
        insert: "SmartSchool.Score.InsertGradScore",
        update: "SmartSchool.Score.UpdateGradScore",
        delete: "SmartSchool.Score.DeleteGradScore",
    };
    const KEY_FIELD: &'static str = "RefStudentID";

    fn id(&self) -> Option<&str> {
        Some(self.ref_student_id.as_str()).filter(|id| !id.is_empty())
    }

    fn from_element(element: &XmlElement) -> AppResult<Self> {
        let ref_student_id = element
            .attribute("RefStudentID")
            .map(str::to_string)
            .or_else(|| record::read_opt_text(element, "RefStudentID"))
            .or_else(|| record::read_id(element))
            .unwrap_or_default();

        let mut result = Self {
            ref_student_id,
            ..Self::default()
        };
        if let Some(score) = element.child("GradScore") {
            result.domains = read_domains(score)?;
            result.learn_domain_score = record::read_decimal(score, "LearnDomainScore")?;
            result.course_learn_score = record::read_decimal(score, "CourseLearnScore")?;
        }
        Ok(result)
    }

    fn field_elements(&self) -> AppResult<Vec<XmlElement>> {
        Ok(vec![
            record::text_field("RefStudentID", &self.ref_student_id),
            XmlElement::new("GradScore")
                .with_child(domains_element(&self.domains))
                .with_child(record::opt_field("LearnDomainScore", self.learn_domain_score))
                .with_child(record::opt_field("CourseLearnScore", self.course_learn_score)),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyed_by_student() {
        let element = XmlElement::parse(
            "<Student RefStudentID=\"15\"><GradScore><Domains><Domain Name=\"數學\" Score=\"77\"/>\
             </Domains><LearnDomainScore>80</LearnDomainScore></GradScore></Student>",
        )
        .unwrap();
        let grad = GradScoreRecord::from_element(&element).unwrap();
        assert_eq!(grad.id(), Some("15"));
        assert_eq!(grad.domains["數學"].score, Some(77.0));
        assert_eq!(grad.learn_domain_score, Some(80.0));
        assert_eq!(GradScoreRecord::default().id(), None);
    }
}
