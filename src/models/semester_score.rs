use crate::error::AppResult;
use crate::infrastructure::xml::XmlElement;
use crate::models::record::{self, Record, ServiceNames};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 科目成绩
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubjectScore {
    /// 所属领域
    pub domain: String,
    pub score: Option<f64>,
    /// 权数（学分）
    pub credit: Option<f64>,
    /// 节数
    pub period: Option<f64>,
    pub text: String,
}

/// 领域成绩
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DomainScore {
    pub score: Option<f64>,
    pub credit: Option<f64>,
    pub period: Option<f64>,
    pub text: String,
}

/// 学期成绩
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SemesterScoreRecord {
    pub id: Option<String>,
    pub ref_student_id: String,
    pub school_year: i32,
    pub semester: i32,
    pub grade_year: Option<i32>,
    /// 以科目名称为键
    pub subjects: BTreeMap<String, SubjectScore>,
    /// 以领域名称为键
    pub domains: BTreeMap<String, DomainScore>,
    /// 学习领域成绩
    pub learn_domain_score: Option<f64>,
    /// 课程学习成绩
    pub course_learn_score: Option<f64>,
}

impl SemesterScoreRecord {
    pub fn new(ref_student_id: impl Into<String>, school_year: i32, semester: i32) -> Self {
        Self {
            ref_student_id: ref_student_id.into(),
            school_year,
            semester,
            ..Self::default()
        }
    }

    fn score_info(&self) -> XmlElement {
        XmlElement::new("ScoreInfo")
            .with_child(XmlElement::new("Subjects").with_children(self.subjects.iter().map(
                |(name, s)| {
                    score_attributes(
                        XmlElement::new("Subject")
                            .with_attribute("Name", name.as_str())
                            .with_attribute("Domain", s.domain.as_str()),
                        s.score,
                        s.credit,
                        s.period,
                        &s.text,
                    )
                },
            )))
            .with_child(domains_element(&self.domains))
            .with_child(record::opt_field("LearnDomainScore", self.learn_domain_score))
            .with_child(record::opt_field("CourseLearnScore", self.course_learn_score))
    }
}

impl Record for SemesterScoreRecord {
    const ELEMENT: &'static str = "SemesterScore";
    const SERVICES: ServiceNames = ServiceNames {
        select: "SmartSchool.Score.GetSemesterSubjectScore",
        insert: "SmartSchool.Score.InsertSemesterSubjectScore",
        update: "SmartSchool.Score.UpdateSemesterSubjectScore",
        delete: "SmartSchool.Score.DeleteSemesterSubjectScore",
    };

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn from_element(element: &XmlElement) -> AppResult<Self> {
        let mut result = Self {
            id: record::read_id(element),
            ref_student_id: record::read_text(element, "RefStudentID"),
            school_year: record::read_int(element, "SchoolYear")?.unwrap_or_default(),
            semester: record::read_int(element, "Semester")?.unwrap_or_default(),
            grade_year: record::read_int(element, "GradeYear")?,
            ..Self::default()
        };

        if let Some(info) = element.child("ScoreInfo") {
            if let Some(subjects) = info.child("Subjects") {
                for subject in subjects.children("Subject") {
                    let name = subject.attribute("Name").unwrap_or_default().trim();
                    if name.is_empty() {
                        continue;
                    }
                    result.subjects.insert(
                        name.to_string(),
                        SubjectScore {
                            domain: subject.attribute("Domain").unwrap_or_default().to_string(),
                            score: record::read_attr_decimal(subject, "Score")?,
                            credit: record::read_attr_decimal(subject, "Credit")?,
                            period: record::read_attr_decimal(subject, "Period")?,
                            text: subject.attribute("Text").unwrap_or_default().to_string(),
                        },
                    );
                }
            }
            result.domains = read_domains(info)?;
            result.learn_domain_score = record::read_decimal(info, "LearnDomainScore")?;
            result.course_learn_score = record::read_decimal(info, "CourseLearnScore")?;
        }

        Ok(result)
    }

    fn field_elements(&self) -> AppResult<Vec<XmlElement>> {
        Ok(vec![
            record::text_field("RefStudentID", &self.ref_student_id),
            record::text_field("SchoolYear", &self.school_year.to_string()),
            record::text_field("Semester", &self.semester.to_string()),
            record::opt_field("GradeYear", self.grade_year),
            self.score_info(),
        ])
    }
}

// ========== 与毕业成绩共用的领域成绩读写 ==========

/// 读取 `<Domains><Domain Name=".." Score=".."/></Domains>`
pub(crate) fn read_domains(parent: &XmlElement) -> AppResult<BTreeMap<String, DomainScore>> {
    let mut domains = BTreeMap::new();
    if let Some(list) = parent.child("Domains") {
        for domain in list.children("Domain") {
            let name = domain.attribute("Name").unwrap_or_default().trim();
            if name.is_empty() {
                continue;
            }
            domains.insert(
                name.to_string(),
                DomainScore {
                    score: record::read_attr_decimal(domain, "Score")?,
                    credit: record::read_attr_decimal(domain, "Credit")?,
                    period: record::read_attr_decimal(domain, "Period")?,
                    text: domain.attribute("Text").unwrap_or_default().to_string(),
                },
            );
        }
    }
    Ok(domains)
}

pub(crate) fn domains_element(domains: &BTreeMap<String, DomainScore>) -> XmlElement {
    XmlElement::new("Domains").with_children(domains.iter().map(|(name, d)| {
        score_attributes(
            XmlElement::new("Domain").with_attribute("Name", name.as_str()),
            d.score,
            d.credit,
            d.period,
            &d.text,
        )
    }))
}

fn score_attributes(
    mut element: XmlElement,
    score: Option<f64>,
    credit: Option<f64>,
    period: Option<f64>,
    text: &str,
) -> XmlElement {
    for (attr, value) in [("Score", score), ("Credit", credit), ("Period", period)] {
        if let Some(v) = value {
            element = element.with_attribute(attr, v.to_string());
        }
    }
    if !text.is_empty() {
        element = element.with_attribute("Text", text);
    }
    element
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<SemesterScore ID="55">
        <RefStudentID>15</RefStudentID><SchoolYear>112</SchoolYear><Semester>1</Semester>
        <GradeYear>7</GradeYear>
        <ScoreInfo>
            <Subjects>
                <Subject Name="國語文" Domain="語文" Score="88" Credit="5" Period="5"/>
                <Subject Name="數學" Domain="數學" Score="" Credit="4"/>
                <Subject Domain="缺名稱" Score="1"/>
            </Subjects>
            <Domains><Domain Name="語文" Score="86.5" Credit="6"/></Domains>
            <LearnDomainScore>84.25</LearnDomainScore>
            <CourseLearnScore/>
        </ScoreInfo>
    </SemesterScore>"#;

    #[test]
    fn test_parse_score_info() {
        let record = SemesterScoreRecord::from_element(&XmlElement::parse(SAMPLE).unwrap()).unwrap();
        assert_eq!(record.id.as_deref(), Some("55"));
        assert_eq!(record.school_year, 112);
        assert_eq!(record.grade_year, Some(7));
        assert_eq!(record.subjects.len(), 2, "缺少名称的科目应被忽略");
        assert_eq!(record.subjects["國語文"].score, Some(88.0));
        assert_eq!(record.subjects["數學"].score, None);
        assert_eq!(record.domains["語文"].score, Some(86.5));
        assert_eq!(record.learn_domain_score, Some(84.25));
        assert_eq!(record.course_learn_score, None);
    }

    #[test]
    fn test_written_score_info_reads_back() {
        let mut record = SemesterScoreRecord::new("15", 112, 2);
        record.subjects.insert(
            "英語".to_string(),
            SubjectScore {
                domain: "語文".to_string(),
                score: Some(91.0),
                credit: Some(3.0),
                ..SubjectScore::default()
            },
        );
        record.learn_domain_score = Some(90.0);

        let element = XmlElement::new("SemesterScore").with_children(record.field_elements().unwrap());
        let parsed = SemesterScoreRecord::from_element(&element).unwrap();
        assert_eq!(parsed, record);
    }
}
