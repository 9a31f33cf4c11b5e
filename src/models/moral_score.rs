use crate::error::AppResult;
use crate::infrastructure::xml::XmlElement;
use crate::models::record::{self, Record, ServiceNames};
use serde::{Deserialize, Serialize};

/// 日常生活表现（德行）成绩
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MoralScoreRecord {
    pub id: Option<String>,
    pub ref_student_id: String,
    pub school_year: i32,
    pub semester: i32,
    /// 文字评量（XML 片段）
    pub text_score: Option<String>,
    /// 缺旷奖惩统计（XML 片段）
    pub summary: Option<String>,
    /// 期初统计（XML 片段）
    pub initial_summary: Option<String>,
}

impl Record for MoralScoreRecord {
    const ELEMENT: &'static str = "MoralScore";
    const SERVICES: ServiceNames = ServiceNames {
        select: "SmartSchool.Score.GetSemesterMoralScore",
        insert: "SmartSchool.Score.InsertSemesterMoralScore",
        update: "SmartSchool.Score.UpdateSemesterMoralScore",
        delete: "SmartSchool.Score.DeleteSemesterMoralScore",
    };

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn from_element(element: &XmlElement) -> AppResult<Self> {
        Ok(Self {
            id: record::read_id(element),
            ref_student_id: record::read_text(element, "RefStudentID"),
            school_year: record::read_int(element, "SchoolYear")?.unwrap_or_default(),
            semester: record::read_int(element, "Semester")?.unwrap_or_default(),
            text_score: record::read_fragment(element, "TextScore"),
            summary: record::read_fragment(element, "Summary"),
            initial_summary: record::read_fragment(element, "InitialSummary"),
        })
    }

    fn field_elements(&self) -> AppResult<Vec<XmlElement>> {
        Ok(vec![
            record::text_field("RefStudentID", &self.ref_student_id),
            record::text_field("SchoolYear", &self.school_year.to_string()),
            record::text_field("Semester", &self.semester.to_string()),
            record::fragment_field("TextScore", self.text_score.as_deref())?,
            record::fragment_field("Summary", self.summary.as_deref())?,
            record::fragment_field("InitialSummary", self.initial_summary.as_deref())?,
        ])
    }
}
