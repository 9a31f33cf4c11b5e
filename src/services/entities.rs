//! 各实体的存取闸道
//!
//! 每个闸道都包着一个 `Gateway<R>`（经 `Deref` 提供通用 CRUD），
//! 再补上该实体特有的查询。

use crate::clients::DsaClient;
use crate::error::AppResult;
use crate::infrastructure::worker::BatchOptions;
use crate::models::{
    AEIncludeRecord, AssessmentSetupRecord, ExamRecord, GradScoreRecord, MoralScoreRecord,
    SCAttendRecord, SCETakeRecord, SemesterScoreRecord, TCInstructRecord,
};
use crate::services::gateway::{Gateway, SelectQuery};
use std::ops::Deref;
use std::sync::Arc;

macro_rules! entity_gateway {
    ($(#[$meta:meta])* $name:ident => $record:ty) => {
        $(#[$meta])*
        #[derive(Clone)]
        pub struct $name {
            inner: Gateway<$record>,
        }

        impl $name {
            pub fn new(client: Arc<DsaClient>, batch: BatchOptions) -> Self {
                Self {
                    inner: Gateway::new(client, batch),
                }
            }
        }

        impl Deref for $name {
            type Target = Gateway<$record>;

            fn deref(&self) -> &Self::Target {
                &self.inner
            }
        }
    };
}

entity_gateway! {
    /// 考试别
    Exam => ExamRecord
}

entity_gateway! {
    /// 评量设定
    AssessmentSetup => AssessmentSetupRecord
}

entity_gateway! {
    /// 评量设定包含的考试
    AEInclude => AEIncludeRecord
}

entity_gateway! {
    /// 学生修课
    SCAttend => SCAttendRecord
}

entity_gateway! {
    /// 考试成绩
    SCETake => SCETakeRecord
}

entity_gateway! {
    /// 学期成绩
    SemesterScore => SemesterScoreRecord
}

entity_gateway! {
    /// 毕业成绩
    GradScore => GradScoreRecord
}

entity_gateway! {
    /// 德行成绩
    MoralScore => MoralScoreRecord
}

entity_gateway! {
    /// 教师授课
    TCInstruct => TCInstructRecord
}

impl Exam {
    /// 所有考试别，依显示顺序
    pub async fn select_all(&self) -> AppResult<Vec<ExamRecord>> {
        self.select(&SelectQuery::new().order("DisplayOrder")).await
    }
}

impl AEInclude {
    pub async fn select_by_assessment_setup_ids(
        &self,
        ids: &[String],
    ) -> AppResult<Vec<AEIncludeRecord>> {
        self.select_by_values("ExamTemplateID", ids).await
    }

    pub async fn select_by_exam_ids(&self, ids: &[String]) -> AppResult<Vec<AEIncludeRecord>> {
        self.select_by_values("RefExamID", ids).await
    }
}

impl SCAttend {
    pub async fn select_by_student_ids(&self, ids: &[String]) -> AppResult<Vec<SCAttendRecord>> {
        self.select_by_values("RefStudentID", ids).await
    }

    pub async fn select_by_course_ids(&self, ids: &[String]) -> AppResult<Vec<SCAttendRecord>> {
        self.select_by_values("RefCourseID", ids).await
    }

    /// 同时符合学生与课程的修课记录；任一列表为空即回传空
    pub async fn select_by_student_and_course(
        &self,
        student_ids: &[String],
        course_ids: &[String],
    ) -> AppResult<Vec<SCAttendRecord>> {
        if course_ids.is_empty() {
            return Ok(Vec::new());
        }
        let base = SelectQuery::new().conditions("RefCourseID", course_ids);
        self.select_by_values_with("RefStudentID", student_ids, base)
            .await
    }
}

impl SCETake {
    pub async fn select_by_sc_attend_ids(&self, ids: &[String]) -> AppResult<Vec<SCETakeRecord>> {
        self.select_by_values("AttendID", ids).await
    }

    /// 指定课程中指定考试的成绩；任一列表为空即回传空
    pub async fn select_by_course_and_exam(
        &self,
        course_ids: &[String],
        exam_ids: &[String],
    ) -> AppResult<Vec<SCETakeRecord>> {
        if exam_ids.is_empty() {
            return Ok(Vec::new());
        }
        let base = SelectQuery::new().conditions("ExamID", exam_ids);
        self.select_by_values_with("RefCourseID", course_ids, base)
            .await
    }
}

impl SemesterScore {
    pub async fn select_by_student_ids(
        &self,
        ids: &[String],
    ) -> AppResult<Vec<SemesterScoreRecord>> {
        self.select_by_values("RefStudentID", ids).await
    }

    /// 指定学年度、学期的学期成绩
    pub async fn select_by_school_year_and_semester(
        &self,
        student_ids: &[String],
        school_year: i32,
        semester: i32,
    ) -> AppResult<Vec<SemesterScoreRecord>> {
        let base = SelectQuery::new()
            .condition("SchoolYear", school_year)
            .condition("Semester", semester);
        self.select_by_values_with("RefStudentID", student_ids, base)
            .await
    }
}

impl GradScore {
    pub async fn select_by_student_ids(&self, ids: &[String]) -> AppResult<Vec<GradScoreRecord>> {
        self.select_by_ids(ids).await
    }
}

impl MoralScore {
    pub async fn select_by_student_ids(&self, ids: &[String]) -> AppResult<Vec<MoralScoreRecord>> {
        self.select_by_values("RefStudentID", ids).await
    }

    pub async fn select_by_school_year_and_semester(
        &self,
        student_ids: &[String],
        school_year: i32,
        semester: i32,
    ) -> AppResult<Vec<MoralScoreRecord>> {
        let base = SelectQuery::new()
            .condition("SchoolYear", school_year)
            .condition("Semester", semester);
        self.select_by_values_with("RefStudentID", student_ids, base)
            .await
    }
}

impl TCInstruct {
    pub async fn select_by_teacher_ids(&self, ids: &[String]) -> AppResult<Vec<TCInstructRecord>> {
        self.select_by_values("RefTeacherID", ids).await
    }

    pub async fn select_by_course_ids(&self, ids: &[String]) -> AppResult<Vec<TCInstructRecord>> {
        self.select_by_values("RefCourseID", ids).await
    }
}

/// 评量相关的全部闸道，共用同一个客户端
#[derive(Clone)]
pub struct Evaluation {
    pub exam: Exam,
    pub assessment_setup: AssessmentSetup,
    pub ae_include: AEInclude,
    pub sc_attend: SCAttend,
    pub sce_take: SCETake,
    pub semester_score: SemesterScore,
    pub grad_score: GradScore,
    pub moral_score: MoralScore,
    pub tc_instruct: TCInstruct,
}

impl Evaluation {
    pub fn new(client: Arc<DsaClient>, batch: BatchOptions) -> Self {
        Self {
            exam: Exam::new(client.clone(), batch),
            assessment_setup: AssessmentSetup::new(client.clone(), batch),
            ae_include: AEInclude::new(client.clone(), batch),
            sc_attend: SCAttend::new(client.clone(), batch),
            sce_take: SCETake::new(client.clone(), batch),
            semester_score: SemesterScore::new(client.clone(), batch),
            grad_score: GradScore::new(client.clone(), batch),
            moral_score: MoralScore::new(client.clone(), batch),
            tc_instruct: TCInstruct::new(client, batch),
        }
    }
}
