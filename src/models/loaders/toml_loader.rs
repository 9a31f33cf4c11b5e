use crate::models::{
    AEIncludeRecord, AssessmentSetupRecord, ExamRecord, GradScoreRecord, MoralScoreRecord,
    SCAttendRecord, SCETakeRecord, SemesterScoreRecord, TCInstructRecord,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

/// 一个待导入的成绩文件
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportFile {
    pub name: String,
    pub exams: Vec<ExamRecord>,
    pub assessment_setups: Vec<AssessmentSetupRecord>,
    pub ae_includes: Vec<AEIncludeRecord>,
    pub tc_instructs: Vec<TCInstructRecord>,
    pub sc_attends: Vec<SCAttendRecord>,
    pub sce_takes: Vec<SCETakeRecord>,
    pub semester_scores: Vec<SemesterScoreRecord>,
    pub grad_scores: Vec<GradScoreRecord>,
    pub moral_scores: Vec<MoralScoreRecord>,
    #[serde(skip_serializing, skip_deserializing)]
    pub file_path: Option<String>,
}

impl ImportFile {
    /// 文件中的记录总数
    pub fn record_count(&self) -> usize {
        self.exams.len()
            + self.assessment_setups.len()
            + self.ae_includes.len()
            + self.tc_instructs.len()
            + self.sc_attends.len()
            + self.sce_takes.len()
            + self.semester_scores.len()
            + self.grad_scores.len()
            + self.moral_scores.len()
    }

    /// 显示用名称：未填写时使用文件名
    pub fn display_name(&self) -> String {
        if !self.name.trim().is_empty() {
            return self.name.clone();
        }
        self.file_path
            .as_deref()
            .and_then(|p| Path::new(p).file_name())
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "(未命名)".to_string())
    }
}

/// 从 TOML 文件加载导入数据
pub async fn load_import_file(toml_file_path: &Path) -> Result<ImportFile> {
    let content = fs::read_to_string(toml_file_path)
        .await
        .with_context(|| format!("无法读取TOML文件: {}", toml_file_path.display()))?;

    let mut file: ImportFile = toml::from_str(&content)
        .with_context(|| format!("无法解析TOML文件: {}", toml_file_path.display()))?;

    file.file_path = Some(toml_file_path.to_string_lossy().to_string());

    Ok(file)
}

/// 从文件夹中加载所有 TOML 导入文件（按文件名排序）
///
/// 无法解析的文件只记录警告并跳过。
pub async fn load_all_import_files(folder_path: &str) -> Result<Vec<ImportFile>> {
    let folder = PathBuf::from(folder_path);

    if !folder.exists() {
        anyhow::bail!("文件夹不存在: {}", folder_path);
    }

    let mut paths = Vec::new();
    let mut entries = fs::read_dir(&folder)
        .await
        .with_context(|| format!("无法读取文件夹: {}", folder_path))?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) == Some("toml") {
            paths.push(path);
        }
    }
    paths.sort();

    let mut files = Vec::new();
    for path in paths {
        tracing::info!(
            "正在加载: {}",
            path.file_name().unwrap_or_default().to_string_lossy()
        );

        match load_import_file(&path).await {
            Ok(file) => {
                tracing::info!("成功加载 {} 笔记录", file.record_count());
                files.push(file);
            }
            Err(e) => {
                tracing::warn!("加载文件失败 {}: {:#}", path.display(), e);
            }
        }
    }

    Ok(files)
}
