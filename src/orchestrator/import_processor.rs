//! 单个导入文件处理器 - 编排层
//!
//! ## 职责
//!
//! 把一个 `ImportFile` 中的各类记录依相依顺序写入远端：
//! 先定义（考试别、评量设定、评量包含考试），再安排（授课、修课），最后是成绩。
//!
//! 有编号的记录视为更新，没有编号的视为新增；毕业成绩以学生编号为键，一律更新。
//! 全部写入成功后把文件改名为 `*.toml.done`，避免重复导入。

use crate::models::{ImportFile, Record};
use crate::services::{Evaluation, Gateway};
use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// 单一实体的写入统计
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EntityStats {
    pub inserted: usize,
    pub updated: usize,
}

impl EntityStats {
    pub fn total(&self) -> usize {
        self.inserted + self.updated
    }
}

/// 单个导入文件的写入统计，依实体分类
#[derive(Debug, Default, Clone, Serialize)]
pub struct ImportStats {
    pub entities: BTreeMap<String, EntityStats>,
}

impl ImportStats {
    fn record(&mut self, entity: &str, stats: EntityStats) {
        if stats.total() > 0 {
            self.entities.insert(entity.to_string(), stats);
        }
    }

    /// 写入的记录总数
    pub fn total(&self) -> usize {
        self.entities.values().map(EntityStats::total).sum()
    }

    pub fn get(&self, entity: &str) -> EntityStats {
        self.entities.get(entity).copied().unwrap_or_default()
    }
}

/// 处理单个导入文件
///
/// # 参数
/// - `evaluation`: 各实体闸道
/// - `file`: 导入数据
/// - `file_index`: 文件索引（用于日志）
///
/// # 返回
/// 返回各实体的写入统计；任何一类写入失败即中止并回传错误，文件保持原名
pub async fn process_import_file(
    evaluation: &Evaluation,
    file: ImportFile,
    file_index: usize,
) -> Result<ImportStats> {
    log_file_start(file_index, &file);

    let file_path = file.file_path.clone();
    let mut stats = ImportStats::default();

    stats.record(
        "exam",
        upsert(&evaluation.exam, file.exams, file_index, "考试别").await?,
    );
    stats.record(
        "assessment_setup",
        upsert(
            &evaluation.assessment_setup,
            file.assessment_setups,
            file_index,
            "评量设定",
        )
        .await?,
    );
    stats.record(
        "ae_include",
        upsert(&evaluation.ae_include, file.ae_includes, file_index, "评量包含考试").await?,
    );
    stats.record(
        "tc_instruct",
        upsert(&evaluation.tc_instruct, file.tc_instructs, file_index, "教师授课").await?,
    );
    stats.record(
        "sc_attend",
        upsert(&evaluation.sc_attend, file.sc_attends, file_index, "学生修课").await?,
    );
    stats.record(
        "sce_take",
        upsert(&evaluation.sce_take, file.sce_takes, file_index, "考试成绩").await?,
    );
    stats.record(
        "semester_score",
        upsert(
            &evaluation.semester_score,
            file.semester_scores,
            file_index,
            "学期成绩",
        )
        .await?,
    );

    if !file.grad_scores.is_empty() {
        let updated = evaluation
            .grad_score
            .update_batch(file.grad_scores)
            .await
            .with_context(|| format!("[文件 {}] 更新毕业成绩失败", file_index))?;
        stats.record("grad_score", EntityStats { inserted: 0, updated });
    }

    stats.record(
        "moral_score",
        upsert(&evaluation.moral_score, file.moral_scores, file_index, "德行成绩").await?,
    );

    mark_done(file_path.as_deref(), file_index)?;
    log_file_complete(file_index, &stats);

    Ok(stats)
}

/// 依是否已有编号拆成新增与更新两批
async fn upsert<R: Record>(
    gateway: &Gateway<R>,
    records: Vec<R>,
    file_index: usize,
    label: &str,
) -> Result<EntityStats> {
    if records.is_empty() {
        return Ok(EntityStats::default());
    }

    // 空白编号视同未保存
    let (existing, fresh): (Vec<R>, Vec<R>) = records
        .into_iter()
        .partition(|r| r.id().is_some_and(|id| !id.trim().is_empty()));
    info!(
        "[文件 {}] {}: 新增 {} 笔，更新 {} 笔",
        file_index,
        label,
        fresh.len(),
        existing.len()
    );

    let mut stats = EntityStats::default();
    if !fresh.is_empty() {
        let new_ids = gateway
            .insert_batch(fresh)
            .await
            .with_context(|| format!("[文件 {}] 新增{}失败", file_index, label))?;
        stats.inserted = new_ids.len();
    }
    if !existing.is_empty() {
        stats.updated = gateway
            .update_batch(existing)
            .await
            .with_context(|| format!("[文件 {}] 更新{}失败", file_index, label))?;
    }
    Ok(stats)
}

/// 把处理完成的文件改名为 `*.done`
fn mark_done(file_path: Option<&str>, file_index: usize) -> Result<()> {
    let Some(file_path) = file_path else {
        warn!("[文件 {}] ⚠️ 文件路径未设置", file_index);
        return Ok(());
    };

    if !Path::new(file_path).exists() {
        warn!("[文件 {}] ⚠️ 文件不存在: {}", file_index, file_path);
        return Ok(());
    }

    let done_path = format!("{}.done", file_path);
    fs::rename(file_path, &done_path)
        .with_context(|| format!("无法重新命名文件: {}", file_path))?;
    info!(
        "[文件 {}] ✓ 已标记完成: {}",
        file_index,
        Path::new(&done_path)
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
    );
    Ok(())
}

// ========== 日志辅助函数 ==========

fn log_file_start(file_index: usize, file: &ImportFile) {
    info!("[文件 {}] 开始处理", file_index);
    info!("[文件 {}] 名称: {}", file_index, file.display_name());
    info!("[文件 {}] 记录总数: {}", file_index, file.record_count());
}

fn log_file_complete(file_index: usize, stats: &ImportStats) {
    for (entity, entity_stats) in &stats.entities {
        info!(
            "[文件 {}] {}: 新增 {}, 更新 {}",
            file_index, entity, entity_stats.inserted, entity_stats.updated
        );
    }
    info!("[文件 {}] ✅ 导入完成，共写入 {} 笔\n", file_index, stats.total());
}
