//! 批量导入处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责批量导入文件的处理和资源管理。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：检查配置、初始化日志文件、建立 DSA 客户端与各实体闸道
//! 2. **批量加载**：扫描并加载所有待导入的文件（`Vec<ImportFile>`）
//! 3. **并发控制**：使用 Semaphore 限制同时处理的文件数
//! 4. **分批处理**：每批完成后再开始下一批
//! 5. **全局统计**：汇总结果，写出 JSON 报告

use crate::clients::DsaClient;
use crate::config::Config;
use crate::infrastructure::BatchOptions;
use crate::models::{load_all_import_files, ImportFile};
use crate::orchestrator::import_processor::{self, ImportStats};
use crate::services::Evaluation;
use crate::utils::logging;
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

/// 应用主结构
pub struct App {
    config: Config,
    evaluation: Evaluation,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        config.validate()?;

        logging::init_log_file(&config.output_log_file)?;
        logging::log_startup(
            config.max_concurrent_files,
            config.max_threads,
            config.package_size,
        );

        let client = Arc::new(DsaClient::from_config(&config)?);
        let evaluation = Evaluation::new(client, BatchOptions::from_config(&config));

        Ok(Self { config, evaluation })
    }

    /// 使用已建立的闸道组装应用（测试或自订连接时使用）
    pub fn with_evaluation(config: Config, evaluation: Evaluation) -> Self {
        Self { config, evaluation }
    }

    pub fn evaluation(&self) -> &Evaluation {
        &self.evaluation
    }

    /// 运行应用主逻辑，回传导入报告
    pub async fn run(&self) -> Result<ImportReport> {
        let started_at = now();

        info!("\n📁 正在扫描待导入的文件...");
        let all_files = load_all_import_files(&self.config.import_folder).await?;

        if all_files.is_empty() {
            warn!("⚠️ 没有找到待导入的TOML文件，程序结束");
            let report = ImportReport::new(started_at, Vec::new());
            self.write_report(&report)?;
            return Ok(report);
        }

        logging::log_files_loaded(all_files.len(), self.config.max_concurrent_files);

        let files = self.process_all_files(all_files).await?;
        let report = ImportReport::new(started_at, files);

        self.write_report(&report)?;
        logging::print_final_stats(
            report.success,
            report.failed,
            report.records_written,
            &self.config.output_log_file,
        );

        Ok(report)
    }

    /// 分批处理所有文件
    async fn process_all_files(&self, all_files: Vec<ImportFile>) -> Result<Vec<FileReport>> {
        let per_batch = self.config.max_concurrent_files.max(1);
        let semaphore = Arc::new(Semaphore::new(per_batch));
        let total_files = all_files.len();
        let total_batches = total_files.div_ceil(per_batch);

        let mut reports = Vec::with_capacity(total_files);
        let mut remaining = all_files.into_iter();

        for batch_num in 1..=total_batches {
            let batch_start = (batch_num - 1) * per_batch;
            let batch_files: Vec<ImportFile> = remaining.by_ref().take(per_batch).collect();
            let batch_end = batch_start + batch_files.len();

            logging::log_batch_start(
                batch_num,
                total_batches,
                batch_start + 1,
                batch_end,
                total_files,
            );

            let batch_reports = self
                .process_batch(batch_files, batch_start, semaphore.clone())
                .await?;
            let success = batch_reports.iter().filter(|r| r.success).count();
            logging::log_batch_complete(batch_num, success, batch_reports.len());

            reports.extend(batch_reports);
        }

        Ok(reports)
    }

    /// 处理单个批次
    async fn process_batch(
        &self,
        batch_files: Vec<ImportFile>,
        batch_start: usize,
        semaphore: Arc<Semaphore>,
    ) -> Result<Vec<FileReport>> {
        let mut handles = Vec::new();

        for (idx, file) in batch_files.into_iter().enumerate() {
            let file_index = batch_start + idx + 1;
            let permit = semaphore.clone().acquire_owned().await?;
            let evaluation = self.evaluation.clone();
            let name = file.display_name();
            let path = file.file_path.clone();

            let handle = tokio::spawn(async move {
                let _permit = permit;
                import_processor::process_import_file(&evaluation, file, file_index).await
            });
            handles.push((file_index, name, path, handle));
        }

        let mut reports = Vec::with_capacity(handles.len());
        for (file_index, name, path, handle) in handles {
            let outcome = match handle.await {
                Ok(result) => result,
                Err(e) => Err(anyhow::anyhow!("任务执行失败: {}", e)),
            };
            if let Err(e) = &outcome {
                error!(
                    "[文件 {}] ❌ 处理过程中发生错误: {}",
                    file_index,
                    logging::truncate_text(&format!("{:#}", e), 300)
                );
            }
            reports.push(FileReport::new(file_index, name, path, outcome));
        }

        Ok(reports)
    }

    fn write_report(&self, report: &ImportReport) -> Result<()> {
        let json = serde_json::to_string_pretty(report)?;
        fs::write(&self.config.report_file, json)
            .with_context(|| format!("无法写入报告: {}", self.config.report_file))?;
        info!("📄 报告已写入: {}", self.config.report_file);
        Ok(())
    }
}

/// 整体导入报告
#[derive(Debug, Default, Serialize)]
pub struct ImportReport {
    pub started_at: String,
    pub finished_at: String,
    pub success: usize,
    pub failed: usize,
    pub records_written: usize,
    pub files: Vec<FileReport>,
}

impl ImportReport {
    fn new(started_at: String, files: Vec<FileReport>) -> Self {
        let success = files.iter().filter(|f| f.success).count();
        let records_written = files
            .iter()
            .filter_map(|f| f.stats.as_ref())
            .map(ImportStats::total)
            .sum();
        Self {
            started_at,
            finished_at: now(),
            success,
            failed: files.len() - success,
            records_written,
            files,
        }
    }
}

/// 单个文件的处理结果
#[derive(Debug, Serialize)]
pub struct FileReport {
    pub index: usize,
    pub name: String,
    pub path: Option<String>,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<ImportStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FileReport {
    fn new(index: usize, name: String, path: Option<String>, outcome: Result<ImportStats>) -> Self {
        match outcome {
            Ok(stats) => Self {
                index,
                name,
                path,
                success: true,
                stats: Some(stats),
                error: None,
            },
            Err(e) => Self {
                index,
                name,
                path,
                success: false,
                stats: None,
                error: Some(format!("{:#}", e)),
            },
        }
    }
}

fn now() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}
