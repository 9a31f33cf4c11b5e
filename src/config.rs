use crate::error::{AppResult, ConfigError, FileError};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// 程序配置
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    // --- DSA 服务配置 ---
    /// 服务存取点（完整 URL）
    pub access_point: String,
    /// 目标合约名称
    pub contract: String,
    /// 登录后取得的会话编号
    pub session_token: String,
    /// 单次请求超时（秒）
    pub request_timeout_secs: u64,
    // --- 批次配置 ---
    /// 同时执行的包数量上限
    pub max_threads: usize,
    /// 每个包的记录数量
    pub package_size: usize,
    // --- 重试配置 ---
    /// 读取调用的最大尝试次数（含第一次）
    pub retry_max_attempts: u32,
    /// 第一次重试前的等待（毫秒）
    pub retry_delay_ms: u64,
    /// 重试等待上限（毫秒）
    pub retry_max_delay_ms: u64,
    // --- 导入配置 ---
    /// 待导入 TOML 文件目录
    pub import_folder: String,
    /// 同时处理的导入文件数量
    pub max_concurrent_files: usize,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 输出日志文件
    pub output_log_file: String,
    /// 导入报告（JSON）
    pub report_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            access_point: "https://dsa.ischool.com.tw/cs4/demo.school".to_string(),
            contract: "ischool.evaluation".to_string(),
            session_token: String::new(),
            request_timeout_secs: 30,
            max_threads: 3,
            package_size: 100,
            retry_max_attempts: 3,
            retry_delay_ms: 500,
            retry_max_delay_ms: 10_000,
            import_folder: "import_toml".to_string(),
            max_concurrent_files: 4,
            verbose_logging: false,
            output_log_file: "import_log.txt".to_string(),
            report_file: "import_report.json".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            access_point: std::env::var("DSA_ACCESS_POINT").unwrap_or(default.access_point),
            contract: std::env::var("DSA_CONTRACT").unwrap_or(default.contract),
            session_token: std::env::var("DSA_SESSION_TOKEN").unwrap_or(default.session_token),
            request_timeout_secs: env_parse("REQUEST_TIMEOUT_SECS").unwrap_or(default.request_timeout_secs),
            max_threads: env_parse("MAX_THREADS").unwrap_or(default.max_threads),
            package_size: env_parse("PACKAGE_SIZE").unwrap_or(default.package_size),
            retry_max_attempts: env_parse("RETRY_MAX_ATTEMPTS").unwrap_or(default.retry_max_attempts),
            retry_delay_ms: env_parse("RETRY_DELAY_MS").unwrap_or(default.retry_delay_ms),
            retry_max_delay_ms: env_parse("RETRY_MAX_DELAY_MS").unwrap_or(default.retry_max_delay_ms),
            import_folder: std::env::var("IMPORT_FOLDER").unwrap_or(default.import_folder),
            max_concurrent_files: env_parse("MAX_CONCURRENT_FILES").unwrap_or(default.max_concurrent_files),
            verbose_logging: env_parse("VERBOSE_LOGGING").unwrap_or(default.verbose_logging),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(default.output_log_file),
            report_file: std::env::var("REPORT_FILE").unwrap_or(default.report_file),
        }
    }

    /// 从 TOML 文件加载配置，缺少的字段使用默认值
    pub fn from_toml_file(path: &Path) -> AppResult<Self> {
        let display = path.display().to_string();
        let content = std::fs::read_to_string(path).map_err(|cause| FileError::ReadFailed {
            path: display.clone(),
            cause,
        })?;
        let config: Config = toml::from_str(&content).map_err(|cause| FileError::TomlParseFailed {
            path: display,
            cause,
        })?;
        Ok(config)
    }

    /// 检查配置是否可用
    pub fn validate(&self) -> AppResult<()> {
        if self.access_point.trim().is_empty() {
            return Err(invalid("access_point", "", "不能为空").into());
        }
        if self.max_threads == 0 {
            return Err(invalid("max_threads", "0", "至少为 1").into());
        }
        if self.package_size == 0 {
            return Err(invalid("package_size", "0", "至少为 1").into());
        }
        if self.retry_max_attempts == 0 {
            return Err(invalid("retry_max_attempts", "0", "至少为 1").into());
        }
        if self.max_concurrent_files == 0 {
            return Err(invalid("max_concurrent_files", "0", "至少为 1").into());
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}

fn invalid(field: &'static str, value: &str, reason: &'static str) -> ConfigError {
    ConfigError::InvalidValue {
        field,
        value: value.to_string(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_batch_settings() {
        let config = Config::default();
        assert_eq!(config.max_threads, 3);
        assert_eq!(config.package_size, 100);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_package_size() {
        let config = Config {
            package_size: 0,
            ..Config::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("package_size"));
    }

    #[test]
    fn test_from_toml_file_fills_missing_fields() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "access_point = \"https://dsa.example.edu.tw/school\"\nmax_threads = 5"
        )
        .unwrap();

        let config = Config::from_toml_file(file.path()).unwrap();
        assert_eq!(config.access_point, "https://dsa.example.edu.tw/school");
        assert_eq!(config.max_threads, 5);
        assert_eq!(config.package_size, 100);
    }
}
