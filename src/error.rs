use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 远端服务调用错误
    #[error(transparent)]
    Rpc(#[from] RpcError),
    /// XML 解析/构建错误
    #[error(transparent)]
    Xml(#[from] XmlError),
    /// 批次处理错误
    #[error(transparent)]
    Batch(#[from] BatchError),
    /// 业务逻辑错误
    #[error(transparent)]
    Business(#[from] BusinessError),
    /// 配置错误
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// 文件操作错误
    #[error(transparent)]
    File(#[from] FileError),
}

/// 远端服务调用错误
#[derive(Debug, Error)]
pub enum RpcError {
    /// 网络层失败（连接、超时、发送）
    #[error("调用服务 {service} 失败: {cause}")]
    Transport {
        service: String,
        cause: reqwest::Error,
    },
    /// HTTP 状态码非 2xx
    #[error("调用服务 {service} 返回 HTTP {status}")]
    HttpStatus { service: String, status: u16 },
    /// 服务端回报的错误状态
    #[error("服务 {service} 回报错误: code={code}, message={message}")]
    ServiceFault {
        service: String,
        code: String,
        message: String,
    },
    /// 回应格式不符合预期
    #[error("服务 {service} 回应格式错误: {detail}")]
    MalformedResponse { service: String, detail: String },
}

/// XML 错误
#[derive(Debug, Error)]
pub enum XmlError {
    /// quick-xml 解析失败
    #[error("XML解析失败 (位置 {position}): {cause}")]
    Parse {
        position: usize,
        cause: quick_xml::Error,
    },
    /// 文档结构不完整
    #[error("XML结构错误: {0}")]
    Malformed(String),
    /// 字段值无法转换
    #[error("字段 {element}/{field} 的值 '{value}' 无法转换为 {expected}")]
    InvalidField {
        element: String,
        field: String,
        value: String,
        expected: &'static str,
    },
}

/// 批次处理错误
#[derive(Debug, Error)]
pub enum BatchError {
    /// 某个包执行失败
    #[error("第 {} 个包（共 {package_count} 个）执行失败: {cause}", .package_index + 1)]
    PackageFailed {
        package_index: usize,
        package_count: usize,
        cause: Box<AppError>,
    },
    /// 工作任务异常结束（panic 或被取消）
    #[error("第 {} 个包的工作任务异常结束: {message}", .package_index + 1)]
    TaskJoin { package_index: usize, message: String },
}

/// 业务逻辑错误
#[derive(Debug, Error)]
pub enum BusinessError {
    /// 记录缺少系统编号
    #[error("{entity} 记录缺少系统编号，无法{action}")]
    MissingId {
        entity: &'static str,
        action: &'static str,
    },
    /// 新增回传的编号数量与送出的记录数量不符
    #[error("{entity} 新增了 {sent} 笔记录，但服务回传 {returned} 个编号")]
    NewIdMismatch {
        entity: &'static str,
        sent: usize,
        returned: usize,
    },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 配置值不合法
    #[error("配置项 {field} 的值 '{value}' 不合法: {reason}")]
    InvalidValue {
        field: &'static str,
        value: String,
        reason: &'static str,
    },
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {cause}")]
    ReadFailed {
        path: String,
        cause: std::io::Error,
    },
    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {cause}")]
    TomlParseFailed {
        path: String,
        cause: toml::de::Error,
    },
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建网络层调用错误
    pub fn transport(service: impl Into<String>, cause: reqwest::Error) -> Self {
        AppError::Rpc(RpcError::Transport {
            service: service.into(),
            cause,
        })
    }

    /// 创建字段转换错误
    pub fn invalid_field(
        element: impl Into<String>,
        field: impl Into<String>,
        value: impl Into<String>,
        expected: &'static str,
    ) -> Self {
        AppError::Xml(XmlError::InvalidField {
            element: element.into(),
            field: field.into(),
            value: value.into(),
            expected,
        })
    }

    /// 创建 XML 结构错误
    pub fn malformed_xml(detail: impl Into<String>) -> Self {
        AppError::Xml(XmlError::Malformed(detail.into()))
    }

    /// 是否为暂时性错误（值得整体重试）
    ///
    /// 只有网络层失败与网关类 HTTP 状态码视为暂时性；
    /// 服务端回报的错误、XML 错误都不重试。
    pub fn is_transient(&self) -> bool {
        match self {
            AppError::Rpc(RpcError::Transport { cause, .. }) => {
                cause.is_timeout() || cause.is_connect() || cause.is_request()
            }
            AppError::Rpc(RpcError::HttpStatus { status, .. }) => {
                matches!(status, 408 | 429 | 502 | 503 | 504)
            }
            _ => false,
        }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_transience() {
        let busy = AppError::Rpc(RpcError::HttpStatus {
            service: "SmartSchool.Exam.GetExam".to_string(),
            status: 503,
        });
        let missing = AppError::Rpc(RpcError::HttpStatus {
            service: "SmartSchool.Exam.GetExam".to_string(),
            status: 404,
        });
        assert!(busy.is_transient());
        assert!(!missing.is_transient());
    }

    #[test]
    fn test_service_fault_is_not_transient() {
        let fault = AppError::Rpc(RpcError::ServiceFault {
            service: "SmartSchool.Exam.GetExam".to_string(),
            code: "501".to_string(),
            message: "權限不足".to_string(),
        });
        assert!(!fault.is_transient());
        assert!(fault.to_string().contains("501"));
    }

    #[test]
    fn test_package_failed_message_is_one_based() {
        let err = AppError::Batch(BatchError::PackageFailed {
            package_index: 1,
            package_count: 3,
            cause: Box::new(AppError::malformed_xml("缺少 Response")),
        });
        let msg = err.to_string();
        assert!(msg.contains("第 2 个包"), "实际信息: {}", msg);
        assert!(msg.contains("共 3 个"));
    }

    #[test]
    fn test_context_chain_prints_each_message_once() {
        let inner = AppError::Business(BusinessError::MissingId {
            entity: "Exam",
            action: "更新",
        });
        let err = anyhow::Error::from(inner).context("[文件 1] 更新考试别失败");
        let chain = format!("{:#}", err);
        assert_eq!(chain.matches("缺少系统编号").count(), 1, "实际信息: {}", chain);

        let batch = AppError::Batch(BatchError::PackageFailed {
            package_index: 0,
            package_count: 1,
            cause: Box::new(AppError::malformed_xml("缺少 Response")),
        });
        let chain = format!("{:#}", anyhow::Error::from(batch).context("新增失败"));
        assert_eq!(chain.matches("缺少 Response").count(), 1, "实际信息: {}", chain);
    }
}
