//! 服务连接 - 基础设施层
//!
//! 持有唯一的 HTTP 客户端，只暴露"送出一个服务请求"的能力

use crate::config::Config;
use crate::error::{AppError, AppResult, RpcError};
use crate::infrastructure::envelope;
use crate::infrastructure::xml::XmlElement;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use tracing::debug;

/// 服务连接
///
/// 职责：
/// - 把请求元素送到指定服务，取回结果元素
/// - 不认识任何记录类型
/// - 不做重试，不做分包
#[async_trait]
pub trait ServiceConnection: Send + Sync {
    /// 调用远端服务
    ///
    /// # 参数
    /// - `service`: 服务全名（如 `SmartSchool.Exam.GetExam`）
    /// - `request`: 请求元素（通常是 `<Request>`）
    ///
    /// # 返回
    /// 返回回应 Body 中的结果元素
    async fn send(&self, service: &str, request: XmlElement) -> AppResult<XmlElement>;
}

/// 基于 HTTP 的 DSA 连接
pub struct HttpConnection {
    client: reqwest::Client,
    access_point: String,
    contract: String,
    session_token: String,
}

impl HttpConnection {
    /// 创建新的 HTTP 连接
    pub fn new(config: &Config) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| AppError::transport("<client>", e))?;

        Ok(Self {
            client,
            access_point: config.access_point.clone(),
            contract: config.contract.clone(),
            session_token: config.session_token.clone(),
        })
    }
}

#[async_trait]
impl ServiceConnection for HttpConnection {
    async fn send(&self, service: &str, request: XmlElement) -> AppResult<XmlElement> {
        let body = envelope::build_request(&self.contract, &self.session_token, service, request)
            .to_xml();

        debug!("调用服务 {}，请求长度: {} 字节", service, body.len());

        let response = self
            .client
            .post(&self.access_point)
            .header(CONTENT_TYPE, "text/xml; charset=utf-8")
            .body(body)
            .send()
            .await
            .map_err(|e| AppError::transport(service, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RpcError::HttpStatus {
                service: service.to_string(),
                status: status.as_u16(),
            }
            .into());
        }

        let raw = response
            .text()
            .await
            .map_err(|e| AppError::transport(service, e))?;

        debug!("服务 {} 回应长度: {} 字节", service, raw.len());

        envelope::parse_response(service, &raw)
    }
}
