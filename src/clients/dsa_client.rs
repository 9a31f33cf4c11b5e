/// DSA 服务客户端
///
/// 封装所有与远端服务的调用逻辑：读取调用自动重试，写入调用只尝试一次
use crate::clients::retry::{retry_async, RetryPolicy};
use crate::config::Config;
use crate::error::AppResult;
use crate::infrastructure::connection::{HttpConnection, ServiceConnection};
use crate::infrastructure::xml::XmlElement;
use std::sync::Arc;
use tracing::debug;

/// DSA 服务客户端
pub struct DsaClient {
    connection: Arc<dyn ServiceConnection>,
    retry: RetryPolicy,
}

impl DsaClient {
    /// 使用指定连接创建客户端
    pub fn new(connection: Arc<dyn ServiceConnection>, retry: RetryPolicy) -> Self {
        Self { connection, retry }
    }

    /// 按配置创建 HTTP 客户端
    pub fn from_config(config: &Config) -> AppResult<Self> {
        let connection = HttpConnection::new(config)?;
        Ok(Self::new(
            Arc::new(connection),
            RetryPolicy::from_config(config),
        ))
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// 调用服务（只尝试一次）
    ///
    /// # 参数
    /// - `service`: 服务全名
    /// - `request`: 请求元素
    ///
    /// # 返回
    /// 返回回应中的结果元素
    pub async fn call(&self, service: &str, request: XmlElement) -> AppResult<XmlElement> {
        debug!("调用服务: {}", service);
        self.connection.send(service, request).await
    }

    /// 读取类调用：遇到暂时性网络错误时整体重试
    pub async fn call_with_retry(
        &self,
        service: &str,
        request: XmlElement,
    ) -> AppResult<XmlElement> {
        retry_async(&self.retry, service, || self.call(service, request.clone())).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AppError, RpcError};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::time::Duration;

    /// 依序回放预设结果的连接
    struct ScriptedConnection {
        replies: Mutex<Vec<AppResult<XmlElement>>>,
        calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ServiceConnection for ScriptedConnection {
        async fn send(&self, service: &str, _request: XmlElement) -> AppResult<XmlElement> {
            self.calls.lock().unwrap().push(service.to_string());
            self.replies.lock().unwrap().remove(0)
        }
    }

    fn unavailable() -> AppError {
        AppError::Rpc(RpcError::HttpStatus {
            service: "SmartSchool.Exam.GetExam".to_string(),
            status: 502,
        })
    }

    fn client(replies: Vec<AppResult<XmlElement>>) -> (DsaClient, Arc<ScriptedConnection>) {
        let connection = Arc::new(ScriptedConnection {
            replies: Mutex::new(replies),
            calls: Mutex::new(Vec::new()),
        });
        let policy = RetryPolicy {
            max_attempts: 3,
            initial_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(1),
        };
        (DsaClient::new(connection.clone(), policy), connection)
    }

    #[tokio::test]
    async fn test_read_call_retries_transient_failure() {
        let (client, connection) = client(vec![
            Err(unavailable()),
            Ok(XmlElement::new("Response")),
        ]);

        let response = client
            .call_with_retry("SmartSchool.Exam.GetExam", XmlElement::new("Request"))
            .await
            .unwrap();

        assert_eq!(response.name(), "Response");
        assert_eq!(connection.calls.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_write_call_is_attempted_once() {
        let (client, connection) = client(vec![
            Err(unavailable()),
            Ok(XmlElement::new("Response")),
        ]);

        let result = client
            .call("SmartSchool.Exam.InsertExam", XmlElement::new("Request"))
            .await;

        assert!(result.is_err());
        assert_eq!(connection.calls.lock().unwrap().len(), 1);
    }
}
