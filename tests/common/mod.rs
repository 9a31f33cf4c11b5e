//! 集成测试共用的内存连接
#![allow(dead_code)]

use async_trait::async_trait;
use k12_evaluation::error::{AppError, AppResult, RpcError};
use k12_evaluation::infrastructure::{BatchOptions, ServiceConnection, XmlElement};
use k12_evaluation::{DsaClient, Evaluation, RetryPolicy};
use std::sync::{Arc, Mutex};
use std::time::Duration;

type Handler = dyn Fn(&str, &XmlElement) -> AppResult<XmlElement> + Send + Sync;

/// 记录每一次请求，并由 handler 决定回应
pub struct MockConnection {
    handler: Box<Handler>,
    calls: Mutex<Vec<(String, XmlElement)>>,
}

impl MockConnection {
    pub fn new<F>(handler: F) -> Arc<Self>
    where
        F: Fn(&str, &XmlElement) -> AppResult<XmlElement> + Send + Sync + 'static,
    {
        Arc::new(Self {
            handler: Box::new(handler),
            calls: Mutex::new(Vec::new()),
        })
    }

    /// 送往指定服务的所有请求
    pub fn calls_to(&self, service: &str) -> Vec<XmlElement> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(s, _)| s == service)
            .map(|(_, r)| r.clone())
            .collect()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl ServiceConnection for MockConnection {
    async fn send(&self, service: &str, request: XmlElement) -> AppResult<XmlElement> {
        let reply = (self.handler)(service, &request);
        self.calls
            .lock()
            .unwrap()
            .push((service.to_string(), request));
        reply
    }
}

/// 快速重试的客户端与全部闸道
pub fn evaluation(connection: Arc<MockConnection>, package_size: usize) -> Evaluation {
    let retry = RetryPolicy {
        max_attempts: 3,
        initial_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(2),
    };
    let client = Arc::new(DsaClient::new(connection, retry));
    Evaluation::new(
        client,
        BatchOptions {
            max_threads: 2,
            package_size,
        },
    )
}

/// 新增回应：每笔记录一个 `NewID`，编号取 `prefix` 加上该笔的 `field` 值
pub fn new_ids(request: &XmlElement, field: &str, prefix: &str) -> XmlElement {
    XmlElement::new("Response").with_children(request.elements().map(|record| {
        let value = record.child_text(field).unwrap_or_default();
        XmlElement::new("NewID").with_text(format!("{}{}", prefix, value))
    }))
}

/// 更新/删除回应：受影响笔数等于请求中的记录数
pub fn execute_count(request: &XmlElement) -> XmlElement {
    XmlElement::new("Response")
        .with_child(XmlElement::new("ExecuteCount").with_text(request.elements().count().to_string()))
}

pub fn unavailable(service: &str) -> AppError {
    AppError::Rpc(RpcError::HttpStatus {
        service: service.to_string(),
        status: 503,
    })
}

pub fn fault(service: &str) -> AppError {
    AppError::Rpc(RpcError::ServiceFault {
        service: service.to_string(),
        code: "501".to_string(),
        message: "權限不足".to_string(),
    })
}
