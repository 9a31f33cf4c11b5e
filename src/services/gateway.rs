//! 通用存取闸道 - 业务能力层
//!
//! ## 职责
//!
//! 对任意 `Record` 提供 select / insert / update / delete：
//! 组请求 XML → 调用远端服务 → 解析回应 XML。
//!
//! ## 设计特点
//!
//! - 读取：经 `call_with_retry`，暂时性网络错误会整体重试
//! - 写入：大量记录经 `MultiThreadWorker` 分包并发，每包一次调用
//! - 大量编号的查询同样分包并发，结果保持包顺序

use crate::clients::DsaClient;
use crate::error::{AppResult, BusinessError, RpcError};
use crate::infrastructure::worker::{BatchOptions, MultiThreadWorker, Package};
use crate::infrastructure::xml::XmlElement;
use crate::models::record::Record;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// 查询条件
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectQuery {
    conditions: Vec<(String, String)>,
    orders: Vec<String>,
}

impl SelectQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// 单一条件
    pub fn condition(mut self, key: &str, value: impl ToString) -> Self {
        self.conditions.push((key.to_string(), value.to_string()));
        self
    }

    /// 同一个键的多个值（服务端视为 OR）
    pub fn conditions<I, V>(mut self, key: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: ToString,
    {
        self.conditions
            .extend(values.into_iter().map(|v| (key.to_string(), v.to_string())));
        self
    }

    /// 排序字段
    pub fn order(mut self, field: &str) -> Self {
        self.orders.push(field.to_string());
        self
    }

    pub fn is_unconditional(&self) -> bool {
        self.conditions.is_empty()
    }

    /// `<Request><Field><All/></Field><Condition>…</Condition><Order>…</Order></Request>`
    pub fn to_request(&self) -> XmlElement {
        let mut request = XmlElement::new("Request")
            .with_child(XmlElement::new("Field").with_child(XmlElement::new("All")));

        if !self.conditions.is_empty() {
            request.push_child(XmlElement::new("Condition").with_children(
                self.conditions
                    .iter()
                    .map(|(k, v)| XmlElement::new(k.as_str()).with_text(v.as_str())),
            ));
        }
        if !self.orders.is_empty() {
            request.push_child(
                XmlElement::new("Order")
                    .with_children(self.orders.iter().map(|o| XmlElement::new(o.as_str()))),
            );
        }
        request
    }
}

/// 通用存取闸道
pub struct Gateway<R: Record> {
    client: Arc<DsaClient>,
    batch: BatchOptions,
    _record: PhantomData<fn() -> R>,
}

impl<R: Record> Clone for Gateway<R> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            batch: self.batch,
            _record: PhantomData,
        }
    }
}

impl<R: Record> Gateway<R> {
    pub fn new(client: Arc<DsaClient>, batch: BatchOptions) -> Self {
        Self {
            client,
            batch,
            _record: PhantomData,
        }
    }

    pub fn client(&self) -> &Arc<DsaClient> {
        &self.client
    }

    pub fn batch_options(&self) -> BatchOptions {
        self.batch
    }

    fn worker(&self) -> MultiThreadWorker {
        MultiThreadWorker::new(self.batch)
    }

    // ========== 读取 ==========

    /// 依条件查询
    pub async fn select(&self, query: &SelectQuery) -> AppResult<Vec<R>> {
        select_with(&self.client, query).await
    }

    pub async fn select_all(&self) -> AppResult<Vec<R>> {
        self.select(&SelectQuery::new()).await
    }

    pub async fn select_by_id(&self, id: &str) -> AppResult<Option<R>> {
        if id.trim().is_empty() {
            return Ok(None);
        }
        let query = SelectQuery::new().condition(R::KEY_FIELD, id);
        Ok(self.select(&query).await?.into_iter().next())
    }

    pub async fn select_by_ids(&self, ids: &[String]) -> AppResult<Vec<R>> {
        self.select_by_values(R::KEY_FIELD, ids).await
    }

    /// 以某个键的大量值查询；空列表不调用远端，超过一包时分包并发
    pub async fn select_by_values(&self, key: &'static str, values: &[String]) -> AppResult<Vec<R>> {
        self.select_by_values_with(key, values, SelectQuery::new())
            .await
    }

    /// 同 `select_by_values`，但每个包都附加 `base` 中的其他条件
    pub async fn select_by_values_with(
        &self,
        key: &'static str,
        values: &[String],
        base: SelectQuery,
    ) -> AppResult<Vec<R>> {
        let values: Vec<String> = values
            .iter()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .collect();
        if values.is_empty() {
            return Ok(Vec::new());
        }

        if values.len() <= self.batch.package_size {
            return self.select(&base.conditions(key, values)).await;
        }

        let client = self.client.clone();
        let base = Arc::new(base);
        self.worker()
            .run_and_collect(values, move |package: Package<String>| {
                let client = client.clone();
                let query = base.as_ref().clone().conditions(key, package.items);
                async move { select_with::<R>(&client, &query).await }
            })
            .await
    }

    // ========== 新增 ==========

    /// 新增单笔，回传新编号
    pub async fn insert(&self, record: &R) -> AppResult<String> {
        let ids = insert_package(&self.client, std::slice::from_ref(record)).await?;
        ids.into_iter().next().ok_or_else(|| {
            BusinessError::NewIdMismatch {
                entity: R::ELEMENT,
                sent: 1,
                returned: 0,
            }
            .into()
        })
    }

    /// 批次新增，回传与输入顺序对应的新编号
    pub async fn insert_batch(&self, records: Vec<R>) -> AppResult<Vec<String>> {
        if records.is_empty() {
            return Ok(Vec::new());
        }
        info!("新增 {} 笔 {}", records.len(), R::ELEMENT);

        let client = self.client.clone();
        self.worker()
            .run_and_collect(records, move |package: Package<R>| {
                let client = client.clone();
                async move { insert_package(&client, &package.items).await }
            })
            .await
    }

    // ========== 更新 ==========

    /// 更新单笔，回传受影响笔数
    pub async fn update(&self, record: &R) -> AppResult<usize> {
        update_package(&self.client, std::slice::from_ref(record)).await
    }

    /// 批次更新，回传受影响笔数合计
    ///
    /// 任何一笔缺少编号都会在调用远端之前被拒绝。
    pub async fn update_batch(&self, records: Vec<R>) -> AppResult<usize> {
        if records.is_empty() {
            return Ok(0);
        }
        ensure_ids(&records, "更新")?;
        info!("更新 {} 笔 {}", records.len(), R::ELEMENT);

        let client = self.client.clone();
        let counts = self
            .worker()
            .run_and_collect(records, move |package: Package<R>| {
                let client = client.clone();
                async move { update_package(&client, &package.items).await.map(|n| vec![n]) }
            })
            .await?;
        Ok(counts.into_iter().sum())
    }

    // ========== 删除 ==========

    /// 依编号删除单笔
    pub async fn delete(&self, id: &str) -> AppResult<usize> {
        delete_package::<R>(&self.client, &[id.to_string()]).await
    }

    /// 依编号批次删除
    pub async fn delete_batch(&self, ids: Vec<String>) -> AppResult<usize> {
        let ids: Vec<String> = ids.into_iter().filter(|id| !id.trim().is_empty()).collect();
        if ids.is_empty() {
            return Ok(0);
        }
        info!("删除 {} 笔 {}", ids.len(), R::ELEMENT);

        let client = self.client.clone();
        let counts = self
            .worker()
            .run_and_collect(ids, move |package: Package<String>| {
                let client = client.clone();
                async move { delete_package::<R>(&client, &package.items).await.map(|n| vec![n]) }
            })
            .await?;
        Ok(counts.into_iter().sum())
    }

    /// 删除记录（依记录的编号）
    pub async fn delete_records(&self, records: &[R]) -> AppResult<usize> {
        ensure_ids(records, "删除")?;
        let ids = records
            .iter()
            .filter_map(|r| r.id().map(str::to_string))
            .collect();
        self.delete_batch(ids).await
    }
}

// ========== 单包操作 ==========

async fn select_with<R: Record>(client: &DsaClient, query: &SelectQuery) -> AppResult<Vec<R>> {
    let response = client
        .call_with_retry(R::SERVICES.select, query.to_request())
        .await?;
    let records = response
        .children(R::ELEMENT)
        .map(R::from_element)
        .collect::<AppResult<Vec<R>>>()?;
    debug!("{} 回传 {} 笔 {}", R::SERVICES.select, records.len(), R::ELEMENT);
    Ok(records)
}

async fn insert_package<R: Record>(client: &DsaClient, records: &[R]) -> AppResult<Vec<String>> {
    let mut request = XmlElement::new("Request");
    for record in records {
        request.push_child(XmlElement::new(R::ELEMENT).with_children(record.field_elements()?));
    }

    let response = client.call(R::SERVICES.insert, request).await?;
    let ids: Vec<String> = response
        .children("NewID")
        .map(|e| e.text().trim().to_string())
        .collect();

    if ids.len() != records.len() {
        return Err(BusinessError::NewIdMismatch {
            entity: R::ELEMENT,
            sent: records.len(),
            returned: ids.len(),
        }
        .into());
    }
    Ok(ids)
}

async fn update_package<R: Record>(client: &DsaClient, records: &[R]) -> AppResult<usize> {
    ensure_ids(records, "更新")?;

    let mut request = XmlElement::new("Request");
    for record in records {
        let id = record.id().unwrap_or_default();
        request.push_child(
            XmlElement::new(R::ELEMENT)
                .with_child(XmlElement::new("Field").with_children(record.field_elements()?))
                .with_child(condition::<R>(id)),
        );
    }

    let response = client.call(R::SERVICES.update, request).await?;
    execute_count(R::SERVICES.update, &response, records.len())
}

async fn delete_package<R: Record>(client: &DsaClient, ids: &[String]) -> AppResult<usize> {
    let request = XmlElement::new("Request").with_children(
        ids.iter()
            .map(|id| XmlElement::new(R::ELEMENT).with_child(condition::<R>(id))),
    );

    let response = client.call(R::SERVICES.delete, request).await?;
    execute_count(R::SERVICES.delete, &response, ids.len())
}

fn condition<R: Record>(id: &str) -> XmlElement {
    XmlElement::new("Condition").with_child(XmlElement::new(R::KEY_FIELD).with_text(id))
}

fn ensure_ids<R: Record>(records: &[R], action: &'static str) -> AppResult<()> {
    if records
        .iter()
        .any(|r| r.id().map_or(true, |id| id.trim().is_empty()))
    {
        return Err(BusinessError::MissingId {
            entity: R::ELEMENT,
            action,
        }
        .into());
    }
    Ok(())
}

/// 受影响笔数；回应未附 `ExecuteCount` 时以送出笔数计
fn execute_count(service: &str, response: &XmlElement, sent: usize) -> AppResult<usize> {
    match response.child_text("ExecuteCount") {
        None => {
            warn!("服务 {} 未回传 ExecuteCount，以送出笔数 {} 计", service, sent);
            Ok(sent)
        }
        Some(raw) => raw.parse::<usize>().map_err(|_| {
            RpcError::MalformedResponse {
                service: service.to_string(),
                detail: format!("ExecuteCount 不是数字: {}", raw),
            }
            .into()
        }),
    }
}
