//! 分包并发执行器 - 基础设施层
//!
//! ## 职责
//!
//! 把一批同质的记录切成固定大小的包，每个包交给一次远端调用，
//! 最多同时执行 `max_threads` 个包。
//!
//! ## 错误语义
//!
//! 每个包的错误各自保存；所有包都结束后，才按包的顺序回传第一个错误。
//! 已成功的包不会回滚，调用者只会知道"有错误"。

use crate::config::Config;
use crate::error::{AppError, AppResult, BatchError};
use futures::future::join_all;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, error};

/// 批次选项
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchOptions {
    /// 同时执行的包数量上限
    pub max_threads: usize,
    /// 每个包的记录数量
    pub package_size: usize,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            max_threads: 3,
            package_size: 100,
        }
    }
}

impl BatchOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_threads: config.max_threads,
            package_size: config.package_size,
        }
    }
}

/// 一个包
#[derive(Debug, Clone)]
pub struct Package<T> {
    /// 包编号（从 0 开始）
    pub index: usize,
    pub items: Vec<T>,
}

/// 单个包的执行结果
#[derive(Debug)]
pub struct PackageOutcome<R> {
    pub index: usize,
    pub item_count: usize,
    pub result: AppResult<Vec<R>>,
}

impl<R> PackageOutcome<R> {
    pub fn has_error(&self) -> bool {
        self.result.is_err()
    }
}

/// 分包并发执行器
#[derive(Debug, Clone, Copy)]
pub struct MultiThreadWorker {
    max_threads: usize,
    package_size: usize,
}

impl MultiThreadWorker {
    /// 创建执行器，0 值会被修正为 1
    pub fn new(options: BatchOptions) -> Self {
        Self {
            max_threads: options.max_threads.max(1),
            package_size: options.package_size.max(1),
        }
    }

    /// 按顺序切包
    pub fn partition<T>(&self, items: Vec<T>) -> Vec<Package<T>> {
        let mut packages = Vec::with_capacity(items.len().div_ceil(self.package_size));
        let mut iter = items.into_iter().peekable();
        while iter.peek().is_some() {
            let chunk: Vec<T> = iter.by_ref().take(self.package_size).collect();
            packages.push(Package {
                index: packages.len(),
                items: chunk,
            });
        }
        packages
    }

    /// 执行所有包，回传每个包的结果（按包顺序）
    ///
    /// # 参数
    /// - `items`: 全部记录
    /// - `work`: 处理单个包的异步函数（一个包一次远端调用）
    pub async fn run<T, R, F, Fut>(&self, items: Vec<T>, work: F) -> Vec<PackageOutcome<R>>
    where
        T: Send + 'static,
        R: Send + 'static,
        F: Fn(Package<T>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = AppResult<Vec<R>>> + Send + 'static,
    {
        let packages = self.partition(items);
        if packages.is_empty() {
            return Vec::new();
        }

        debug!(
            "分包执行: {} 个包，每包最多 {} 笔，并发 {}",
            packages.len(),
            self.package_size,
            self.max_threads
        );

        let semaphore = Arc::new(Semaphore::new(self.max_threads));
        let work = Arc::new(work);
        let mut handles = Vec::with_capacity(packages.len());

        for package in packages {
            let index = package.index;
            let item_count = package.items.len();
            let semaphore = semaphore.clone();
            let work = work.clone();

            let handle = tokio::spawn(async move {
                // 信号量不会被关闭，acquire 只有在关闭时才失败
                let _permit = semaphore.acquire_owned().await.ok();
                work(package).await
            });
            handles.push((index, item_count, handle));
        }

        join_all(handles.into_iter().map(|(index, item_count, handle)| async move {
            let result = match handle.await {
                Ok(result) => result,
                Err(e) => Err(AppError::Batch(BatchError::TaskJoin {
                    package_index: index,
                    message: e.to_string(),
                })),
            };
            PackageOutcome {
                index,
                item_count,
                result,
            }
        }))
        .await
    }

    /// 执行所有包并汇总
    ///
    /// 所有包结束后，若有失败的包，回传其中包编号最小者的错误；
    /// 否则按输入顺序合并结果。
    pub async fn run_and_collect<T, R, F, Fut>(&self, items: Vec<T>, work: F) -> AppResult<Vec<R>>
    where
        T: Send + 'static,
        R: Send + 'static,
        F: Fn(Package<T>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = AppResult<Vec<R>>> + Send + 'static,
    {
        let outcomes = self.run(items, work).await;
        collect_outcomes(outcomes)
    }
}

/// 合并包结果，回传第一个失败包的错误
pub fn collect_outcomes<R>(outcomes: Vec<PackageOutcome<R>>) -> AppResult<Vec<R>> {
    let package_count = outcomes.len();
    let mut merged = Vec::new();
    let mut first_error: Option<(usize, AppError)> = None;

    for outcome in outcomes {
        match outcome.result {
            Ok(mut results) => merged.append(&mut results),
            Err(e) => {
                error!(
                    "第 {}/{} 个包失败（{} 笔）: {}",
                    outcome.index + 1,
                    package_count,
                    outcome.item_count,
                    e
                );
                if first_error.is_none() {
                    first_error = Some((outcome.index, e));
                }
            }
        }
    }

    match first_error {
        Some((package_index, cause)) => Err(BatchError::PackageFailed {
            package_index,
            package_count,
            cause: Box::new(cause),
        }
        .into()),
        None => Ok(merged),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn worker(max_threads: usize, package_size: usize) -> MultiThreadWorker {
        MultiThreadWorker::new(BatchOptions {
            max_threads,
            package_size,
        })
    }

    #[test]
    fn test_partition_keeps_order_and_last_package_short() {
        let packages = worker(3, 4).partition((1..=10).collect::<Vec<_>>());
        assert_eq!(packages.len(), 3);
        assert_eq!(packages[0].items, vec![1, 2, 3, 4]);
        assert_eq!(packages[2].items, vec![9, 10]);
        assert_eq!(packages[2].index, 2);
    }

    #[test]
    fn test_zero_options_are_clamped() {
        let packages = worker(0, 0).partition(vec!["a", "b"]);
        assert_eq!(packages.len(), 2);
    }

    #[tokio::test]
    async fn test_empty_input_runs_nothing() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let result: Vec<u32> = worker(3, 10)
            .run_and_collect(Vec::<u32>::new(), move |p| {
                counter.fetch_add(1, Ordering::SeqCst);
                async move { Ok(p.items) }
            })
            .await
            .unwrap();
        assert!(result.is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_results_merge_in_input_order() {
        let result = worker(4, 3)
            .run_and_collect((0..20).collect::<Vec<u32>>(), |p| async move {
                // 后面的包先完成
                tokio::time::sleep(Duration::from_millis(20 - p.index as u64 * 2)).await;
                Ok(p.items.into_iter().map(|n| n * 10).collect::<Vec<u32>>())
            })
            .await
            .unwrap();
        assert_eq!(result, (0..20).map(|n| n * 10).collect::<Vec<u32>>());
    }

    #[tokio::test]
    async fn test_concurrency_never_exceeds_max_threads() {
        let active = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let (a, p) = (active.clone(), peak.clone());

        worker(2, 1)
            .run_and_collect((0..8).collect::<Vec<u32>>(), move |pkg| {
                let (a, p) = (a.clone(), p.clone());
                async move {
                    let now = a.fetch_add(1, Ordering::SeqCst) + 1;
                    p.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(10)).await;
                    a.fetch_sub(1, Ordering::SeqCst);
                    Ok(pkg.items)
                }
            })
            .await
            .unwrap();

        assert!(peak.load(Ordering::SeqCst) <= 2);
        assert!(peak.load(Ordering::SeqCst) >= 1);
    }

    #[tokio::test]
    async fn test_first_failed_package_is_reported_after_all_finish() {
        let finished = Arc::new(AtomicUsize::new(0));
        let counter = finished.clone();

        let err = worker(3, 2)
            .run_and_collect((0..10).collect::<Vec<u32>>(), move |p| {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    if p.index == 1 || p.index == 3 {
                        Err(AppError::malformed_xml(format!("包 {} 失败", p.index)))
                    } else {
                        Ok(p.items)
                    }
                }
            })
            .await
            .unwrap_err();

        assert_eq!(finished.load(Ordering::SeqCst), 5, "所有包都应执行完毕");
        match err {
            AppError::Batch(BatchError::PackageFailed {
                package_index,
                package_count,
                cause,
            }) => {
                assert_eq!(package_index, 1);
                assert_eq!(package_count, 5);
                assert!(cause.to_string().contains("包 1 失败"));
            }
            other => panic!("预期 PackageFailed，实际: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_run_reports_every_package() {
        let outcomes = worker(2, 5)
            .run((0..12).collect::<Vec<u32>>(), |p| async move {
                if p.index == 2 {
                    Err(AppError::malformed_xml("坏包"))
                } else {
                    Ok(p.items)
                }
            })
            .await;
        assert_eq!(outcomes.len(), 3);
        assert_eq!(outcomes[2].item_count, 2);
        assert!(outcomes[2].has_error());
        assert!(!outcomes[0].has_error());
    }

    #[tokio::test]
    async fn test_panicking_package_becomes_task_join_error() {
        let err = worker(2, 2)
            .run_and_collect((0..6).collect::<Vec<u32>>(), |p| async move {
                if p.index == 1 {
                    panic!("包 1 崩溃");
                }
                Ok(p.items)
            })
            .await
            .unwrap_err();

        match err {
            AppError::Batch(BatchError::PackageFailed {
                package_index,
                package_count,
                cause,
            }) => {
                assert_eq!(package_index, 1);
                assert_eq!(package_count, 3);
                assert!(matches!(
                    *cause,
                    AppError::Batch(BatchError::TaskJoin { package_index: 1, .. })
                ));
            }
            other => panic!("预期 PackageFailed，实际: {:?}", other),
        }
    }
}
