// シーケンスの各要素に関数を適用する関数群
// 出力順序は保証しない（unordered transform）

mod worker;

use crate::core::{
    DeepCopy, MapConfig, PoolConfig, ProgressReporter, ReduceResult, DEFAULT_MAP_WORKERS,
};
use crate::monitoring::NoOpProgressReporter;
use std::future::Future;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};
use tokio::sync::mpsc;
use worker::spawn_transformers;

/// ソースの各要素に変換を適用して出力シンクへ届ける（デフォルトワーカー数）
///
/// 全ワーカーの合流後にシンクを閉じる。
pub async fn for_each<T, U, S, Fut, F>(
    source: S,
    out: mpsc::Sender<U>,
    transform: F,
) -> ReduceResult<()>
where
    T: DeepCopy,
    U: Send + 'static,
    S: FnOnce(mpsc::Sender<T>) -> Fut,
    Fut: Future<Output = ()> + Send + 'static,
    F: Fn(T) -> U + Send + Sync + 'static,
{
    for_each_n(source, out, transform, DEFAULT_MAP_WORKERS).await
}

/// ソースの各要素に変換を指定ワーカー数で適用する
pub async fn for_each_n<T, U, S, Fut, F>(
    source: S,
    out: mpsc::Sender<U>,
    transform: F,
    workers: usize,
) -> ReduceResult<()>
where
    T: DeepCopy,
    U: Send + 'static,
    S: FnOnce(mpsc::Sender<T>) -> Fut,
    Fut: Future<Output = ()> + Send + 'static,
    F: Fn(T) -> U + Send + Sync + 'static,
{
    for_each_with(
        source,
        out,
        transform,
        &MapConfig::new(workers),
        Arc::new(NoOpProgressReporter::new()),
    )
    .await
}

/// 設定と進捗報告を指定して変換を適用するフルコントロール版
pub async fn for_each_with<T, U, S, Fut, F, R>(
    source: S,
    out: mpsc::Sender<U>,
    transform: F,
    config: &MapConfig,
    reporter: Arc<R>,
) -> ReduceResult<()>
where
    T: DeepCopy,
    U: Send + 'static,
    S: FnOnce(mpsc::Sender<T>) -> Fut,
    Fut: Future<Output = ()> + Send + 'static,
    F: Fn(T) -> U + Send + Sync + 'static,
    R: ProgressReporter + ?Sized,
{
    let (intake_tx, intake_rx) = mpsc::channel::<T>(config.queue_capacity());
    let processed_count = Arc::new(AtomicUsize::new(0));
    let transform = Arc::new(transform);

    reporter.report_started(config.worker_count()).await;

    // ソースは非同期に1回だけ起動され、戻ることでintakeを閉じる
    let source_handle = tokio::spawn(source(intake_tx));

    let handles = spawn_transformers(
        intake_rx,
        out.clone(),
        transform,
        Arc::clone(&processed_count),
        config.worker_count(),
    );

    source_handle.await?;
    for handle in handles {
        handle.await??;
    }

    // 全ワーカー合流後に手放すことで、シンクはここで初めて閉じられる
    drop(out);

    reporter
        .report_completed(processed_count.load(Ordering::Relaxed))
        .await;
    Ok(())
}
