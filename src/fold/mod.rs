// 可換モノイドの列を1つの値へ畳み込む関数群
// スライス・チャンネル・汎用ソースの3系統の入口を提供する

mod engine;
mod worker;

use crate::core::{
    CommutativeMonoid, FoldConfig, Identity, ProgressReporter, ReduceResult, DEFAULT_FOLD_WORKERS,
};
use crate::monitoring::NoOpProgressReporter;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::mpsc;

/// スライスの全要素を畳み込む（デフォルトワーカー数）
pub async fn fold_slice<T, I>(values: Vec<T>, identity: I) -> ReduceResult<T>
where
    T: CommutativeMonoid,
    I: Identity<T>,
{
    fold_slice_n(values, identity, DEFAULT_FOLD_WORKERS).await
}

/// スライスの全要素を指定ワーカー数で畳み込む
pub async fn fold_slice_n<T, I>(values: Vec<T>, identity: I, workers: usize) -> ReduceResult<T>
where
    T: CommutativeMonoid,
    I: Identity<T>,
{
    fold_source_n(
        move |tx| async move {
            for value in values {
                if tx.send(value).await.is_err() {
                    break;
                }
            }
        },
        identity,
        workers,
    )
    .await
}

/// チャンネルが閉じられるまで要素を畳み込む（デフォルトワーカー数）
pub async fn fold_channel<T, I>(input: mpsc::Receiver<T>, identity: I) -> ReduceResult<T>
where
    T: CommutativeMonoid,
    I: Identity<T>,
{
    fold_channel_n(input, identity, DEFAULT_FOLD_WORKERS).await
}

/// チャンネルが閉じられるまで要素を指定ワーカー数で畳み込む
pub async fn fold_channel_n<T, I>(
    mut input: mpsc::Receiver<T>,
    identity: I,
    workers: usize,
) -> ReduceResult<T>
where
    T: CommutativeMonoid,
    I: Identity<T>,
{
    fold_source_n(
        move |tx| async move {
            while let Some(value) = input.recv().await {
                if tx.send(value).await.is_err() {
                    break;
                }
            }
        },
        identity,
        workers,
    )
    .await
}

/// シンクへ値を投入して戻るソース手続きから畳み込む（デフォルトワーカー数）
///
/// 最も汎用的な入口であり、スライス/チャンネル系はこの糖衣にすぎない。
pub async fn fold_source<T, I, S, Fut>(source: S, identity: I) -> ReduceResult<T>
where
    T: CommutativeMonoid,
    I: Identity<T>,
    S: FnOnce(mpsc::Sender<T>) -> Fut,
    Fut: Future<Output = ()>,
{
    fold_source_n(source, identity, DEFAULT_FOLD_WORKERS).await
}

/// ソース手続きから指定ワーカー数で畳み込む
pub async fn fold_source_n<T, I, S, Fut>(
    source: S,
    identity: I,
    workers: usize,
) -> ReduceResult<T>
where
    T: CommutativeMonoid,
    I: Identity<T>,
    S: FnOnce(mpsc::Sender<T>) -> Fut,
    Fut: Future<Output = ()>,
{
    fold_source_with(
        source,
        identity,
        &FoldConfig::new(workers),
        Arc::new(NoOpProgressReporter::new()),
    )
    .await
}

/// 設定と進捗報告を指定して畳み込むフルコントロール版
pub async fn fold_source_with<T, I, S, Fut, R>(
    source: S,
    identity: I,
    config: &FoldConfig,
    reporter: Arc<R>,
) -> ReduceResult<T>
where
    T: CommutativeMonoid,
    I: Identity<T>,
    S: FnOnce(mpsc::Sender<T>) -> Fut,
    Fut: Future<Output = ()>,
    R: ProgressReporter + ?Sized,
{
    engine::run_fold(source, Arc::new(identity), config, reporter).await
}
