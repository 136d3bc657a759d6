// 変換ワーカープール
// 受信した値を必ずディープコピーしてから変換に渡す

use crate::core::{DeepCopy, ReduceResult};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;

/// 単一変換ワーカーを起動
pub(crate) fn spawn_single_transformer<T, U, F>(
    intake_rx: Arc<Mutex<mpsc::Receiver<T>>>,
    out_tx: mpsc::Sender<U>,
    transform: Arc<F>,
    processed_count: Arc<AtomicUsize>,
) -> JoinHandle<ReduceResult<()>>
where
    T: DeepCopy,
    U: Send + 'static,
    F: Fn(T) -> U + Send + Sync + 'static,
{
    tokio::spawn(async move {
        loop {
            // 次の入力を取得
            let item = {
                let mut rx = intake_rx.lock().await;
                match rx.recv().await {
                    Some(item) => item,
                    None => break, // intake終了
                }
            };

            // 変換が他ワーカーと共有され得る値を観測しないようコピーしてから適用
            let copy = item.deep_copy();
            if out_tx.send(transform(copy)).await.is_err() {
                // 出力チャンネルが閉じられた場合は終了
                break;
            }
            processed_count.fetch_add(1, Ordering::Relaxed);
        }
        Ok(())
    })
}

/// 変換ワーカープールを起動
pub(crate) fn spawn_transformers<T, U, F>(
    intake_rx: mpsc::Receiver<T>,
    out_tx: mpsc::Sender<U>,
    transform: Arc<F>,
    processed_count: Arc<AtomicUsize>,
    worker_count: usize,
) -> Vec<JoinHandle<ReduceResult<()>>>
where
    T: DeepCopy,
    U: Send + 'static,
    F: Fn(T) -> U + Send + Sync + 'static,
{
    let intake_rx = Arc::new(Mutex::new(intake_rx));
    let mut handles = Vec::with_capacity(worker_count);

    for _ in 0..worker_count {
        handles.push(spawn_single_transformer(
            Arc::clone(&intake_rx),
            out_tx.clone(),
            Arc::clone(&transform),
            Arc::clone(&processed_count),
        ));
    }

    handles
}
