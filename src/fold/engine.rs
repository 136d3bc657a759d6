// foldエンジンのオーケストレーション
// 結合キュー・停止シグナル・ワーカープールは呼び出しごとに生成され、
// 呼び出しの終了とともに破棄される（プロセス全体の状態は持たない）

use super::worker::{drain_to_one, spawn_folder};
use crate::core::{CommutativeMonoid, FoldConfig, Identity, PoolConfig, ProgressReporter};
use crate::core::{ReduceError, ReduceResult};
use std::future::Future;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};
use tokio::sync::{mpsc, watch, Mutex};

/// foldエンジン本体
///
/// シャットダウン手順:
/// 1. ソースが全値を共有キューへ投入して戻る
/// 2. 停止シグナルをちょうど1回だけ遷移させる
/// 3. 全ワーカーの合流を待つ
/// 4. 最終の非ブロッキングdrainで残値を1つへ畳み込む
/// 5. 共有キューからちょうど1値を受信して返す
///
/// 手順4は実在するレースの後始末になる。停止の瞬間に複数のワーカーが
/// それぞれ1値だけを受信すると、各自が「最後の1つ」を持っていると
/// 判断して値を戻すため、対にするワーカーが残っていない複数の残値が
/// キューに生じ得る。
pub(crate) async fn run_fold<T, I, S, Fut, R>(
    source: S,
    identity: Arc<I>,
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
    // 停止後はワーカーごとに最大1値（手持ちまたは単位元）が環流するため、
    // 容量がワーカー数を下回るとリレーの転送が詰まって合流が完了しない。
    // 実効容量はワーカー数を下限とする。
    let queue_capacity = config.queue_capacity().max(config.worker_count());
    let (queue_tx, queue_rx) = mpsc::channel::<T>(queue_capacity);
    let queue_rx = Arc::new(Mutex::new(queue_rx));
    let (stop_tx, stop_rx) = watch::channel(false);
    let combine_count = Arc::new(AtomicUsize::new(0));

    reporter.report_started(config.worker_count()).await;

    let mut handles = Vec::with_capacity(config.worker_count());
    for _ in 0..config.worker_count() {
        handles.push(spawn_folder(
            queue_tx.clone(),
            Arc::clone(&queue_rx),
            stop_rx.clone(),
            Arc::clone(&identity),
            Arc::clone(&combine_count),
        ));
    }

    // ソースは呼び出し側タスク上で走り、全値の投入後に戻る
    source(queue_tx.clone()).await;

    // 停止シグナルはちょうど1回だけ遷移し、二度とリセットされない
    stop_tx
        .send(true)
        .map_err(|_| ReduceError::channel("停止シグナルの受信側が全て終了しています"))?;

    for handle in handles {
        handle.await??;
    }

    // 複数の「最後の1つ」を畳み込む最終パス
    drain_to_one(&queue_rx, &queue_tx, &combine_count).await?;

    // ワーカー合流後のキューには必ず1値以上が残っている
    let result = {
        let mut rx = queue_rx.lock().await;
        rx.recv()
            .await
            .ok_or_else(|| ReduceError::channel("結合キューが結果を返す前に閉じられました"))?
    };

    reporter
        .report_completed(combine_count.load(Ordering::Relaxed))
        .await;
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::traits::MockProgressReporter;
    use crate::monitoring::NoOpProgressReporter;

    #[derive(Debug, PartialEq, Eq)]
    struct Sum(u64);

    impl CommutativeMonoid for Sum {
        fn combine(self, other: Self) -> Self {
            Sum(self.0 + other.0)
        }
    }

    async fn fold_sums(values: Vec<u64>, workers: usize) -> Sum {
        run_fold(
            move |tx| async move {
                for v in values {
                    if tx.send(Sum(v)).await.is_err() {
                        break;
                    }
                }
            },
            Arc::new(|| Sum(0)),
            &FoldConfig::new(workers),
            Arc::new(NoOpProgressReporter::new()),
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_fold_is_path_independent() {
        let values: Vec<u64> = (1..=100).collect();
        let expected: u64 = values.iter().sum();

        // ワーカー数によらず結果は同一
        for workers in [1, 2, 4, 32, 100] {
            let result = fold_sums(values.clone(), workers).await;
            assert_eq!(result, Sum(expected), "workers = {workers}");
        }
    }

    #[tokio::test]
    async fn test_fold_zero_values_returns_identity() {
        let result = fold_sums(vec![], 8).await;

        assert_eq!(result, Sum(0));
    }

    #[tokio::test]
    async fn test_fold_single_value_many_workers() {
        // ワーカー数が値の数を上回っても単位元経由で正しく縮退する
        let result = fold_sums(vec![99], 32).await;

        assert_eq!(result, Sum(99));
    }

    #[tokio::test]
    async fn test_fold_zero_values_with_tiny_queue_capacity() {
        use tokio::time::{timeout, Duration};

        // 容量がワーカー数を下回っても単位元の環流が詰まらず完了する
        let result = timeout(
            Duration::from_secs(5),
            run_fold(
                |tx| async move {
                    drop(tx);
                },
                Arc::new(|| Sum(0)),
                &FoldConfig::new(2).with_queue_capacity(1),
                Arc::new(NoOpProgressReporter::new()),
            ),
        )
        .await
        .expect("foldが完了しない")
        .unwrap();

        assert_eq!(result, Sum(0));
    }

    #[tokio::test]
    async fn test_fold_single_value_with_tiny_queue_capacity() {
        use tokio::time::{timeout, Duration};

        let result = timeout(
            Duration::from_secs(5),
            run_fold(
                |tx| async move {
                    let _ = tx.send(Sum(5)).await;
                },
                Arc::new(|| Sum(0)),
                &FoldConfig::new(4).with_queue_capacity(1),
                Arc::new(NoOpProgressReporter::new()),
            ),
        )
        .await
        .expect("foldが完了しない")
        .unwrap();

        assert_eq!(result, Sum(5));
    }

    #[tokio::test]
    async fn test_fold_reports_started_and_completed() {
        let mut mock = MockProgressReporter::new();
        mock.expect_report_started()
            .withf(|&n| n == 4)
            .times(1)
            .return_const(());
        // 10値の畳み込みには少なくとも9回の結合が必要
        mock.expect_report_completed()
            .withf(|&n| n >= 9)
            .times(1)
            .return_const(());

        let values: Vec<u64> = (1..=10).collect();
        let result = run_fold(
            move |tx| async move {
                for v in values {
                    let _ = tx.send(Sum(v)).await;
                }
            },
            Arc::new(|| Sum(0)),
            &FoldConfig::new(4),
            Arc::new(mock),
        )
        .await
        .unwrap();

        assert_eq!(result, Sum(55));
    }

    #[tokio::test]
    async fn test_fold_worker_panic_surfaces_as_task_error() {
        struct Exploding;

        impl CommutativeMonoid for Exploding {
            fn combine(self, _other: Self) -> Self {
                panic!("combine failure");
            }
        }

        let result = run_fold(
            |tx| async move {
                let _ = tx.send(Exploding).await;
                let _ = tx.send(Exploding).await;
            },
            Arc::new(|| Exploding),
            &FoldConfig::new(1),
            Arc::new(NoOpProgressReporter::new()),
        )
        .await;

        assert!(matches!(result, Err(ReduceError::Task { .. })));
    }
}
