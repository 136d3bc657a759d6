// folderワーカー - 共有結合キューから値のペアを取り出して結合する
// 各ワーカーは私有リレーバッファとそれを転送するリレータスクを所有する

use crate::core::{CommutativeMonoid, Identity, ReduceError, ReduceResult};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};
use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;

/// リレーバッファの容量
pub(crate) const RELAY_CAPACITY: usize = 1024;

/// 1つ目の受信と停止シグナルの競争結果
enum Claim<T> {
    Received(Option<T>),
    Stopped,
}

/// 非ブロッキングのdrain-to-oneパス
///
/// 2つ目の値が待たずに取れる間は結合を続け、取れなくなったら
/// 手持ちの値を`out`へ戻して終了する。停止後はもうワーカーが
/// 来る保証がないため、受信で決して待たない。
pub(crate) async fn drain_to_one<T>(
    queue_rx: &Mutex<mpsc::Receiver<T>>,
    out: &mpsc::Sender<T>,
    combine_count: &AtomicUsize,
) -> ReduceResult<()>
where
    T: CommutativeMonoid,
{
    let mut rx = queue_rx.lock().await;
    while let Ok(a) = rx.try_recv() {
        match rx.try_recv() {
            Ok(b) => {
                combine_count.fetch_add(1, Ordering::Relaxed);
                // 2つ取り出して1つ戻すため、容量不足でここが詰まることはない
                out.send(a.combine(b))
                    .await
                    .map_err(|_| ReduceError::channel("drain中に転送先が閉じられました"))?;
            }
            Err(_) => {
                out.send(a)
                    .await
                    .map_err(|_| ReduceError::channel("drain中に転送先が閉じられました"))?;
                return Ok(());
            }
        }
    }
    Ok(())
}

/// 単一folderワーカーを起動
///
/// 共有キューからの受信を停止シグナルと競わせ、ペアが揃えば結合値を、
/// 停止が先なら手持ちの値をリレーバッファへ送る。一度も値を受信しない
/// まま停止した場合は単位元を1つだけ送出する。結合値を共有キューへ
/// 直接戻すと自分の出力を即座に再取得して他のワーカーを飢えさせるため、
/// 必ずリレー経由で環流させる。
pub(crate) fn spawn_folder<T, I>(
    queue_tx: mpsc::Sender<T>,
    queue_rx: Arc<Mutex<mpsc::Receiver<T>>>,
    mut stop: watch::Receiver<bool>,
    identity: Arc<I>,
    combine_count: Arc<AtomicUsize>,
) -> JoinHandle<ReduceResult<()>>
where
    T: CommutativeMonoid,
    I: Identity<T>,
{
    tokio::spawn(async move {
        // リレータスク: 私有バッファの中身を共有キューへ転送し続ける
        let (relay_tx, mut relay_rx) = mpsc::channel::<T>(RELAY_CAPACITY);
        let forward_tx = queue_tx.clone();
        let relay = tokio::spawn(async move {
            while let Some(value) = relay_rx.recv().await {
                if forward_tx.send(value).await.is_err() {
                    break;
                }
            }
        });

        let mut received_any = false;
        'main: loop {
            // 1つ目の受信を停止シグナルと競わせる
            let first = {
                let mut rx = queue_rx.lock().await;
                tokio::select! {
                    value = rx.recv() => Claim::Received(value),
                    _ = stop.wait_for(|stopped| *stopped) => Claim::Stopped,
                }
            };
            let a = match first {
                Claim::Stopped => {
                    if !received_any {
                        // ワーカー数が値の数を上回っても正しさを保つための単位元送出
                        relay_tx
                            .send(identity.identity())
                            .await
                            .map_err(|_| ReduceError::channel("リレーバッファが閉じられました"))?;
                        drop(relay_tx);
                        relay.await?;
                        return Ok(());
                    }
                    break 'main;
                }
                Claim::Received(None) => break 'main,
                Claim::Received(Some(a)) => a,
            };
            received_any = true;

            // 2つ目の受信も停止と競わせる（停止が先なら手持ちを戻して抜ける）
            let second = {
                let mut rx = queue_rx.lock().await;
                tokio::select! {
                    value = rx.recv() => value,
                    _ = stop.wait_for(|stopped| *stopped) => None,
                }
            };
            match second {
                Some(b) => {
                    combine_count.fetch_add(1, Ordering::Relaxed);
                    relay_tx
                        .send(a.combine(b))
                        .await
                        .map_err(|_| ReduceError::channel("リレーバッファが閉じられました"))?;
                }
                None => {
                    relay_tx
                        .send(a)
                        .await
                        .map_err(|_| ReduceError::channel("リレーバッファが閉じられました"))?;
                    break 'main;
                }
            }
        }

        // 停止後の後始末: まずリレー経由で非ブロッキングに畳み込む
        drain_to_one(&queue_rx, &relay_tx, &combine_count).await?;

        // リレーを閉じてバックログの転送完了を待つ
        drop(relay_tx);
        relay.await?;

        // リレー済みの値を対象にもう1パス、今度は共有キューへ直接戻す
        drain_to_one(&queue_rx, &queue_tx, &combine_count).await?;
        Ok(())
    })
}
