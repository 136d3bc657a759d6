// 並列集約システムのトレイト定義
// 全ての抽象化インターフェースを定義

use async_trait::async_trait;
use mockall::automock;

/// 可換モノイドの契約
///
/// `combine`は値空間全体で可換かつ結合的であること。
/// 両オペランドを消費して新しい値を返すため、他のワーカーから
/// 観測可能な変更は起こり得ない。
pub trait CommutativeMonoid: Send + 'static {
    /// 二項演算
    fn combine(self, other: Self) -> Self;
}

/// 単位元ファクトリ
///
/// `combine(x, e) == x` を満たす単位元 `e` を生成する。
/// アイドルワーカーごとに高々1回、遅延して呼び出される。
pub trait Identity<T>: Send + Sync + 'static {
    fn identity(&self) -> T;
}

// クロージャをそのまま単位元ファクトリとして渡せるようにする
impl<T, F> Identity<T> for F
where
    F: Fn() -> T + Send + Sync + 'static,
{
    fn identity(&self) -> T {
        self()
    }
}

/// ディープコピー契約 - mapエンジンへの入力に要求される
///
/// 変換ワーカーは受信した値のコピーだけを変換に渡す。
pub trait DeepCopy: Send + 'static {
    fn deep_copy(&self) -> Self;
}

/// 進捗報告の抽象化トレイト
///
/// 観測専用であり、集約結果には一切影響しない。
#[automock]
#[async_trait]
pub trait ProgressReporter: Send + Sync {
    /// プール開始時の報告
    async fn report_started(&self, worker_count: usize);

    /// 処理完了時の報告（combine/変換の実行回数）
    async fn report_completed(&self, operation_count: usize);
}
