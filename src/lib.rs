// 可換モノイド列の並列fold（畳み込み）と順序なし並列mapを提供する
// 純粋なインプロセス計算ライブラリ
//
// - foldエンジン: 共有結合キューからペアを奪い合うワーカープールが
//   部分結果を環流させ、停止シグナル後にちょうど1値まで畳み込む
// - mapエンジン: ディープコピー可能な値に対するステートレスな並列変換
//
// キュー・停止シグナル・ワーカープールは全て呼び出し単位のスコープを
// 持ち、プロセス全体で共有される状態は存在しない。

pub mod core;
pub mod fold;
pub mod mapping;
pub mod monitoring;

// 公開API - 主要な契約と入口を明示的にエクスポート
pub use crate::core::{
    CommutativeMonoid, DeepCopy, FoldConfig, Identity, MapConfig, PoolConfig, ProgressReporter,
    ReduceError, ReduceResult, DEFAULT_FOLD_WORKERS, DEFAULT_MAP_WORKERS, MAX_FOLD_WORKERS,
    MAX_MAP_WORKERS,
};
pub use fold::{
    fold_channel, fold_channel_n, fold_slice, fold_slice_n, fold_source, fold_source_n,
    fold_source_with,
};
pub use mapping::{for_each, for_each_n, for_each_with};
pub use monitoring::{ConsoleProgressReporter, NoOpProgressReporter};
