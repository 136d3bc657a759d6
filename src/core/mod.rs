// コアレイヤー - 基盤となるトレイト、設定、エラー定義
// fold/mappingエンジンから参照される基本的な抽象化を提供

pub mod config;
pub mod error;
pub mod traits;

// 公開API - 明示的にエクスポートして曖昧性を回避
pub use config::{
    FoldConfig, MapConfig, PoolConfig, DEFAULT_FOLD_WORKERS, DEFAULT_MAP_WORKERS,
    DEFAULT_QUEUE_CAPACITY, MAX_FOLD_WORKERS, MAX_MAP_WORKERS,
};
pub use error::{ReduceError, ReduceResult};
pub use traits::{CommutativeMonoid, DeepCopy, Identity, ProgressReporter};
