// ワーカープール設定の具象実装
// 範囲外のワーカー数はエラーにせずクランプで処理する

use mockall::automock;

/// foldエンジンのデフォルトワーカー数
pub const DEFAULT_FOLD_WORKERS: usize = 32;

/// foldエンジンのワーカー数上限
pub const MAX_FOLD_WORKERS: usize = 512;

/// mapエンジンのデフォルトワーカー数
pub const DEFAULT_MAP_WORKERS: usize = 128;

/// mapエンジンのワーカー数上限
pub const MAX_MAP_WORKERS: usize = 1024;

/// 共有キューの既定容量
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

/// ワーカープール設定を抽象化するトレイト
#[automock]
pub trait PoolConfig: Send + Sync {
    /// ワーカータスク数を取得
    fn worker_count(&self) -> usize;

    /// 共有キューの容量を取得
    fn queue_capacity(&self) -> usize;
}

/// foldエンジン設定
#[derive(Debug, Clone)]
pub struct FoldConfig {
    workers: usize,
    queue_capacity: usize,
}

impl FoldConfig {
    /// ワーカー数を[1, 512]にクランプして設定を作成
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.clamp(1, MAX_FOLD_WORKERS),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.clamp(1, MAX_FOLD_WORKERS);
        self
    }

    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity.max(1);
        self
    }
}

impl Default for FoldConfig {
    fn default() -> Self {
        Self::new(DEFAULT_FOLD_WORKERS)
    }
}

impl PoolConfig for FoldConfig {
    fn worker_count(&self) -> usize {
        self.workers
    }

    fn queue_capacity(&self) -> usize {
        self.queue_capacity
    }
}

/// mapエンジン設定
#[derive(Debug, Clone)]
pub struct MapConfig {
    workers: usize,
    queue_capacity: usize,
}

impl MapConfig {
    /// ワーカー数を[1, 1024]にクランプして設定を作成
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.clamp(1, MAX_MAP_WORKERS),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.clamp(1, MAX_MAP_WORKERS);
        self
    }

    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity.max(1);
        self
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self::new(DEFAULT_MAP_WORKERS)
    }
}

impl PoolConfig for MapConfig {
    fn worker_count(&self) -> usize {
        self.workers
    }

    fn queue_capacity(&self) -> usize {
        self.queue_capacity
    }
}
