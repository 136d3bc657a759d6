// 並列集約処理のカスタムエラー型定義

use thiserror::Error;

/// 並列集約固有のエラー型
#[derive(Error, Debug)]
pub enum ReduceError {
    #[error("チャンネルエラー: {message}")]
    Channel { message: String },

    #[error("タスクエラー: {source}")]
    Task {
        #[source]
        source: tokio::task::JoinError,
    },

    #[error("内部エラー: {source}")]
    Internal {
        #[source]
        source: anyhow::Error,
    },
}

impl ReduceError {
    /// チャンネルエラーの作成
    pub fn channel(message: impl Into<String>) -> Self {
        Self::Channel {
            message: message.into(),
        }
    }

    /// タスクエラーの作成
    pub fn task(source: tokio::task::JoinError) -> Self {
        Self::Task { source }
    }

    /// 内部エラーの作成
    pub fn internal(source: anyhow::Error) -> Self {
        Self::Internal { source }
    }
}

impl From<tokio::task::JoinError> for ReduceError {
    fn from(error: tokio::task::JoinError) -> Self {
        ReduceError::Task { source: error }
    }
}

impl From<anyhow::Error> for ReduceError {
    fn from(error: anyhow::Error) -> Self {
        ReduceError::Internal { source: error }
    }
}

/// 並列集約の結果型
pub type ReduceResult<T> = std::result::Result<T, ReduceError>;
