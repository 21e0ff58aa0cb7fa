//! メタデータストアのエラー型

use crate::response::ErrorResponse;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use std::path::PathBuf;
use tracing::{error, warn};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// 入力の欠落・不正（クライアント側の誤り）
    #[error("{0}")]
    Validation(String),

    /// ドキュメント読み書き時のファイルシステムエラー
    #[error("storage error at {}: {source}", .path.display())]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize document: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("blocking task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("not found")]
    NotFound,
}

impl StoreError {
    pub fn validation(message: impl Into<String>) -> Self {
        StoreError::Validation(message.into())
    }

    pub fn storage(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Storage {
            path: path.into(),
            source,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            StoreError::Validation(_) => StatusCode::BAD_REQUEST,
            StoreError::NotFound => StatusCode::NOT_FOUND,
            StoreError::Storage { .. } | StoreError::Serialize(_) | StoreError::Task(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for StoreError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            StoreError::Validation(msg) => {
                warn!(error = %msg, "Rejected request");
                msg.clone()
            }
            StoreError::NotFound => self.to_string(),
            other => {
                // 詳細はログにのみ残し、クライアントには汎用メッセージを返す
                error!(error = %other, "Request failed");
                "server error".to_string()
            }
        };
        (status, Json(ErrorResponse::new(message))).into_response()
    }
}
