//! HTTP API のレスポンスボディ

use crate::metadata::ItemMetadata;
use serde::Serialize;

/// 書き込みエンドポイント共通のレスポンス。`json` はアイテム書き込み時のみ
#[derive(Debug, Serialize)]
pub struct WriteResponse {
    pub ok: bool,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json: Option<ItemMetadata>,
}

impl WriteResponse {
    pub fn item(url: String, json: ItemMetadata) -> Self {
        Self {
            ok: true,
            url,
            json: Some(json),
        }
    }

    pub fn raw(url: String) -> Self {
        Self {
            ok: true,
            url,
            json: None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub ok: bool,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub ok: bool,
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            error: error.into(),
        }
    }
}
