//! HTTP リクエストハンドラ

use crate::error::StoreError;
use crate::metadata::{ItemRequest, parse_token_id_str};
use crate::response::{HealthResponse, WriteResponse};
use crate::state::AppState;
use crate::static_files::{self, IMAGE_CACHE_CONTROL, METADATA_CACHE_CONTROL};
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::response::Response;
use serde_json::Value;
use std::sync::Arc;

pub const BANNER: &str = "Metadata store OK. Use /metadata and /images";

pub async fn banner() -> &'static str {
    BANNER
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { ok: true })
}

/// アイテム入力を検証・正規化し、`tokenId` の名前で保存する
pub async fn write_item(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<WriteResponse>, StoreError> {
    let Json(body) = body.map_err(reject)?;
    let request = ItemRequest::from_json(&body)?;

    let store = state.store.clone();
    let written = tokio::task::spawn_blocking(move || store.write_item(&request)).await??;

    Ok(Json(WriteResponse::item(written.url, written.document)))
}

/// 任意の JSON オブジェクトをパスの id でそのまま保存する
pub async fn write_raw(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<WriteResponse>, StoreError> {
    let token_id = parse_token_id_str(&id)?;
    let Json(body) = body.map_err(reject)?;

    let store = state.store.clone();
    let written = tokio::task::spawn_blocking(move || store.write_raw(token_id, &body)).await??;

    Ok(Json(WriteResponse::raw(written.url)))
}

pub async fn metadata_file(
    State(state): State<Arc<AppState>>,
    Path(file): Path<String>,
) -> Result<Response, StoreError> {
    static_files::serve_file(state.store.metadata_dir(), &file, METADATA_CACHE_CONTROL).await
}

pub async fn image_file(
    State(state): State<Arc<AppState>>,
    Path(file): Path<String>,
) -> Result<Response, StoreError> {
    static_files::serve_file(&state.image_dir, &file, IMAGE_CACHE_CONTROL).await
}

fn reject(rejection: JsonRejection) -> StoreError {
    StoreError::validation(rejection.body_text())
}
