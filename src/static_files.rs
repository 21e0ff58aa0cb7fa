//! メタデータ・画像ディレクトリの読み取り専用配信。
//!
//! ディレクトリ直下の単純なファイル名のみ配信する。一覧表示やサブディレクトリの探索はしない。

use crate::error::StoreError;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use std::borrow::Cow;
use std::io::ErrorKind;
use std::path::Path;
use tracing::warn;

/// メタデータ用の Cache-Control（いつでも上書きされうる）
pub const METADATA_CACHE_CONTROL: &str = "no-cache";

/// 画像用の Cache-Control
pub const IMAGE_CACHE_CONTROL: &str = "public, max-age=3600";

/// ディレクトリ直下のファイルを返す。見つからなければ `NotFound`
pub async fn serve_file(
    dir: &Path,
    file_name: &str,
    cache_control: &'static str,
) -> Result<Response, StoreError> {
    let Some(name) = sanitize_file_name(file_name) else {
        warn!(file = %file_name, "Rejected static file name");
        return Err(StoreError::NotFound);
    };

    let path = dir.join(name);
    match tokio::fs::read(&path).await {
        Ok(contents) => Ok((
            [
                (header::CONTENT_TYPE, guess_content_type(&path).into_owned()),
                (header::CACHE_CONTROL, cache_control.to_string()),
            ],
            contents,
        )
            .into_response()),
        // 同名のディレクトリは配信対象外
        Err(e) if matches!(e.kind(), ErrorKind::NotFound | ErrorKind::IsADirectory) => {
            Err(StoreError::NotFound)
        }
        Err(e) => Err(StoreError::storage(path, e)),
    }
}

/// 単一のファイル名だけを許可する（区切り文字・`..`・隠しファイルは拒否）
pub fn sanitize_file_name(name: &str) -> Option<&str> {
    if name.is_empty()
        || name.starts_with('.')
        || name.contains(['/', '\\', '\0'])
        || name.contains(':')
    {
        return None;
    }
    Some(name)
}

/// 拡張子から Content-Type を推定する（テキスト系は charset 付き）
pub fn guess_content_type(path: &Path) -> Cow<'static, str> {
    mime_guess::from_path(path)
        .first()
        .map_or(Cow::Borrowed("application/octet-stream"), |mime| {
            let essence = mime.essence_str();
            match essence {
                "application/json" => Cow::Borrowed("application/json"),
                "image/png" => Cow::Borrowed("image/png"),
                "image/jpeg" => Cow::Borrowed("image/jpeg"),
                "image/gif" => Cow::Borrowed("image/gif"),
                "image/webp" => Cow::Borrowed("image/webp"),
                "image/svg+xml" => Cow::Borrowed("image/svg+xml"),
                _ if essence.starts_with("text/") => Cow::Owned(format!("{essence}; charset=utf-8")),
                _ => Cow::Owned(essence.to_string()),
            }
        })
}
