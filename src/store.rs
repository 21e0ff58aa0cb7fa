//! トークン id をキーにしたフラットディレクトリのドキュメントストア。
//!
//! 各ドキュメントは `<metadata_dir>/<id>.json` に置かれ、
//! `<base_url>/metadata/<id>.json` として公開される。書き込みはファイル全体を置き換え、
//! 同じ id では最後に完了した書き込みが残る。

use crate::error::StoreError;
use crate::metadata::{ItemMetadata, ItemRequest};
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::info;

/// 保存済みドキュメントを配信する URL プレフィックス
pub const METADATA_ROUTE: &str = "/metadata";

/// 書き込み結果
#[derive(Debug, Clone)]
pub struct Written<T> {
    pub token_id: u64,
    pub path: PathBuf,
    pub url: String,
    pub document: T,
}

#[derive(Debug, Clone)]
pub struct MetadataStore {
    metadata_dir: PathBuf,
    base_url: String,
}

impl MetadataStore {
    pub fn new(metadata_dir: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            metadata_dir: metadata_dir.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn metadata_dir(&self) -> &Path {
        &self.metadata_dir
    }

    pub fn document_path(&self, token_id: u64) -> PathBuf {
        self.metadata_dir.join(format!("{token_id}.json"))
    }

    pub fn url_for(&self, token_id: u64) -> String {
        format!("{}{}/{}.json", self.base_url, METADATA_ROUTE, token_id)
    }

    /// 保存ディレクトリを作る（既にあれば何もしない）
    pub fn ensure_dir(&self) -> Result<(), StoreError> {
        fs::create_dir_all(&self.metadata_dir)
            .map_err(|e| StoreError::storage(&self.metadata_dir, e))
    }

    /// アイテム入力を正規化して保存する
    pub fn write_item(&self, request: &ItemRequest) -> Result<Written<ItemMetadata>, StoreError> {
        let document = request.normalize();
        let path = self.persist(request.token_id, &document)?;
        info!(token_id = request.token_id, path = %path.display(), mode = "item", "Metadata written");
        Ok(self.written(request.token_id, path, document))
    }

    /// 受け取った JSON オブジェクトをそのまま保存する
    pub fn write_raw(&self, token_id: u64, body: &Value) -> Result<Written<Value>, StoreError> {
        if !body.is_object() {
            return Err(StoreError::validation("metadata body must be a JSON object"));
        }
        let path = self.persist(token_id, body)?;
        info!(token_id, path = %path.display(), mode = "raw", "Metadata written");
        Ok(self.written(token_id, path, body.clone()))
    }

    /// 保存済みドキュメントのバイト列。未作成なら `None`
    pub fn read(&self, token_id: u64) -> Result<Option<Vec<u8>>, StoreError> {
        let path = self.document_path(token_id);
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::storage(path, e)),
        }
    }

    fn persist<T: Serialize>(&self, token_id: u64, document: &T) -> Result<PathBuf, StoreError> {
        let json = serde_json::to_string_pretty(document)?;
        self.ensure_dir()?;
        let path = self.document_path(token_id);
        fs::write(&path, json).map_err(|e| StoreError::storage(&path, e))?;
        Ok(path)
    }

    fn written<T>(&self, token_id: u64, path: PathBuf, document: T) -> Written<T> {
        Written {
            token_id,
            path,
            url: self.url_for(token_id),
            document,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> MetadataStore {
        MetadataStore::new(dir.path().join("nested").join("metadata"), "http://localhost:5000/")
    }

    #[test]
    fn url_uses_trimmed_base() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        assert_eq!(store.url_for(3), "http://localhost:5000/metadata/3.json");
    }

    #[test]
    fn first_write_creates_missing_directory() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        assert!(!store.metadata_dir().exists());

        let req = ItemRequest::from_json(&json!({ "tokenId": 1 })).unwrap();
        let written = store.write_item(&req).unwrap();

        assert!(written.path.is_file());
        assert_eq!(written.path, store.document_path(1));
    }

    #[test]
    fn stored_bytes_are_pretty_json_of_document() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let req = ItemRequest::from_json(&json!({
            "tokenId": 1,
            "name": "Iron Sword",
            "rarity": "rare",
            "attack": 25,
        }))
        .unwrap();

        let written = store.write_item(&req).unwrap();
        let bytes = store.read(1).unwrap().unwrap();

        assert_eq!(bytes, serde_json::to_string_pretty(&written.document).unwrap().into_bytes());
        assert!(String::from_utf8(bytes).unwrap().contains("\n  \"name\": \"Iron Sword\""));
    }

    #[test]
    fn later_write_replaces_earlier() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        store.write_raw(4, &json!({ "v": 1 })).unwrap();
        store.write_raw(4, &json!({ "v": 2 })).unwrap();

        let stored: Value = serde_json::from_slice(&store.read(4).unwrap().unwrap()).unwrap();
        assert_eq!(stored, json!({ "v": 2 }));
    }

    #[test]
    fn rewriting_same_input_is_byte_identical() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let body = json!({ "b": 1, "a": [1, 2] });

        store.write_raw(8, &body).unwrap();
        let first = store.read(8).unwrap().unwrap();
        store.write_raw(8, &body).unwrap();
        let second = store.read(8).unwrap().unwrap();

        assert_eq!(first, second);

        // リクエストのキー順が保たれる
        let text = String::from_utf8(first).unwrap();
        assert!(text.find("\"b\"").unwrap() < text.find("\"a\"").unwrap());
    }

    #[test]
    fn raw_write_rejects_non_objects_without_touching_disk() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let err = store.write_raw(2, &json!([1, 2, 3])).unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
        assert!(!store.document_path(2).exists());
    }

    #[test]
    fn read_of_unknown_id_is_none() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        assert!(store.read(999).unwrap().is_none());
    }
}
