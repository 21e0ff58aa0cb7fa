//! ハンドラ間で共有する状態

use crate::config::Config;
use crate::store::MetadataStore;
use std::path::PathBuf;

/// 共有状態
#[derive(Debug, Clone)]
pub struct AppState {
    pub store: MetadataStore,
    pub image_dir: PathBuf,
}

impl AppState {
    pub fn new(store: MetadataStore, image_dir: impl Into<PathBuf>) -> Self {
        Self {
            store,
            image_dir: image_dir.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            MetadataStore::new(&config.storage.metadata_dir, &config.server.base_url),
            &config.storage.image_dir,
        )
    }
}
