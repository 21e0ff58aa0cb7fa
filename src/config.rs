use anyhow::{Context, Result, bail};
use ::config::{Environment, File, FileFormat, Map, Source};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use url::Url;

/// 環境変数による上書きのプレフィックス（例: `METADATA_STORE_SERVER__BASE_URL`）
pub const ENV_PREFIX: &str = "METADATA_STORE";

/// セクションとキーの区切り
pub const ENV_SEPARATOR: &str = "__";

impl Config {
    /// YAML を読み込み、環境変数で上書きしてから検証する
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        Self::build(File::from(path).format(FileFormat::Yaml), None)
            .with_context(|| format!("設定ファイルを読めません: {}", path.display()))
    }

    /// 文字列の YAML から読み込む（環境変数は見ない）
    pub fn from_yaml(text: &str) -> Result<Self> {
        Self::build(File::from_str(text, FileFormat::Yaml), Some(Map::new()))
    }

    /// `env` が `None` ならプロセスの環境変数を使う
    fn build<S>(file: S, env: Option<Map<String, String>>) -> Result<Self>
    where
        S: Source + Send + Sync + 'static,
    {
        let mut config: Config = ::config::Config::builder()
            .add_source(file)
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator(ENV_SEPARATOR)
                    .ignore_empty(true)
                    .source(env),
            )
            .build()
            .context("設定の読み込みに失敗しました")?
            .try_deserialize()
            .context("設定ファイルの形式が不正です")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&mut self) -> Result<()> {
        self.server
            .bind_address
            .parse::<SocketAddr>()
            .with_context(|| format!("bind_address が不正です: {}", self.server.bind_address))?;

        let url = Url::parse(&self.server.base_url)
            .with_context(|| format!("base_url が不正です: {}", self.server.base_url))?;
        if !matches!(url.scheme(), "http" | "https") {
            bail!("base_url は http または https である必要があります: {}", self.server.base_url);
        }
        if url.host_str().is_none_or(str::is_empty) {
            bail!("base_url にホストがありません: {}", self.server.base_url);
        }
        if url.query().is_some() || url.fragment().is_some() {
            bail!("base_url にクエリやフラグメントは指定できません: {}", self.server.base_url);
        }
        self.server.base_url = url.as_str().trim_end_matches('/').to_string();

        if self.storage.metadata_dir.as_os_str().is_empty() {
            bail!("storage.metadata_dir が空です");
        }
        if self.storage.image_dir.as_os_str().is_empty() {
            bail!("storage.image_dir が空です");
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub bind_address: String,
    /// 返却する URL の先頭部分（例: `http://localhost:5000`）
    pub base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub metadata_dir: PathBuf,
    pub image_dir: PathBuf,
}
