//! メタデータディレクトリのオフライン検査。
//!
//! `<metadata_dir>/*.json` を走査し、アイテム形式のドキュメントについて
//! trait/value の出現数を集計し、このサーバーが配信する画像が存在して
//! デコードできるかを確認する。raw ドキュメントは件数のみ数える。

use crate::metadata::ItemMetadata;
use anyhow::{Context, Result};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// 画像を配信する URL プレフィックス
pub const IMAGES_ROUTE: &str = "/images";

#[derive(Debug, Default)]
pub struct AuditReport {
    pub total: usize,
    pub items: usize,
    pub raw: usize,
    pub without_image: usize,
    /// trait_type -> value -> 件数
    pub stats: BTreeMap<String, BTreeMap<String, usize>>,
    pub problems: Vec<Problem>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Problem {
    pub file: String,
    pub message: String,
}

impl AuditReport {
    pub fn is_clean(&self) -> bool {
        self.problems.is_empty()
    }

    fn problem(&mut self, file: &str, message: impl Into<String>) {
        self.problems.push(Problem {
            file: file.to_string(),
            message: message.into(),
        });
    }
}

/// メタデータディレクトリ直下の JSON をすべて検査する
pub fn audit_dir(metadata_dir: &Path, image_dir: &Path, base_url: &str) -> Result<AuditReport> {
    let mut report = AuditReport::default();

    for entry in WalkDir::new(metadata_dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry
            .with_context(|| format!("metadata ディレクトリが読めません: {:?}", metadata_dir))?;
        let path = entry.path();
        if !entry.file_type().is_file()
            || path.extension().and_then(|s| s.to_str()) != Some("json")
        {
            continue;
        }

        let file = path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("<unknown>")
            .to_string();
        report.total += 1;

        let id_ok = path
            .file_stem()
            .and_then(|s| s.to_str())
            .is_some_and(|stem| stem.parse::<u64>().is_ok());
        if !id_ok {
            report.problem(&file, "file name is not a token id");
        }

        let text = fs::read_to_string(path).with_context(|| format!("JSON 読み込み失敗: {:?}", path))?;
        let value: Value = match serde_json::from_str(&text) {
            Ok(v) => v,
            Err(e) => {
                report.problem(&file, format!("invalid JSON: {e}"));
                continue;
            }
        };

        let Ok(meta) = serde_json::from_value::<ItemMetadata>(value) else {
            report.raw += 1;
            continue;
        };
        report.items += 1;

        for attr in &meta.attributes {
            *report
                .stats
                .entry(attr.trait_type.clone())
                .or_default()
                .entry(attr.value.to_string())
                .or_insert(0) += 1;
        }

        if meta.image.is_empty() {
            report.without_image += 1;
        } else if let Some(image_path) = local_image_path(&meta.image, image_dir, base_url) {
            if let Err(message) = check_image(&image_path) {
                report.problem(&file, message);
            }
        }
    }

    Ok(report)
}

/// このサーバーの `/images/` を指していればローカルのパスに変換する
pub fn local_image_path(image: &str, image_dir: &Path, base_url: &str) -> Option<PathBuf> {
    let base = base_url.trim_end_matches('/');
    let route = image
        .strip_prefix(base)
        .filter(|rest| rest.starts_with('/'))
        .unwrap_or(image);
    let name = route.strip_prefix(IMAGES_ROUTE)?.strip_prefix('/')?;
    crate::static_files::sanitize_file_name(name).map(|n| image_dir.join(n))
}

fn check_image(path: &Path) -> std::result::Result<(), String> {
    if !path.is_file() {
        return Err(format!("image not found: {}", path.display()));
    }
    image::open(path)
        .map(|_| ())
        .map_err(|e| format!("image cannot be decoded: {} ({e})", path.display()))
}
