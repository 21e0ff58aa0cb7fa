use anyhow::{Context, Result};
use clap::Parser;
use item_metadata_store::Config;
use item_metadata_store::audit::audit_dir;
use std::path::PathBuf;

/// 保存済みメタデータの検査
#[derive(Debug, Parser)]
#[command(name = "check")]
struct Args {
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let cfg = Config::load(&args.config)
        .with_context(|| format!("{} の読み込みに失敗しました", args.config.display()))?;

    let report = audit_dir(
        &cfg.storage.metadata_dir,
        &cfg.storage.image_dir,
        &cfg.server.base_url,
    )?;

    println!("==============================");
    println!(" Item Metadata Check");
    println!(" Documents: {}", report.total);
    println!(" Items: {}  Raw: {}  Without image: {}", report.items, report.raw, report.without_image);
    println!("==============================\n");

    for (trait_type, values) in &report.stats {
        println!("▶ Trait: {}", trait_type);

        let mut sorted: Vec<_> = values.iter().collect();
        sorted.sort_by(|a, b| b.1.cmp(a.1));

        for (value, count) in sorted {
            let ratio = *count as f64 / report.items as f64 * 100.0;
            println!("  {:30} {:5} ({:.2}%)", value, count, ratio);
        }
        println!();
    }

    if report.is_clean() {
        println!("✅ 問題は見つかりませんでした");
        return Ok(());
    }

    println!("❌ {} 件の問題が見つかりました:", report.problems.len());
    for p in &report.problems {
        println!("  - {} : {}", p.file, p.message);
    }
    std::process::exit(1);
}
