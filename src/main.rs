use item_metadata_store::{AppState, Config, create_router};

use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// アイテムメタデータを保存・配信する HTTP サーバー
#[derive(Debug, Parser)]
#[command(name = "item-metadata-store", version)]
struct Args {
    /// 設定ファイル (YAML)
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let cfg = Config::load(&args.config)
        .with_context(|| format!("{} の読み込みに失敗しました", args.config.display()))?;

    fs::create_dir_all(&cfg.storage.metadata_dir).with_context(|| {
        format!(
            "メタデータ保存ディレクトリの作成に失敗しました: {}",
            cfg.storage.metadata_dir.display()
        )
    })?;

    info!(
        base_url = %cfg.server.base_url,
        metadata_dir = %cfg.storage.metadata_dir.display(),
        image_dir = %cfg.storage.image_dir.display(),
        "Configuration loaded"
    );

    let state = Arc::new(AppState::from_config(&cfg));
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&cfg.server.bind_address)
        .await
        .with_context(|| format!("{} で待ち受けできません", cfg.server.bind_address))?;

    info!(address = %cfg.server.bind_address, "Listening");
    info!("GET metadata example: {}/metadata/1.json", cfg.server.base_url);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("サーバーが異常終了しました")?;

    info!("Metadata store shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT, shutting down..."),
        _ = terminate => info!("Received SIGTERM, shutting down..."),
    }
}
