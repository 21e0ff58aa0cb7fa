//! # Item Metadata Store
//!
//! ゲームアイテムの説明を ERC-1155 形式の JSON メタデータとして
//! フラットなディレクトリに保存し、HTTP で配信する。書き込み時に返す URL は
//! クライアントがトークンの `uri` としてオンチェーンに登録するもの。
//!
//! ## エンドポイント
//! - `GET /` - バナー
//! - `GET /api/health` - ヘルスチェック
//! - `POST /metadata` - アイテムを検証・正規化して保存
//! - `POST /api/metadata/{id}` - JSON オブジェクトをそのまま保存
//! - `GET /metadata/{file}` - 保存済みドキュメント
//! - `GET /images/{file}` - アイテム画像

pub mod audit;
pub mod config;
pub mod error;
mod handlers;
pub mod metadata;
mod response;
mod router;
mod state;
pub mod static_files;
pub mod store;

pub use config::Config;
pub use error::StoreError;
pub use router::create as create_router;
pub use state::AppState;
pub use store::MetadataStore;
