//! autoheal
//!
//! 単一のヘルスエンドポイントを監視し、障害時にWebhookへ通知して
//! 再デプロイをトリガーし、一定時間後に復旧を確認する。

#![warn(missing_docs)]

/// CLIインターフェース
pub mod cli;

/// 設定管理（環境変数）
pub mod config;

/// エラー型定義
pub mod error;

/// ヘルスチェック
pub mod health;

/// ロギング初期化ユーティリティ
pub mod logging;

/// 監視ループ
pub mod monitor;

/// 障害通知
pub mod notify;

/// 自動復旧（再デプロイ）制御
pub mod remediation;

/// Shutdown controller (signal handling)
pub mod shutdown;

pub use config::MonitorConfig;
pub use error::{AutohealError, ConfigError, DeliveryError};
pub use monitor::{Monitor, MonitorTiming};
pub use shutdown::ShutdownController;
