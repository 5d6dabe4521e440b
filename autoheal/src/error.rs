//! エラー型定義
//!
//! 統一エラー型（thiserror使用）
//!
//! ヘルスチェックの失敗はエラーではなく [`crate::health::CheckOutcome`] として
//! 扱う。ここに定義するのは起動時の設定エラーと、外部への送信失敗のみ。

use thiserror::Error;

/// Configuration error
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// One or more required environment variables are unset or empty
    #[error("Missing required environment variables: {}", .0.join(", "))]
    MissingVariables(Vec<String>),

    /// A tunable was set but could not be parsed as a positive integer
    #[error("Invalid value for {name}: {value:?} (expected a positive integer)")]
    InvalidValue {
        /// 環境変数名
        name: String,
        /// 設定された値
        value: String,
    },
}

/// 外部エンドポイント（デプロイフック・Webhook）への送信エラー
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// Transport error (connection, timeout, TLS)
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// The peer answered with a non-2xx status
    #[error("Unexpected status {status}: {body}")]
    Status {
        /// HTTPステータスコード
        status: u16,
        /// レスポンスボディ（読み取れた範囲）
        body: String,
    },
}

/// autoheal error type
#[derive(Debug, Error)]
pub enum AutohealError {
    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// HTTP client could not be constructed
    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
}

/// autoheal共通のResult型
pub type Result<T, E = AutohealError> = std::result::Result<T, E>;
