//! ロギング初期化ユーティリティ
//!
//! `RUST_LOG` が設定されていればそれを優先し、未設定なら `AUTOHEAL_LOG_LEVEL`
//! （既定値 `info`）をフィルタとして使用する。

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// ログレベル指定用の環境変数
pub const LOG_LEVEL_ENV: &str = "AUTOHEAL_LOG_LEVEL";

const DEFAULT_LOG_LEVEL: &str = "info";

/// `RUST_LOG` が未設定のときに使用するフィルタ文字列
pub fn fallback_filter() -> String {
    crate::config::get_env_non_empty(LOG_LEVEL_ENV).unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string())
}

/// Install the global tracing subscriber.
pub fn init() -> Result<(), tracing_subscriber::util::TryInitError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(fallback_filter()))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .try_init()
}
