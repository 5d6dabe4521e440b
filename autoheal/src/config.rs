//! Configuration management via environment variables
//!
//! The monitor is configured entirely from the environment. The three URLs are
//! required; everything else has a default.

use std::time::Duration;

use crate::error::ConfigError;

/// Probed health endpoint
pub const HEALTH_CHECK_URL: &str = "HEALTH_CHECK_URL";
/// Incoming webhook used for alerts
pub const SLACK_WEBHOOK_URL: &str = "SLACK_WEBHOOK_URL";
/// Deploy hook hit on remediation
pub const DEPLOYMENT_URL: &str = "DEPLOYMENT_URL";
/// Environment label shown in alerts
pub const ENV: &str = "ENV";

/// 定期チェック間隔（秒）
pub const CHECK_INTERVAL_SECS: &str = "AUTOHEAL_CHECK_INTERVAL_SECS";
/// 再デプロイ後の再チェックまでの待機（秒）
pub const RECHECK_DELAY_SECS: &str = "AUTOHEAL_RECHECK_DELAY_SECS";
/// ヘルスチェックのタイムアウト（秒）
pub const HEALTH_TIMEOUT_SECS: &str = "AUTOHEAL_HEALTH_TIMEOUT_SECS";
/// デプロイフックのタイムアウト（秒）
pub const DEPLOY_TIMEOUT_SECS: &str = "AUTOHEAL_DEPLOY_TIMEOUT_SECS";
/// Webhook送信のタイムアウト（秒）
pub const WEBHOOK_TIMEOUT_SECS: &str = "AUTOHEAL_WEBHOOK_TIMEOUT_SECS";

const DEFAULT_ENVIRONMENT: &str = "dev";
const DEFAULT_CHECK_INTERVAL_SECS: u64 = 30;
const DEFAULT_RECHECK_DELAY_SECS: u64 = 120;
const DEFAULT_HEALTH_TIMEOUT_SECS: u64 = 10;
const DEFAULT_DEPLOY_TIMEOUT_SECS: u64 = 30;
const DEFAULT_WEBHOOK_TIMEOUT_SECS: u64 = 10;

/// 秒数指定の上限（1日）
pub const MAX_TUNABLE_SECS: u64 = 86_400;

/// Get an environment variable, treating an empty value as unset
pub fn get_env_non_empty(name: &str) -> Option<String> {
    non_empty(std::env::var(name).ok())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// モニター設定
///
/// 起動時に一度だけ読み込まれ、以降は変更されない。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorConfig {
    /// ヘルスチェック対象URL
    pub health_check_url: String,
    /// 通知先Webhook URL
    pub webhook_url: String,
    /// 再デプロイをトリガーするURL
    pub deployment_url: String,
    /// 環境ラベル（dev / staging / prod など）
    pub environment: String,
    /// 定期チェック間隔
    pub check_interval: Duration,
    /// 再デプロイ後の再チェックまでの待機時間
    pub recheck_delay: Duration,
    /// ヘルスチェックのタイムアウト
    pub health_timeout: Duration,
    /// デプロイフックのタイムアウト
    pub deploy_timeout: Duration,
    /// Webhook送信のタイムアウト
    pub webhook_timeout: Duration,
}

impl MonitorConfig {
    /// Build a configuration with default timings.
    pub fn new(
        health_check_url: impl Into<String>,
        webhook_url: impl Into<String>,
        deployment_url: impl Into<String>,
        environment: impl Into<String>,
    ) -> Self {
        Self {
            health_check_url: health_check_url.into(),
            webhook_url: webhook_url.into(),
            deployment_url: deployment_url.into(),
            environment: environment.into(),
            check_interval: Duration::from_secs(DEFAULT_CHECK_INTERVAL_SECS),
            recheck_delay: Duration::from_secs(DEFAULT_RECHECK_DELAY_SECS),
            health_timeout: Duration::from_secs(DEFAULT_HEALTH_TIMEOUT_SECS),
            deploy_timeout: Duration::from_secs(DEFAULT_DEPLOY_TIMEOUT_SECS),
            webhook_timeout: Duration::from_secs(DEFAULT_WEBHOOK_TIMEOUT_SECS),
        }
    }

    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable source.
    ///
    /// Every missing required variable is reported at once.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| non_empty(lookup(name));

        let mut missing = Vec::new();
        let mut required = |name: &str| {
            let value = get(name);
            if value.is_none() {
                missing.push(name.to_string());
            }
            value.unwrap_or_default()
        };

        let health_check_url = required(HEALTH_CHECK_URL);
        let webhook_url = required(SLACK_WEBHOOK_URL);
        let deployment_url = required(DEPLOYMENT_URL);

        if !missing.is_empty() {
            return Err(ConfigError::MissingVariables(missing));
        }

        let environment = get(ENV).unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string());
        let secs = |name: &str, default: u64| -> Result<Duration, ConfigError> {
            match get(name) {
                None => Ok(Duration::from_secs(default)),
                Some(raw) => match raw.parse::<u64>() {
                    Ok(n) if (1..=MAX_TUNABLE_SECS).contains(&n) => Ok(Duration::from_secs(n)),
                    _ => Err(ConfigError::InvalidValue {
                        name: name.to_string(),
                        value: raw,
                    }),
                },
            }
        };

        Ok(Self {
            health_check_url,
            webhook_url,
            deployment_url,
            environment,
            check_interval: secs(CHECK_INTERVAL_SECS, DEFAULT_CHECK_INTERVAL_SECS)?,
            recheck_delay: secs(RECHECK_DELAY_SECS, DEFAULT_RECHECK_DELAY_SECS)?,
            health_timeout: secs(HEALTH_TIMEOUT_SECS, DEFAULT_HEALTH_TIMEOUT_SECS)?,
            deploy_timeout: secs(DEPLOY_TIMEOUT_SECS, DEFAULT_DEPLOY_TIMEOUT_SECS)?,
            webhook_timeout: secs(WEBHOOK_TIMEOUT_SECS, DEFAULT_WEBHOOK_TIMEOUT_SECS)?,
        })
    }

    /// Webhook URLを秘匿化した表示用文字列
    ///
    /// Incoming webhookのパスはそれ自体が認証情報なので、スキームとホストのみ残す。
    pub fn redacted_webhook_url(&self) -> String {
        match reqwest::Url::parse(&self.webhook_url) {
            Ok(url) => match url.host_str() {
                Some(host) => format!("{}://{}/***", url.scheme(), host),
                None => "***".to_string(),
            },
            Err(_) => "***".to_string(),
        }
    }
}
