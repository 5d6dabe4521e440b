//! check / config サブコマンド
//!
//! 通知や再デプロイを行わずに、1回だけヘルスチェックを実行する。

use std::fmt::Write as _;

use crate::config::MonitorConfig;
use crate::error::Result;
use crate::health::{CheckOutcome, CheckResult, HealthChecker, HealthProbe};

/// 1回チェックして結果を返す
pub async fn execute(config: &MonitorConfig) -> Result<CheckResult> {
    let checker = HealthChecker::from_config(config)?;
    Ok(checker.check().await)
}

/// チェック結果の表示用テキスト
pub fn render_result(result: &CheckResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} {}", result.request.method, result.request.url);
    let _ = writeln!(out, "checked at: {}", result.request.timestamp.to_rfc3339());
    match &result.outcome {
        CheckOutcome::Success => {
            let _ = writeln!(out, "result: healthy (HTTP 200)");
        }
        CheckOutcome::HttpFailure {
            status,
            status_text,
            body,
            ..
        } => {
            let _ = writeln!(out, "result: unhealthy (HTTP {} {})", status, status_text);
            let _ = writeln!(out, "body: {}", body.display_text());
        }
        CheckOutcome::NetworkFailure { message } => {
            let _ = writeln!(out, "result: unreachable ({})", message);
        }
    }
    out
}

/// 設定の表示用テキスト（Webhook URLは秘匿化）
pub fn render_config(config: &MonitorConfig) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "health_check_url: {}", config.health_check_url);
    let _ = writeln!(out, "webhook_url: {}", config.redacted_webhook_url());
    let _ = writeln!(out, "deployment_url: {}", config.deployment_url);
    let _ = writeln!(out, "environment: {}", config.environment);
    let _ = writeln!(out, "check_interval_secs: {}", config.check_interval.as_secs());
    let _ = writeln!(out, "recheck_delay_secs: {}", config.recheck_delay.as_secs());
    let _ = writeln!(out, "health_timeout_secs: {}", config.health_timeout.as_secs());
    let _ = writeln!(out, "deploy_timeout_secs: {}", config.deploy_timeout.as_secs());
    let _ = writeln!(out, "webhook_timeout_secs: {}", config.webhook_timeout.as_secs());
    out
}
