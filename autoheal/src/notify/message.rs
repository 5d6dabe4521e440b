//! アラートメッセージの組み立て
//!
//! Slack の mrkdwn 記法で読みやすいテキストを生成する。

use std::collections::BTreeMap;
use std::fmt::Write as _;

use crate::health::{CheckOutcome, CheckResult};

/// アラート本文に含めるレスポンスボディの最大文字数
pub const MAX_BODY_CHARS: usize = 2000;

/// Which alert to send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    /// 初回障害: これから再デプロイを実行する
    InitialFailure,
    /// 再デプロイ後も障害が続いている
    StillFailing,
}

impl AlertKind {
    /// ログ表示用の文字列
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InitialFailure => "initial_failure",
            Self::StillFailing => "still_failing",
        }
    }
}

/// Build the alert text for `result`.
pub fn format_alert(kind: AlertKind, result: &CheckResult, environment: &str) -> String {
    let env_tag = environment.to_uppercase();
    let mut text = String::new();

    match kind {
        AlertKind::InitialFailure => {
            let _ = writeln!(text, ":rotating_light: *[{}] Health check failed*", env_tag);
        }
        AlertKind::StillFailing => {
            let _ = writeln!(
                text,
                ":warning: *[{}] Service still failing after deployment attempt*",
                env_tag
            );
        }
    }
    text.push('\n');

    let request = &result.request;
    let _ = writeln!(text, "*Endpoint:* `{} {}`", request.method, request.url);
    let _ = writeln!(text, "*Environment:* {}", environment);
    let _ = writeln!(text, "*Time:* {}", request.timestamp.to_rfc3339());
    text.push('\n');

    match &result.outcome {
        CheckOutcome::Success => {
            let _ = writeln!(text, "*Status:* 200 OK");
        }
        CheckOutcome::HttpFailure {
            status,
            status_text,
            body,
            headers,
        } => {
            let _ = writeln!(text, "*Status:* {} {}", status, status_text);
            if kind == AlertKind::StillFailing {
                let _ = writeln!(text, "*Failure type:* HTTP error response");
            }
            text.push('\n');
            push_block(&mut text, "Request headers", &headers_json(&request.headers));
            push_block(&mut text, "Response body", &truncate(body.display_text()));
            if !headers.is_empty() {
                push_block(&mut text, "Response headers", &headers_json(headers));
            }
        }
        CheckOutcome::NetworkFailure { message } => {
            let _ = writeln!(text, "*Error:* {}", message);
            if kind == AlertKind::StillFailing {
                let _ = writeln!(text, "*Failure type:* network error (no response received)");
            }
            text.push('\n');
            push_block(&mut text, "Request headers", &headers_json(&request.headers));
        }
    }

    match kind {
        AlertKind::InitialFailure => {
            text.push_str(":arrows_counterclockwise: Auto-deployment will be triggered.");
        }
        AlertKind::StillFailing => {
            text.push_str(":sos: Manual intervention may be required.");
        }
    }

    text
}

fn push_block(text: &mut String, title: &str, content: &str) {
    let _ = write!(text, "*{}:*\n```\n{}\n```\n\n", title, content);
}

fn headers_json(headers: &BTreeMap<String, String>) -> String {
    serde_json::to_string_pretty(headers).unwrap_or_else(|_| "{}".to_string())
}

fn truncate(body: &str) -> String {
    match body.char_indices().nth(MAX_BODY_CHARS) {
        Some((idx, _)) => format!("{}… (truncated)", &body[..idx]),
        None => body.to_string(),
    }
}
