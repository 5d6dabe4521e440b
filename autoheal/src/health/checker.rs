//! ヘルスチェッカー
//!
//! 監視対象のヘルスエンドポイントに GET を送り、結果を
//! [`CheckOutcome`] に分類する。HTTP 200 のみを成功とみなす。

use std::collections::BTreeMap;
use std::error::Error as _;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, ACCEPT, USER_AGENT};
use reqwest::{Client, StatusCode};
use tracing::debug;

use super::result::{CheckResult, RequestInfo, ResponseBody};
use crate::config::MonitorConfig;
use crate::error::{AutohealError, Result};

/// 送信する User-Agent
pub const USER_AGENT_VALUE: &str = concat!("autoheal/", env!("CARGO_PKG_VERSION"));

/// 送信する Accept ヘッダー
pub const ACCEPT_VALUE: &str = "application/json, text/plain, */*";

/// 1回のヘルスチェックを実行するもの
///
/// モニターはこのトレイト越しにチェックを行うため、テストでは
/// 任意の結果列を返す実装に差し替えられる。
#[async_trait]
pub trait HealthProbe: Send + Sync {
    /// Run one check and classify it.
    async fn check(&self) -> CheckResult;
}

/// HTTPヘルスチェッカー
#[derive(Clone, Debug)]
pub struct HealthChecker {
    /// HTTPクライアント（タイムアウト設定済み）
    client: Client,
    /// チェック対象URL
    url: String,
}

impl HealthChecker {
    /// 新しいヘルスチェッカーを作成
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(AutohealError::HttpClient)?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }

    /// 設定から作成
    pub fn from_config(config: &MonitorConfig) -> Result<Self> {
        Self::new(config.health_check_url.clone(), config.health_timeout)
    }

    fn request_headers() -> BTreeMap<String, String> {
        BTreeMap::from([
            (USER_AGENT.as_str().to_string(), USER_AGENT_VALUE.to_string()),
            (ACCEPT.as_str().to_string(), ACCEPT_VALUE.to_string()),
        ])
    }
}

#[async_trait]
impl HealthProbe for HealthChecker {
    async fn check(&self) -> CheckResult {
        let request = RequestInfo::get(self.url.clone(), Self::request_headers());

        let response = self
            .client
            .get(&self.url)
            .header(USER_AGENT, USER_AGENT_VALUE)
            .header(ACCEPT, ACCEPT_VALUE)
            .send()
            .await;

        let response = match response {
            Ok(response) => response,
            Err(e) => {
                debug!(url = %self.url, error = %e, "Health check request failed");
                return CheckResult::network_failure(request, describe_error(&e));
            }
        };

        let status = response.status();
        if status == StatusCode::OK {
            return CheckResult::success(request);
        }

        let headers = header_map_to_btree(response.headers());
        let body = match response.text().await {
            Ok(text) => ResponseBody::Read(text),
            Err(e) => {
                debug!(url = %self.url, error = %e, "Failed to read health check response body");
                ResponseBody::Unreadable(e.to_string())
            }
        };

        CheckResult::http_failure(
            request,
            status.as_u16(),
            status.canonical_reason().unwrap_or("Unknown Status"),
            body,
            headers,
        )
    }
}

/// reqwestのエラーを原因チェーン込みの1行メッセージにする
pub(crate) fn describe_error(err: &reqwest::Error) -> String {
    let mut message = if err.is_timeout() {
        format!("request timed out: {}", err)
    } else {
        err.to_string()
    };

    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

/// ヘッダーを表示用のマップに変換（同名ヘッダーはカンマ区切りで結合）
pub(crate) fn header_map_to_btree(headers: &HeaderMap) -> BTreeMap<String, String> {
    let mut map: BTreeMap<String, String> = BTreeMap::new();
    for (name, value) in headers {
        let value = value.to_str().unwrap_or("<non-utf8>");
        map.entry(name.as_str().to_string())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(value);
            })
            .or_insert_with(|| value.to_string());
    }
    map
}
