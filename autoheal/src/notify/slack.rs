//! Incoming webhook notifier
//!
//! Posts `{"text": "..."}` to a Slack compatible incoming webhook.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::{info, warn};

use super::message::{format_alert, AlertKind};
use super::Notifier;
use crate::config::MonitorConfig;
use crate::error::{AutohealError, DeliveryError, Result};
use crate::health::CheckResult;

/// Webhookに送信するペイロード
#[derive(Debug, Serialize)]
pub struct WebhookPayload<'a> {
    /// メッセージ本文
    pub text: &'a str,
}

/// Slack webhook notifier
#[derive(Clone, Debug)]
pub struct SlackNotifier {
    client: Client,
    webhook_url: String,
    environment: String,
}

impl SlackNotifier {
    /// 新しい通知クライアントを作成
    pub fn new(
        webhook_url: impl Into<String>,
        environment: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(AutohealError::HttpClient)?;

        Ok(Self {
            client,
            webhook_url: webhook_url.into(),
            environment: environment.into(),
        })
    }

    /// 設定から作成
    pub fn from_config(config: &MonitorConfig) -> Result<Self> {
        Self::new(
            config.webhook_url.clone(),
            config.environment.clone(),
            config.webhook_timeout,
        )
    }

    /// テキストをWebhookへPOSTする（再試行なし）
    pub async fn post(&self, text: &str) -> std::result::Result<(), DeliveryError> {
        let response = self
            .client
            .post(&self.webhook_url)
            .json(&WebhookPayload { text })
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(DeliveryError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl Notifier for SlackNotifier {
    async fn send(&self, kind: AlertKind, result: &CheckResult) {
        let text = format_alert(kind, result, &self.environment);
        match self.post(&text).await {
            Ok(()) => info!(alert = kind.as_str(), "Notification sent"),
            Err(e) => warn!(alert = kind.as_str(), error = %e, "Failed to send notification"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::{RequestInfo, ResponseBody};
    use std::collections::BTreeMap;
    use wiremock::{
        matchers::{body_partial_json, header, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    fn failing_result() -> CheckResult {
        CheckResult::http_failure(
            RequestInfo::get("https://app.example.com/health", BTreeMap::new()),
            503,
            "Service Unavailable",
            ResponseBody::Read("down".to_string()),
            BTreeMap::new(),
        )
    }

    #[tokio::test]
    async fn test_post_sends_json_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/services/T000/B000/XXXX"))
            .and(header("content-type", "application/json"))
            .and(body_partial_json(serde_json::json!({"text": "hello"})))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .expect(1)
            .mount(&server)
            .await;

        let notifier = SlackNotifier::new(
            format!("{}/services/T000/B000/XXXX", server.uri()),
            "dev",
            Duration::from_secs(5),
        )
        .unwrap();
        notifier.post("hello").await.unwrap();
    }

    #[tokio::test]
    async fn test_send_formats_alert() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let notifier = SlackNotifier::new(server.uri(), "prod", Duration::from_secs(5)).unwrap();
        notifier
            .send(AlertKind::InitialFailure, &failing_result())
            .await;

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        let payload: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        let text = payload["text"].as_str().unwrap();
        assert!(text.contains("[PROD] Health check failed"));
        assert!(text.contains("*Status:* 503 Service Unavailable"));
    }

    #[tokio::test]
    async fn test_post_non_2xx_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("no_service"))
            .mount(&server)
            .await;

        let notifier = SlackNotifier::new(server.uri(), "dev", Duration::from_secs(5)).unwrap();
        match notifier.post("hello").await {
            Err(DeliveryError::Status { status, body }) => {
                assert_eq!(status, 500);
                assert_eq!(body, "no_service");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_send_swallows_delivery_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let notifier = SlackNotifier::new(server.uri(), "dev", Duration::from_secs(5)).unwrap();
        // 失敗しても呼び出し元には伝播しない（再試行もしない）
        notifier.send(AlertKind::StillFailing, &failing_result()).await;

        let unreachable =
            SlackNotifier::new("http://127.0.0.1:1/hook", "dev", Duration::from_secs(2)).unwrap();
        unreachable.send(AlertKind::StillFailing, &failing_result()).await;
    }
}
