//! Deploy hook trigger.
//!
//! Remediation is a plain GET on the configured deploy hook URL. The response
//! is only logged; a failed trigger still counts as an attempted remediation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::USER_AGENT;
use reqwest::Client;
use tracing::{error, info};

use crate::config::MonitorConfig;
use crate::error::{AutohealError, DeliveryError, Result};
use crate::health::checker::USER_AGENT_VALUE;

/// 再デプロイをトリガーするもの
#[async_trait]
pub trait Remediator: Send + Sync {
    /// Fire the remediation action once.
    async fn trigger(&self) -> std::result::Result<(), DeliveryError>;
}

/// デプロイフック（GET で再デプロイを起動する）
#[derive(Clone, Debug)]
pub struct DeployHook {
    client: Client,
    url: String,
}

impl DeployHook {
    /// 新しいデプロイフックを作成
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
        Self::new(config.deployment_url.clone(), config.deploy_timeout)
    }
}

#[async_trait]
impl Remediator for DeployHook {
    async fn trigger(&self) -> std::result::Result<(), DeliveryError> {
        info!("Triggering deployment");

        let response = self
            .client
            .get(&self.url)
            .header(USER_AGENT, USER_AGENT_VALUE)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Deployment trigger request failed");
                DeliveryError::Http(e)
            })?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if status.is_success() {
            info!(status = status.as_u16(), "Deployment triggered");
            Ok(())
        } else {
            error!(status = status.as_u16(), body = %body, "Deployment trigger rejected");
            Err(DeliveryError::Status {
                status: status.as_u16(),
                body,
            })
        }
    }
}
