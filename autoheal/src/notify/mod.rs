//! 障害通知
//!
//! 2種類のアラート（初回障害・再デプロイ後の継続障害）を外部チャネルへ送る。
//! 送信失敗はログに残すのみで、呼び出し元へは伝播しない。

pub mod message;
pub mod slack;

pub use message::{format_alert, AlertKind};
pub use slack::SlackNotifier;

use async_trait::async_trait;

use crate::health::CheckResult;

/// 通知チャネル
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver one alert. Delivery failures are logged by the implementation.
    async fn send(&self, kind: AlertKind, result: &CheckResult);
}
