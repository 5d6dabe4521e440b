//! 監視ループ
//!
//! 単一のタスクが定期タイマー・再チェックタイマー・シャットダウン信号を
//! `tokio::select!` で待ち受け、チェックサイクルを1つずつ順番に実行する。
//! 状態を変更するのはこのタスクだけなので、定期チェックと再チェックが
//! 並行して走ることはない。

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{interval, sleep_until, Instant, MissedTickBehavior};
use tracing::{info, warn};

use crate::config::{MonitorConfig, MAX_TUNABLE_SECS};
use crate::error::Result;
use crate::health::{CheckResult, HealthChecker, HealthProbe};
use crate::notify::{AlertKind, Notifier, SlackNotifier};
use crate::remediation::{Decision, DeployHook, RemediationController, RemediationState, Remediator};
use crate::shutdown::ShutdownController;

/// 監視タイミング
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorTiming {
    /// 定期チェック間隔
    pub check_interval: Duration,
    /// 再デプロイ後の再チェックまでの待機
    pub recheck_delay: Duration,
}

impl MonitorTiming {
    /// 各値を 1ms 以上 [`MAX_TUNABLE_SECS`] 以下に収める
    pub fn bounded(self) -> Self {
        let min = Duration::from_millis(1);
        let max = Duration::from_secs(MAX_TUNABLE_SECS);
        Self {
            check_interval: self.check_interval.clamp(min, max),
            recheck_delay: self.recheck_delay.clamp(min, max),
        }
    }
}

impl From<&MonitorConfig> for MonitorTiming {
    fn from(config: &MonitorConfig) -> Self {
        Self {
            check_interval: config.check_interval,
            recheck_delay: config.recheck_delay,
        }
    }
}

/// Health monitor with automatic remediation.
pub struct Monitor {
    probe: Arc<dyn HealthProbe>,
    notifier: Arc<dyn Notifier>,
    remediator: Arc<dyn Remediator>,
    controller: RemediationController,
    timing: MonitorTiming,
    /// 予約済みの再チェック時刻（最大1件）
    recheck_at: Option<Instant>,
}

impl Monitor {
    /// 任意の実装からモニターを作成
    pub fn new(
        probe: Arc<dyn HealthProbe>,
        notifier: Arc<dyn Notifier>,
        remediator: Arc<dyn Remediator>,
        timing: MonitorTiming,
    ) -> Self {
        Self {
            probe,
            notifier,
            remediator,
            controller: RemediationController::new(),
            timing: timing.bounded(),
            recheck_at: None,
        }
    }

    /// 設定からHTTP実装を組み立てて作成
    pub fn from_config(config: &MonitorConfig) -> Result<Self> {
        Ok(Self::new(
            Arc::new(HealthChecker::from_config(config)?),
            Arc::new(SlackNotifier::from_config(config)?),
            Arc::new(DeployHook::from_config(config)?),
            MonitorTiming::from(config),
        ))
    }

    /// 現在のリメディエーション状態
    pub fn state(&self) -> RemediationState {
        self.controller.state()
    }

    /// 予約済みの再チェック時刻
    pub fn recheck_at(&self) -> Option<Instant> {
        self.recheck_at
    }

    /// Run until `shutdown` is requested.
    ///
    /// The first check runs immediately. A cycle in progress when shutdown
    /// arrives is abandoned.
    pub async fn run(&mut self, shutdown: &ShutdownController) {
        let mut ticker = interval(self.timing.check_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            interval_secs = self.timing.check_interval.as_secs_f64(),
            recheck_delay_secs = self.timing.recheck_delay.as_secs_f64(),
            "Health monitor started"
        );

        loop {
            let recheck_at = self.recheck_at;
            let recheck = async move {
                match recheck_at {
                    Some(at) => sleep_until(at).await,
                    None => std::future::pending::<()>().await,
                }
            };

            tokio::select! {
                biased;

                _ = shutdown.wait() => break,
                _ = recheck => {
                    self.recheck_at = None;
                    tokio::select! {
                        _ = self.run_recheck() => {}
                        _ = shutdown.wait() => break,
                    }
                }
                _ = ticker.tick() => {
                    tokio::select! {
                        _ = self.run_cycle() => {}
                        _ = shutdown.wait() => break,
                    }
                }
            }
        }

        info!(state = self.state().as_str(), "Health monitor stopped");
    }

    /// 1回のチェックサイクル（チェック → 判定 → アクション実行）
    pub async fn run_cycle(&mut self) -> Decision {
        let result = self.probe.check().await;
        self.handle_result(&result).await
    }

    /// 再デプロイ後の再チェック
    ///
    /// 通常のサイクルと同じ判定を行い、結果にかかわらずリメディエーション
    /// 状態を Idle に戻す。このサイクルで予約された再チェックはそのまま残る。
    pub async fn run_recheck(&mut self) -> Decision {
        info!("Running post-deployment re-check");
        let decision = self.run_cycle().await;
        self.controller.reset();
        info!("Remediation window closed, resuming normal monitoring");
        decision
    }

    /// チェック結果に応じてアクションを実行
    pub async fn handle_result(&mut self, result: &CheckResult) -> Decision {
        let decision = self.controller.on_result(result);

        match decision {
            Decision::Healthy { was_remediating } => {
                if was_remediating {
                    info!(url = %result.request.url, "Service recovered");
                } else {
                    info!(url = %result.request.url, "Health check passed");
                }
            }
            Decision::StartRemediation => {
                warn!(
                    url = %result.request.url,
                    result = %result,
                    "Health check failed, starting remediation"
                );
                self.notifier.send(AlertKind::InitialFailure, result).await;

                if let Err(e) = self.remediator.trigger().await {
                    warn!(error = %e, "Remediation attempted but the trigger failed");
                }

                self.recheck_at = Some(Instant::now() + self.timing.recheck_delay);
                info!(
                    delay_secs = self.timing.recheck_delay.as_secs_f64(),
                    "Re-check scheduled"
                );
            }
            Decision::StillFailing => {
                warn!(
                    url = %result.request.url,
                    result = %result,
                    "Health check still failing during remediation"
                );
                self.notifier.send(AlertKind::StillFailing, result).await;
            }
        }

        decision
    }
}
