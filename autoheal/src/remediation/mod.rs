//! 自動復旧（リメディエーション）制御
//!
//! ヘルスチェック結果ごとに、アラート送信・再デプロイ・状態リセットの
//! どれを行うかを決める2状態のステートマシン。
//!
//! ```text
//!            failure                      failure
//!   Idle ─────────────────▶ Remediating ─────────┐
//!    ▲   (initial alert,         │   ◀───────────┘ (still-failing alert)
//!    │    deploy, recheck)       │
//!    └───────────────────────────┘
//!        success / deferred re-check reset
//! ```
//!
//! 状態は単一のモニタータスクが所有するため、ロックは不要。

pub mod deploy;

pub use deploy::{DeployHook, Remediator};

use tracing::debug;

use crate::health::CheckResult;

/// リメディエーション状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RemediationState {
    /// 通常監視中
    #[default]
    Idle,
    /// 再デプロイを実行済みで、再チェック待ち
    Remediating,
}

impl RemediationState {
    /// ログ表示用の文字列
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Remediating => "remediating",
        }
    }
}

/// チェック結果に対して実行すべきアクション
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// 正常。通知なし
    Healthy {
        /// リメディエーション中フラグをクリアしたか
        was_remediating: bool,
    },
    /// 初回失敗: 障害アラート送信 → 再デプロイ → 再チェック予約
    StartRemediation,
    /// リメディエーション中の失敗: 継続障害アラートのみ
    StillFailing,
}

/// Remediation state machine.
///
/// At most one remediation is in flight: a failure while `Remediating` never
/// yields [`Decision::StartRemediation`].
#[derive(Debug, Default)]
pub struct RemediationController {
    state: RemediationState,
}

impl RemediationController {
    /// 新しいコントローラを作成（Idle）
    pub fn new() -> Self {
        Self::default()
    }

    /// 現在の状態
    pub fn state(&self) -> RemediationState {
        self.state
    }

    /// リメディエーション中か
    pub fn is_remediating(&self) -> bool {
        self.state == RemediationState::Remediating
    }

    /// Record a check result and return what the caller must do.
    ///
    /// The state transition happens here, before the caller performs any
    /// asynchronous work for the decision.
    pub fn on_result(&mut self, result: &CheckResult) -> Decision {
        if result.is_success() {
            let was_remediating = self.is_remediating();
            self.state = RemediationState::Idle;
            return Decision::Healthy { was_remediating };
        }

        match self.state {
            RemediationState::Idle => {
                self.state = RemediationState::Remediating;
                debug!("Entering remediation");
                Decision::StartRemediation
            }
            RemediationState::Remediating => Decision::StillFailing,
        }
    }

    /// 再チェック完了後に状態を Idle へ戻す
    pub fn reset(&mut self) {
        if self.is_remediating() {
            debug!("Remediation window closed");
        }
        self.state = RemediationState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::{RequestInfo, ResponseBody};
    use std::collections::BTreeMap;

    fn request() -> RequestInfo {
        RequestInfo::get("http://localhost/health", BTreeMap::new())
    }

    fn ok() -> CheckResult {
        CheckResult::success(request())
    }

    fn unavailable() -> CheckResult {
        CheckResult::http_failure(
            request(),
            503,
            "Service Unavailable",
            ResponseBody::Read(String::new()),
            BTreeMap::new(),
        )
    }

    fn refused() -> CheckResult {
        CheckResult::network_failure(request(), "connection refused")
    }

    #[test]
    fn test_starts_idle() {
        let controller = RemediationController::new();
        assert_eq!(controller.state(), RemediationState::Idle);
    }

    #[test]
    fn test_success_while_idle_stays_idle() {
        let mut controller = RemediationController::new();
        assert_eq!(
            controller.on_result(&ok()),
            Decision::Healthy {
                was_remediating: false
            }
        );
        assert_eq!(controller.state(), RemediationState::Idle);
    }

    #[test]
    fn test_first_failure_starts_remediation() {
        let mut controller = RemediationController::new();
        assert_eq!(controller.on_result(&unavailable()), Decision::StartRemediation);
        assert_eq!(controller.state(), RemediationState::Remediating);
    }

    #[test]
    fn test_network_failure_starts_remediation() {
        let mut controller = RemediationController::new();
        assert_eq!(controller.on_result(&refused()), Decision::StartRemediation);
        assert!(controller.is_remediating());
    }

    #[test]
    fn test_failure_while_remediating_is_still_failing() {
        let mut controller = RemediationController::new();
        controller.on_result(&unavailable());

        for result in [unavailable(), refused(), unavailable()] {
            assert_eq!(controller.on_result(&result), Decision::StillFailing);
            assert_eq!(controller.state(), RemediationState::Remediating);
        }
    }

    #[test]
    fn test_success_clears_remediation() {
        let mut controller = RemediationController::new();
        controller.on_result(&unavailable());

        assert_eq!(
            controller.on_result(&ok()),
            Decision::Healthy {
                was_remediating: true
            }
        );
        assert_eq!(controller.state(), RemediationState::Idle);

        // 次の失敗は新しいリメディエーションを開始する
        assert_eq!(controller.on_result(&refused()), Decision::StartRemediation);
    }

    #[test]
    fn test_reset_returns_to_idle() {
        let mut controller = RemediationController::new();
        controller.on_result(&unavailable());
        controller.reset();
        assert_eq!(controller.state(), RemediationState::Idle);

        // Idleでのresetは何もしない
        controller.reset();
        assert_eq!(controller.state(), RemediationState::Idle);
    }

    #[test]
    fn test_mixed_sequence_invariants() {
        let mut controller = RemediationController::new();
        let sequence = [
            unavailable(),
            unavailable(),
            ok(),
            refused(),
            refused(),
            refused(),
            ok(),
            ok(),
        ];

        let mut starts = 0;
        for result in &sequence {
            let before = controller.state();
            let decision = controller.on_result(result);
            if result.is_success() {
                assert_eq!(controller.state(), RemediationState::Idle);
            } else {
                assert_eq!(controller.state(), RemediationState::Remediating);
                if before == RemediationState::Idle {
                    assert_eq!(decision, Decision::StartRemediation);
                } else {
                    assert_eq!(decision, Decision::StillFailing);
                }
            }
            if decision == Decision::StartRemediation {
                starts += 1;
            }
        }
        assert_eq!(starts, 2);
    }

    #[test]
    fn test_state_as_str() {
        assert_eq!(RemediationState::Idle.as_str(), "idle");
        assert_eq!(RemediationState::Remediating.as_str(), "remediating");
    }
}
