//! ヘルスチェック
//!
//! 単一のヘルスエンドポイントをポーリングし、結果を分類する。

pub mod checker;
pub mod result;

pub use checker::{HealthChecker, HealthProbe};
pub use result::{CheckOutcome, CheckResult, RequestInfo, ResponseBody, EMPTY_BODY, UNREADABLE_BODY};
