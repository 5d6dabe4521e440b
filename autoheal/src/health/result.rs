//! ヘルスチェック結果の型定義

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};

/// レスポンスボディが読み取れなかったときに表示する文字列
pub const UNREADABLE_BODY: &str = "[unable to read response body]";

/// 空のレスポンスボディの表示
pub const EMPTY_BODY: &str = "(empty body)";

/// 送信したリクエストのメタデータ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestInfo {
    /// リクエストURL
    pub url: String,
    /// HTTPメソッド
    pub method: String,
    /// 送信したリクエストヘッダー
    pub headers: BTreeMap<String, String>,
    /// 送信時刻
    pub timestamp: DateTime<Utc>,
}

impl RequestInfo {
    /// GETリクエストのメタデータを現在時刻で作成
    pub fn get(url: impl Into<String>, headers: BTreeMap<String, String>) -> Self {
        Self {
            url: url.into(),
            method: "GET".to_string(),
            headers,
            timestamp: Utc::now(),
        }
    }
}

/// Best-effort response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseBody {
    /// ボディを読み取れた
    Read(String),
    /// 読み取り中にエラーが発生した（理由を保持）
    Unreadable(String),
}

impl ResponseBody {
    /// 通知・ログ向けの表示文字列
    pub fn display_text(&self) -> &str {
        match self {
            Self::Read(body) if body.trim().is_empty() => EMPTY_BODY,
            Self::Read(body) => body,
            Self::Unreadable(_) => UNREADABLE_BODY,
        }
    }
}

/// 1回のヘルスチェックの分類結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    /// HTTP 200
    Success,
    /// 200以外のステータスを受信
    HttpFailure {
        /// ステータスコード
        status: u16,
        /// ステータステキスト（reason phrase）
        status_text: String,
        /// レスポンスボディ
        body: ResponseBody,
        /// レスポンスヘッダー
        headers: BTreeMap<String, String>,
    },
    /// 接続失敗・タイムアウトなどでレスポンスを受信できなかった
    NetworkFailure {
        /// エラーメッセージ
        message: String,
    },
}

/// ヘルスチェック結果（1回のポーリングごとに生成され、処理後に破棄される）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckResult {
    /// リクエストのメタデータ
    pub request: RequestInfo,
    /// 分類結果
    pub outcome: CheckOutcome,
}

impl CheckResult {
    /// Successful check against `request`.
    pub fn success(request: RequestInfo) -> Self {
        Self {
            request,
            outcome: CheckOutcome::Success,
        }
    }

    /// Non-200 response.
    pub fn http_failure(
        request: RequestInfo,
        status: u16,
        status_text: impl Into<String>,
        body: ResponseBody,
        headers: BTreeMap<String, String>,
    ) -> Self {
        Self {
            request,
            outcome: CheckOutcome::HttpFailure {
                status,
                status_text: status_text.into(),
                body,
                headers,
            },
        }
    }

    /// No response at all.
    pub fn network_failure(request: RequestInfo, message: impl Into<String>) -> Self {
        Self {
            request,
            outcome: CheckOutcome::NetworkFailure {
                message: message.into(),
            },
        }
    }

    /// 成功判定
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, CheckOutcome::Success)
    }
}

impl fmt::Display for CheckResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            CheckOutcome::Success => write!(f, "HTTP 200 OK"),
            CheckOutcome::HttpFailure {
                status,
                status_text,
                ..
            } => write!(f, "HTTP {} {}", status, status_text),
            CheckOutcome::NetworkFailure { message } => write!(f, "network error: {}", message),
        }
    }
}
