//! Status endpoint response schema and per-order status results.

use serde::{Deserialize, Serialize};

use crate::download::DownloadOutcome;
use crate::orders::OrderRecord;

/// Response body of the order-info endpoint.
///
/// Only the fields the checker relies on are modelled. Both are optional;
/// a body carrying neither yields an `Unknown` status instead of an error.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderInfoResponse {
    #[serde(default)]
    pub summary_state_code: Option<String>,
    #[serde(default)]
    pub summary_state_text: Option<String>,
}

/// Coarse classification of an upstream status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusKind {
    Processing,
    Shipped,
    Delivered,
    Cancelled,
    Error,
    Unknown,
}

impl StatusKind {
    /// Classify a raw status code by case-insensitive substring match.
    pub fn classify(code: &str) -> Self {
        let code = code.to_lowercase();
        [
            ("processing", Self::Processing),
            ("shipped", Self::Shipped),
            ("delivered", Self::Delivered),
            ("cancelled", Self::Cancelled),
            ("error", Self::Error),
        ]
        .into_iter()
        .find(|(needle, _)| code.contains(needle))
        .map(|(_, kind)| kind)
        .unwrap_or(Self::Unknown)
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Self::Processing => "🏭",
            Self::Shipped => "📦",
            Self::Delivered => "✅",
            Self::Cancelled => "❌",
            Self::Error => "⚠️",
            Self::Unknown => "❓",
        }
    }
}

/// A successfully parsed order status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderStatus {
    /// Raw status code as sent by the endpoint (may be empty).
    pub code: String,
    /// Human-readable status text.
    pub text: String,
}

impl OrderStatus {
    pub fn new(code: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            text: text.into(),
        }
    }

    pub fn kind(&self) -> StatusKind {
        StatusKind::classify(&self.code)
    }

    /// A non-empty code that matches none of the known kinds.
    pub fn is_unmapped(&self) -> bool {
        !self.code.is_empty() && self.kind() == StatusKind::Unknown
    }

    /// Only `DELIVERED` (any casing) means the photos can be picked up.
    pub fn is_ready_for_pickup(&self) -> bool {
        self.code.eq_ignore_ascii_case("DELIVERED")
    }

    /// Status text prefixed with the emoji for its kind.
    pub fn display(&self) -> String {
        format!("{} {}", self.kind().emoji(), self.text)
    }
}

impl From<OrderInfoResponse> for OrderStatus {
    fn from(response: OrderInfoResponse) -> Self {
        let code = response.summary_state_code.unwrap_or_default();
        let text = match response.summary_state_text {
            Some(text) if !text.is_empty() => text,
            _ if !code.is_empty() => code.clone(),
            _ => "Unknown".to_string(),
        };
        Self { code, text }
    }
}

/// Outcome of checking one order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum StatusOutcome {
    /// The endpoint answered with a status.
    Checked(OrderStatus),
    /// The check failed; the message is shown in place of a status.
    Failed { message: String },
}

impl StatusOutcome {
    pub fn status(&self) -> Option<&OrderStatus> {
        match self {
            Self::Checked(status) => Some(status),
            Self::Failed { .. } => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    pub fn is_ready_for_pickup(&self) -> bool {
        self.status().map(|s| s.is_ready_for_pickup()).unwrap_or(false)
    }

    pub fn display(&self) -> String {
        match self {
            Self::Checked(status) => status.display(),
            Self::Failed { message } => format!("{} Error: {}", StatusKind::Error.emoji(), message),
        }
    }
}

/// Everything known about one order after it was processed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResult {
    /// Full `shop-order` key the status was requested for.
    pub order_key: String,
    #[serde(flatten)]
    pub record: OrderRecord,
    pub outcome: StatusOutcome,
    /// Present only when a download was attempted or skipped as already done.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download: Option<DownloadOutcome>,
}

impl StatusResult {
    pub fn new(record: OrderRecord, outcome: StatusOutcome) -> Self {
        Self {
            order_key: record.resolved_key(),
            record,
            outcome,
            download: None,
        }
    }

    pub fn with_download(mut self, download: DownloadOutcome) -> Self {
        self.download = Some(download);
        self
    }
}
