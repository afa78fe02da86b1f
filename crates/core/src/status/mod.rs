//! Order status lookup.
//!
//! This module provides the `StatusChecker` trait and its HTTP
//! implementation. A checker performs exactly one request per order; pacing
//! between requests is the caller's job (see [`crate::pacing`]).

mod client;
mod types;

pub(crate) use client::BROWSER_USER_AGENT;
pub use client::HttpStatusClient;
pub use types::{
    OrderInfoResponse, OrderStatus, StatusKind, StatusOutcome, StatusResult,
};

use async_trait::async_trait;
use thiserror::Error;

use crate::orders::OrderRecord;

/// Errors that can occur when checking an order status.
#[derive(Debug, Clone, Error)]
pub enum StatusError {
    /// The request did not finish within the client timeout.
    #[error("Request timed out")]
    Timeout,

    /// The endpoint could not be reached.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// The endpoint answered with a non-success status.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The response body was not the expected JSON.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// Any other request failure.
    #[error("Request failed: {0}")]
    Request(String),
}

impl StatusError {
    pub(crate) fn from_send(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else if e.is_connect() {
            Self::ConnectionFailed(e.to_string())
        } else {
            Self::Request(e.to_string())
        }
    }
}

impl From<reqwest::Error> for StatusError {
    fn from(e: reqwest::Error) -> Self {
        Self::Request(e.to_string())
    }
}

/// Looks up the current status of an order.
#[async_trait]
pub trait StatusChecker: Send + Sync {
    /// Returns the name of this checker implementation.
    fn name(&self) -> &str;

    /// Check one order. Exactly one upstream request per call.
    async fn check(&self, record: &OrderRecord) -> Result<OrderStatus, StatusError>;
}
