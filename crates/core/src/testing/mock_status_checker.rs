//! Mock status checker for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::time::{Duration, Instant};

use crate::orders::OrderRecord;
use crate::status::{OrderStatus, StatusChecker, StatusError};

/// Mock implementation of the StatusChecker trait.
///
/// Responses are configured per order key. Keys without a configured
/// response report `IN_PROCESSING`. Every check is recorded in call order,
/// with its start and end time.
#[derive(Debug, Clone)]
pub struct MockStatusChecker {
    responses: Arc<RwLock<HashMap<String, Result<OrderStatus, StatusError>>>>,
    latency: Arc<RwLock<Duration>>,
    checks: Arc<RwLock<Vec<RecordedCheck>>>,
}

/// A recorded check for test assertions.
#[derive(Debug, Clone)]
struct RecordedCheck {
    order_key: String,
    started: Instant,
    finished: Instant,
}

impl Default for MockStatusChecker {
    fn default() -> Self {
        Self::new()
    }
}

impl MockStatusChecker {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(RwLock::new(HashMap::new())),
            latency: Arc::new(RwLock::new(Duration::ZERO)),
            checks: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Answer `order_key` with `status`.
    pub async fn set_status(&self, order_key: &str, status: OrderStatus) {
        self.responses
            .write()
            .await
            .insert(order_key.to_string(), Ok(status));
    }

    /// Fail every check of `order_key` with `error`.
    pub async fn set_error(&self, order_key: &str, error: StatusError) {
        self.responses
            .write()
            .await
            .insert(order_key.to_string(), Err(error));
    }

    /// Simulated duration of every check, success or failure.
    pub async fn set_latency(&self, latency: Duration) {
        *self.latency.write().await = latency;
    }

    /// Order keys checked so far, in call order.
    pub async fn recorded_checks(&self) -> Vec<String> {
        self.checks
            .read()
            .await
            .iter()
            .map(|c| c.order_key.clone())
            .collect()
    }

    /// `(started, finished)` of every check so far, in call order.
    pub async fn recorded_check_times(&self) -> Vec<(Instant, Instant)> {
        self.checks
            .read()
            .await
            .iter()
            .map(|c| (c.started, c.finished))
            .collect()
    }
}

#[async_trait]
impl StatusChecker for MockStatusChecker {
    fn name(&self) -> &str {
        "mock"
    }

    async fn check(&self, record: &OrderRecord) -> Result<OrderStatus, StatusError> {
        let order_key = record.resolved_key();
        let started = Instant::now();

        let latency = *self.latency.read().await;
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        let response = self
            .responses
            .read()
            .await
            .get(&order_key)
            .cloned()
            .unwrap_or_else(|| Ok(OrderStatus::new("IN_PROCESSING", "In production")));

        self.checks.write().await.push(RecordedCheck {
            order_key,
            started,
            finished: Instant::now(),
        });
        response
    }
}
