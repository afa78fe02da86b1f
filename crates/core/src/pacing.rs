//! Request pacing between upstream calls.
//!
//! The status endpoint rate-limits aggressive clients. The run pipeline asks
//! a [`Pacer`] for permission before every status request and reports back
//! once the order has been handled, so the pause is measured from the end of
//! the previous call rather than its start.

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::{sleep_until, Duration, Instant};
use tracing::trace;

/// Decides when the next upstream call may be issued.
#[async_trait]
pub trait Pacer: Send + Sync {
    /// Wait until the next call is permitted.
    async fn wait(&self);

    /// Record that the paced call has finished, successfully or not.
    async fn finished(&self) {}
}

/// Enforces a fixed pause between the end of one call and the start of the
/// next.
///
/// The first call is never delayed.
pub struct FixedDelayPacer {
    delay: Duration,
    last_finished: Mutex<Option<Instant>>,
}

impl FixedDelayPacer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            last_finished: Mutex::new(None),
        }
    }

    pub fn from_millis(delay_ms: u64) -> Self {
        Self::new(Duration::from_millis(delay_ms))
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

#[async_trait]
impl Pacer for FixedDelayPacer {
    async fn wait(&self) {
        let last = *self.last_finished.lock().await;
        if let Some(finished_at) = last {
            let next = finished_at + self.delay;
            let now = Instant::now();
            if next > now {
                trace!(wait_ms = (next - now).as_millis() as u64, "Pacing request");
                sleep_until(next).await;
            }
        }
    }

    async fn finished(&self) {
        *self.last_finished.lock().await = Some(Instant::now());
    }
}

/// Never waits. Useful in tests and for local endpoints.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoDelayPacer;

#[async_trait]
impl Pacer for NoDelayPacer {
    async fn wait(&self) {}
}
