use chrono::Utc;
use tokio::time::Instant;

/// Source of "now" in epoch milliseconds.
pub trait Clock: Send + Sync + 'static {
    fn now_ms(&self) -> i64;
}

/// Wall-clock epoch captured once, advanced by tokio's monotonic clock.
///
/// Follows `tokio::time::pause()` in tests, and never jumps backwards when
/// the system clock is adjusted mid-session.
#[derive(Debug, Clone)]
pub struct TokioClock {
    base_epoch_ms: i64,
    base_instant: Instant,
}

impl TokioClock {
    pub fn new() -> Self {
        Self::with_epoch(Utc::now().timestamp_millis())
    }

    pub fn with_epoch(base_epoch_ms: i64) -> Self {
        Self {
            base_epoch_ms,
            base_instant: Instant::now(),
        }
    }
}

impl Default for TokioClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for TokioClock {
    fn now_ms(&self) -> i64 {
        let since = self.base_instant.elapsed().as_millis();
        self.base_epoch_ms
            .saturating_add(i64::try_from(since).unwrap_or(i64::MAX))
    }
}
