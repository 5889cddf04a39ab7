// =============================================================================
// circuit_breaker.rs — THE NEWS WIRE FUSE
// =============================================================================
//
// Every scan fans out to the same upstream. When that upstream is down, a
// scan would otherwise spend its full timeout on every peer before falling
// back, and the next scan would do it all again.
//
// The breaker is shared by every scan in the process:
//
// - Closed:   calls go out as normal; consecutive failures are counted.
// - Open:     after `failure_threshold` consecutive failures, calls are
//             refused for `reset_timeout`; peers go straight to fallback.
// - HalfOpen: once the timeout lapses, calls are let through on trial.
//             `success_threshold` successes close the breaker, a single
//             failure opens it again.
// =============================================================================

use parking_lot::RwLock;
use serde::Serialize;
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

impl fmt::Display for CircuitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CircuitState::Closed => write!(f, "CLOSED"),
            CircuitState::Open => write!(f, "OPEN"),
            CircuitState::HalfOpen => write!(f, "HALF_OPEN"),
        }
    }
}

struct BreakerState {
    state: CircuitState,
    failure_count: u32,
    success_count: u32,
    opened_at: Option<Instant>,
    last_state_change: Instant,
    total_trips: u64,
}

pub struct CircuitBreaker {
    /// Upstream name, for log lines.
    name: String,
    inner: RwLock<BreakerState>,
    failure_threshold: u32,
    reset_timeout: Duration,
    success_threshold: u32,
}

impl CircuitBreaker {
    pub fn new(
        name: impl Into<String>,
        failure_threshold: u32,
        reset_timeout: Duration,
        success_threshold: u32,
    ) -> Self {
        let name = name.into();
        info!(
            name = %name,
            failure_threshold = failure_threshold,
            reset_timeout_secs = reset_timeout.as_secs(),
            success_threshold = success_threshold,
            "Circuit breaker armed"
        );

        Self {
            name,
            inner: RwLock::new(BreakerState {
                state: CircuitState::Closed,
                failure_count: 0,
                success_count: 0,
                opened_at: None,
                last_state_change: Instant::now(),
                total_trips: 0,
            }),
            failure_threshold: failure_threshold.max(1),
            reset_timeout,
            success_threshold: success_threshold.max(1),
        }
    }

    /// Whether a call may go out right now. Moves Open -> HalfOpen once the
    /// reset timeout has lapsed.
    pub fn allow_request(&self) -> bool {
        let mut inner = self.inner.write();

        match inner.state {
            CircuitState::Closed | CircuitState::HalfOpen => true,
            CircuitState::Open => {
                let elapsed = inner.opened_at.map(|t| t.elapsed()).unwrap_or(self.reset_timeout);
                if elapsed >= self.reset_timeout {
                    info!(name = %self.name, "Circuit breaker OPEN -> HALF_OPEN, sending trial requests");
                    inner.state = CircuitState::HalfOpen;
                    inner.success_count = 0;
                    inner.last_state_change = Instant::now();
                    true
                } else {
                    false
                }
            }
        }
    }

    pub fn record_success(&self) {
        let mut inner = self.inner.write();

        match inner.state {
            CircuitState::Closed => inner.failure_count = 0,
            CircuitState::HalfOpen => {
                inner.success_count += 1;
                if inner.success_count >= self.success_threshold {
                    info!(
                        name = %self.name,
                        successes = inner.success_count,
                        "Circuit breaker HALF_OPEN -> CLOSED, upstream is healthy again"
                    );
                    inner.state = CircuitState::Closed;
                    inner.failure_count = 0;
                    inner.success_count = 0;
                    inner.last_state_change = Instant::now();
                }
            }
            // A call that was already in flight when the breaker opened.
            CircuitState::Open => {}
        }
    }

    pub fn record_failure(&self) {
        let mut inner = self.inner.write();

        match inner.state {
            CircuitState::Closed => {
                inner.failure_count += 1;
                if inner.failure_count >= self.failure_threshold {
                    warn!(
                        name = %self.name,
                        failures = inner.failure_count,
                        "Circuit breaker TRIPPED, CLOSED -> OPEN"
                    );
                    trip(&mut inner);
                }
            }
            CircuitState::HalfOpen => {
                warn!(name = %self.name, "Trial request failed, HALF_OPEN -> OPEN");
                inner.failure_count = self.failure_threshold;
                trip(&mut inner);
            }
            // In-flight calls settling after the trip; the open window is
            // measured from the trip alone.
            CircuitState::Open => {}
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> CircuitState {
        self.inner.read().state
    }

    pub fn snapshot(&self) -> CircuitBreakerSnapshot {
        let inner = self.inner.read();
        CircuitBreakerSnapshot {
            name: self.name.clone(),
            state: inner.state,
            failure_count: inner.failure_count,
            success_count: inner.success_count,
            total_trips: inner.total_trips,
            time_in_current_state_secs: inner.last_state_change.elapsed().as_secs(),
        }
    }
}

fn trip(inner: &mut BreakerState) {
    let now = Instant::now();
    inner.state = CircuitState::Open;
    inner.opened_at = Some(now);
    inner.last_state_change = now;
    inner.total_trips += 1;
}

/// Breaker state as reported on `/metrics`.
#[derive(Debug, Clone, Serialize)]
pub struct CircuitBreakerSnapshot {
    pub name: String,
    pub state: CircuitState,
    pub failure_count: u32,
    pub success_count: u32,
    pub total_trips: u64,
    pub time_in_current_state_secs: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_closed() {
        let cb = CircuitBreaker::new("newsapi", 3, Duration::from_secs(5), 2);
        assert_eq!(cb.state(), CircuitState::Closed);
        assert!(cb.allow_request());
    }

    #[test]
    fn test_trips_after_consecutive_failures() {
        let cb = CircuitBreaker::new("newsapi", 3, Duration::from_secs(60), 2);
        cb.record_failure();
        cb.record_failure();
        assert_eq!(cb.state(), CircuitState::Closed);
        cb.record_failure();
        assert_eq!(cb.state(), CircuitState::Open);
        assert!(!cb.allow_request());
        assert_eq!(cb.snapshot().total_trips, 1);
    }

    #[test]
    fn test_success_resets_the_count() {
        let cb = CircuitBreaker::new("newsapi", 3, Duration::from_secs(60), 2);
        cb.record_failure();
        cb.record_failure();
        cb.record_success();
        cb.record_failure();
        assert_eq!(cb.state(), CircuitState::Closed);
    }

    #[test]
    fn test_half_open_closes_after_enough_successes() {
        let cb = CircuitBreaker::new("newsapi", 1, Duration::ZERO, 2);
        cb.record_failure();
        assert_eq!(cb.state(), CircuitState::Open);

        assert!(cb.allow_request());
        assert_eq!(cb.state(), CircuitState::HalfOpen);
        cb.record_success();
        assert_eq!(cb.state(), CircuitState::HalfOpen);
        cb.record_success();
        assert_eq!(cb.state(), CircuitState::Closed);
    }

    #[test]
    fn test_late_failures_do_not_extend_the_open_window() {
        let cb = CircuitBreaker::new("newsapi", 1, Duration::from_millis(100), 1);
        cb.record_failure();
        assert_eq!(cb.state(), CircuitState::Open);

        std::thread::sleep(Duration::from_millis(60));
        cb.record_failure();
        cb.record_failure();
        std::thread::sleep(Duration::from_millis(60));

        assert!(cb.allow_request());
        assert_eq!(cb.state(), CircuitState::HalfOpen);
        assert_eq!(cb.snapshot().total_trips, 1);
    }

    #[test]
    fn test_half_open_failure_reopens() {
        let cb = CircuitBreaker::new("newsapi", 1, Duration::ZERO, 2);
        cb.record_failure();
        assert!(cb.allow_request());
        cb.record_failure();
        assert_eq!(cb.state(), CircuitState::Open);
        assert_eq!(cb.snapshot().total_trips, 2);
    }
}
