// ═══════════════════════════════════════════════════════════════
// METRICS COLLECTOR - how many scans, how many fallbacks, how fast
// ═══════════════════════════════════════════════════════════════
//
// Plain atomic counters, bumped by the scanner and read by the
// `/metrics` route. No locks on the hot path.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use crate::circuit_breaker::CircuitBreakerSnapshot;
use crate::models::Provenance;

#[derive(Debug, Serialize, Clone)]
pub struct MetricsSnapshot {
    pub scans_total: u64,
    pub scans_failed: u64,
    pub peer_fetches: u64,
    pub peer_fetch_failures: u64,
    pub peer_fetch_timeouts: u64,
    pub peers_live: u64,
    pub peers_cached: u64,
    pub peers_sample: u64,
    pub breaker_rejections: u64,
    pub uptime_seconds: u64,
    pub scans_per_minute: f64,
    pub circuit_breaker: Option<CircuitBreakerSnapshot>,
    pub status: String,
}

pub struct MetricsCollector {
    scans_total: AtomicU64,
    scans_failed: AtomicU64,
    peer_fetches: AtomicU64,
    peer_fetch_failures: AtomicU64,
    peer_fetch_timeouts: AtomicU64,
    peers_live: AtomicU64,
    peers_cached: AtomicU64,
    peers_sample: AtomicU64,
    breaker_rejections: AtomicU64,
    start_time: Instant,
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self {
            scans_total: AtomicU64::new(0),
            scans_failed: AtomicU64::new(0),
            peer_fetches: AtomicU64::new(0),
            peer_fetch_failures: AtomicU64::new(0),
            peer_fetch_timeouts: AtomicU64::new(0),
            peers_live: AtomicU64::new(0),
            peers_cached: AtomicU64::new(0),
            peers_sample: AtomicU64::new(0),
            breaker_rejections: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn increment_scans(&self) {
        self.scans_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_scan_failures(&self) {
        self.scans_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_peer_fetches(&self) {
        self.peer_fetches.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_peer_failures(&self) {
        self.peer_fetch_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_peer_timeouts(&self) {
        self.peer_fetch_timeouts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_breaker_rejections(&self) {
        self.breaker_rejections.fetch_add(1, Ordering::Relaxed);
    }

    /// Count one competitor record by where it came from.
    pub fn record_provenance(&self, provenance: Provenance) {
        let counter = match provenance {
            Provenance::Live => &self.peers_live,
            Provenance::Cached => &self.peers_cached,
            Provenance::Sample => &self.peers_sample,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self, circuit_breaker: Option<CircuitBreakerSnapshot>) -> MetricsSnapshot {
        let uptime = self.start_time.elapsed().as_secs();
        let scans_total = self.scans_total.load(Ordering::Relaxed);
        let scans_per_minute = if uptime > 0 {
            (scans_total as f64 / uptime as f64) * 60.0
        } else {
            0.0
        };

        MetricsSnapshot {
            scans_total,
            scans_failed: self.scans_failed.load(Ordering::Relaxed),
            peer_fetches: self.peer_fetches.load(Ordering::Relaxed),
            peer_fetch_failures: self.peer_fetch_failures.load(Ordering::Relaxed),
            peer_fetch_timeouts: self.peer_fetch_timeouts.load(Ordering::Relaxed),
            peers_live: self.peers_live.load(Ordering::Relaxed),
            peers_cached: self.peers_cached.load(Ordering::Relaxed),
            peers_sample: self.peers_sample.load(Ordering::Relaxed),
            breaker_rejections: self.breaker_rejections.load(Ordering::Relaxed),
            uptime_seconds: uptime,
            scans_per_minute,
            circuit_breaker,
            status: "operational".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_show_up_in_snapshot() {
        let metrics = MetricsCollector::new();
        metrics.increment_scans();
        metrics.increment_peer_fetches();
        metrics.increment_peer_fetches();
        metrics.increment_peer_timeouts();
        metrics.record_provenance(Provenance::Live);
        metrics.record_provenance(Provenance::Sample);
        metrics.record_provenance(Provenance::Sample);

        let snap = metrics.snapshot(None);
        assert_eq!(snap.scans_total, 1);
        assert_eq!(snap.peer_fetches, 2);
        assert_eq!(snap.peer_fetch_timeouts, 1);
        assert_eq!(snap.peers_live, 1);
        assert_eq!(snap.peers_cached, 0);
        assert_eq!(snap.peers_sample, 2);
        assert_eq!(snap.status, "operational");
    }
}
