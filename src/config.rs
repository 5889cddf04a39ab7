// =============================================================================
// config.rs — THE CONTROL ROOM
// =============================================================================
//
// Every knob the scan engine has lives here. All values come from the
// environment (with `.env` support via dotenvy), and every single one has a
// default, so the engine boots with zero configuration and serves sample
// data until somebody hands it a NewsAPI key.
//
// Defaults follow the behaviour the front-end was built against: six peers,
// a thirty-day lookback, ten articles per peer, three citations each, and a
// seven-second leash on every outbound call.
// =============================================================================

use std::env;
use std::time::Duration;

/// Prefix for every engine-specific environment variable.
const ENV_PREFIX: &str = "COMPETITOR_SCAN_";

/// The one secret we need. Kept unprefixed because every NewsAPI tutorial
/// on earth already tells people to export it under this name.
const NEWS_API_KEY_VAR: &str = "NEWS_API_KEY";

/// Upper bound on the lookback window. NewsAPI only keeps about a month of
/// articles on most plans anyway.
pub const MAX_LOOKBACK_DAYS: i64 = 3650;

/// All tunables for the engine, loaded once at startup and shared behind an
/// `Arc` by the server and the scanner.
#[derive(Debug, Clone)]
pub struct Config {
    // =========================================================================
    // SERVER
    // =========================================================================

    /// Socket address the HTTP server binds to.
    pub bind_addr: String,

    /// Emit logs as JSON lines instead of the human-readable format.
    pub log_json: bool,

    // =========================================================================
    // NEWS API
    // =========================================================================

    /// NewsAPI key. `None` means sample mode: no outbound calls at all, every
    /// peer gets its deterministic sample record.
    pub news_api_key: Option<String>,

    /// Base URL of the NewsAPI v2 endpoints (the `/everything` path is
    /// appended to it).
    pub news_api_base_url: String,

    /// Per-peer time budget. A call that has not settled by then is abandoned
    /// and the peer falls back.
    pub fetch_timeout: Duration,

    /// `pageSize` sent upstream; also the ceiling on `mentions` per peer.
    pub page_size: u32,

    /// How far back the news search looks, in days, within
    /// `0..=MAX_LOOKBACK_DAYS`.
    pub lookback_days: i64,

    // =========================================================================
    // REPORT SHAPE
    // =========================================================================

    /// How many catalog peers are actually queried per scan.
    pub max_peers: usize,

    /// How many ranked competitors make it into the report.
    pub top_n: usize,

    /// Citations kept per competitor.
    pub citation_limit: usize,

    /// Below this many total citations, the recommendation is `medium` risk.
    pub risk_citation_threshold: usize,

    // =========================================================================
    // RESILIENCE
    // =========================================================================

    /// Capacity of the last-known-good peer cache.
    pub peer_cache_size: usize,

    /// Consecutive news API failures before the breaker opens.
    pub circuit_breaker_failure_threshold: u32,

    /// How long the breaker stays open before a trial request.
    pub circuit_breaker_reset_timeout: Duration,

    /// Successes needed in half-open state before the breaker closes.
    pub circuit_breaker_success_threshold: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl Config {
    /// Load configuration from the process environment, after pulling in a
    /// `.env` file if one is lying around.
    pub fn from_env() -> Self {
        // Missing .env is the normal case in production.
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup. `from_env` is this with
    /// `std::env::var`; tests feed it a map instead of mutating the process
    /// environment.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str, default: &str| -> String {
            lookup(&format!("{ENV_PREFIX}{name}")).unwrap_or_else(|| default.to_string())
        };

        let news_api_key = lookup(NEWS_API_KEY_VAR)
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());

        Config {
            bind_addr: get("BIND_ADDR", "0.0.0.0:8080"),
            log_json: parse_bool(&get("LOG_JSON", "false")),

            news_api_key,
            news_api_base_url: get("NEWS_API_BASE_URL", "https://newsapi.org/v2")
                .trim_end_matches('/')
                .to_string(),
            fetch_timeout: Duration::from_millis(
                get("FETCH_TIMEOUT_MS", "7000").parse().unwrap_or(7000),
            ),
            page_size: get("PAGE_SIZE", "10").parse().unwrap_or(10),
            lookback_days: get("LOOKBACK_DAYS", "30")
                .parse::<i64>()
                .unwrap_or(30)
                .clamp(0, MAX_LOOKBACK_DAYS),

            max_peers: get("MAX_PEERS", "6").parse().unwrap_or(6),
            top_n: get("TOP_N", "6").parse().unwrap_or(6),
            citation_limit: get("CITATION_LIMIT", "3").parse().unwrap_or(3),
            risk_citation_threshold: get("RISK_CITATION_THRESHOLD", "4").parse().unwrap_or(4),

            peer_cache_size: get("PEER_CACHE_SIZE", "256").parse().unwrap_or(256),
            circuit_breaker_failure_threshold: get("CB_FAILURE_THRESHOLD", "5")
                .parse()
                .unwrap_or(5),
            circuit_breaker_reset_timeout: Duration::from_secs(
                get("CB_RESET_TIMEOUT_SECS", "60").parse().unwrap_or(60),
            ),
            circuit_breaker_success_threshold: get("CB_SUCCESS_THRESHOLD", "2")
                .parse()
                .unwrap_or(2),
        }
    }

    /// Whether live news lookups are possible at all.
    pub fn has_news_api_key(&self) -> bool {
        self.news_api_key.is_some()
    }
}

fn parse_bool(raw: &str) -> bool {
    matches!(raw.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Config {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|k| map.get(k).cloned())
    }

    #[test]
    fn test_defaults_without_environment() {
        let config = Config::default();
        assert_eq!(config.bind_addr, "0.0.0.0:8080");
        assert_eq!(config.fetch_timeout, Duration::from_millis(7000));
        assert_eq!(config.max_peers, 6);
        assert_eq!(config.top_n, 6);
        assert_eq!(config.lookback_days, 30);
        assert_eq!(config.page_size, 10);
        assert_eq!(config.citation_limit, 3);
        assert_eq!(config.risk_citation_threshold, 4);
        assert!(!config.has_news_api_key());
        assert!(!config.log_json);
    }

    #[test]
    fn test_overrides_and_unparsable_values() {
        let config = config_from(&[
            ("NEWS_API_KEY", "abc123"),
            ("COMPETITOR_SCAN_MAX_PEERS", "3"),
            ("COMPETITOR_SCAN_FETCH_TIMEOUT_MS", "not-a-number"),
            ("COMPETITOR_SCAN_NEWS_API_BASE_URL", "http://localhost:9999/v2/"),
            ("COMPETITOR_SCAN_LOG_JSON", "TRUE"),
        ]);
        assert_eq!(config.news_api_key.as_deref(), Some("abc123"));
        assert_eq!(config.max_peers, 3);
        assert_eq!(config.fetch_timeout, Duration::from_millis(7000));
        assert_eq!(config.news_api_base_url, "http://localhost:9999/v2");
        assert!(config.log_json);
    }

    #[test]
    fn test_lookback_is_clamped() {
        let config = config_from(&[("COMPETITOR_SCAN_LOOKBACK_DAYS", "9223372036854775807")]);
        assert_eq!(config.lookback_days, MAX_LOOKBACK_DAYS);
        // Must not overflow chrono's date arithmetic.
        let _ = chrono::Utc::now() - chrono::Duration::days(config.lookback_days);

        let config = config_from(&[("COMPETITOR_SCAN_LOOKBACK_DAYS", "-5")]);
        assert_eq!(config.lookback_days, 0);
    }

    #[test]
    fn test_blank_api_key_means_sample_mode() {
        let config = config_from(&[("NEWS_API_KEY", "   ")]);
        assert!(!config.has_news_api_key());
    }
}
