// =============================================================================
// scan.rs — THE FAN-OUT
// =============================================================================
//
// One scan, start to finish:
//
// 1. Resolve the category's peers, minus the brand asking.
// 2. Query the news source for every peer at once, each call on its own
//    deadline. Nothing is shared between calls except the breaker, the
//    peer cache and the metrics counters, all of which are thread-safe.
// 3. Wait for every call to settle. A peer whose call failed, timed out or
//    was refused by the breaker gets its cached record, or failing that,
//    its sample record. A scan never fails because a peer did.
// 4. Rank by mentions (stable, so ties keep catalog order), cut to the top
//    N, and write the recommendation.
//
// Without an API key there is no source at all and step 2 is skipped:
// every peer gets its sample record and the report says so.
// =============================================================================

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::catalog;
use crate::circuit_breaker::{CircuitBreaker, CircuitBreakerSnapshot};
use crate::config::Config;
use crate::metrics::MetricsCollector;
use crate::models::{
    Article, Citation, CompetitorSummary, DataSource, Language, PeerQuery, Provenance,
    ReportMeta, ScanReport, ScanRequest,
};
use crate::peer_cache::PeerCache;
use crate::recommendation;
use crate::sources::{sample, NewsApiClient, NewsError, NewsSource};
use crate::text_scanner;

pub struct CompetitorScanner {
    config: Arc<Config>,
    source: Option<Arc<dyn NewsSource>>,
    breaker: CircuitBreaker,
    cache: PeerCache,
    metrics: Arc<MetricsCollector>,
}

/// Per-scan values every peer lookup needs.
struct ScanContext<'a> {
    category: &'a str,
    language: Language,
    from: chrono::NaiveDate,
    generated_at: DateTime<Utc>,
}

impl CompetitorScanner {
    pub fn new(
        config: Arc<Config>,
        source: Option<Arc<dyn NewsSource>>,
        metrics: Arc<MetricsCollector>,
    ) -> Self {
        let breaker = CircuitBreaker::new(
            source.as_ref().map(|s| s.name()).unwrap_or("sample"),
            config.circuit_breaker_failure_threshold,
            config.circuit_breaker_reset_timeout,
            config.circuit_breaker_success_threshold,
        );
        let cache = PeerCache::new(config.peer_cache_size);

        Self {
            config,
            source,
            breaker,
            cache,
            metrics,
        }
    }

    /// Wire up the live NewsAPI source if a key is configured; otherwise run
    /// in sample mode.
    pub fn from_config(
        config: Arc<Config>,
        metrics: Arc<MetricsCollector>,
    ) -> Result<Self, NewsError> {
        let source: Option<Arc<dyn NewsSource>> = match &config.news_api_key {
            Some(key) => Some(Arc::new(NewsApiClient::new(
                config.news_api_base_url.clone(),
                key.clone(),
                config.fetch_timeout,
            )?)),
            None => {
                warn!("NEWS_API_KEY is not set, every scan will return sample data");
                None
            }
        };
        Ok(Self::new(config, source, metrics))
    }

    /// Breaker state for `/metrics`; `None` in sample mode, where there is
    /// no upstream to guard.
    pub fn breaker_snapshot(&self) -> Option<CircuitBreakerSnapshot> {
        self.source.as_ref().map(|_| self.breaker.snapshot())
    }

    pub fn metrics(&self) -> &MetricsCollector {
        &self.metrics
    }

    /// Run one competitor scan. Never fails: every peer that cannot be
    /// fetched is filled in from the fallback chain.
    pub async fn scan(&self, request: &ScanRequest) -> ScanReport {
        let generated_at = Utc::now();
        let scan_id = Uuid::new_v4().to_string();
        let ctx = ScanContext {
            category: &request.category,
            language: request.language(),
            from: (generated_at - ChronoDuration::days(self.config.lookback_days)).date_naive(),
            generated_at,
        };

        let peers: Vec<String> = catalog::resolve_peers(&request.category, &request.brand)
            .into_iter()
            .take(self.config.max_peers)
            .collect();

        info!(
            scan_id = scan_id.as_str(),
            brand = request.brand.as_str(),
            region = request.region.as_str(),
            category = request.category.as_str(),
            language = %ctx.language,
            peers = peers.len(),
            live = self.source.is_some(),
            "Competitor scan started"
        );

        let mut records: Vec<CompetitorSummary> = match &self.source {
            Some(source) => {
                join_all(
                    peers
                        .iter()
                        .enumerate()
                        .map(|(index, peer)| self.scan_peer(source.as_ref(), peer, index, &ctx)),
                )
                .await
            }
            None => peers
                .iter()
                .enumerate()
                .map(|(index, peer)| {
                    sample::sample_record(peer, index, ctx.category, ctx.generated_at)
                })
                .collect(),
        };

        // Meta describes the records that made the cut, nothing else.
        rank(&mut records, self.config.top_n);
        let fallback_peers: Vec<String> = records
            .iter()
            .filter(|r| r.provenance != Provenance::Live)
            .map(|r| r.name.clone())
            .collect();
        let data_source = match &self.source {
            None => DataSource::Sample,
            Some(_) => data_source_for(&records),
        };

        for record in &records {
            self.metrics.record_provenance(record.provenance);
        }

        let recommendation =
            recommendation::recommend(&records, self.config.risk_citation_threshold);

        info!(
            scan_id = scan_id.as_str(),
            competitors = records.len(),
            fallbacks = fallback_peers.len(),
            leader = records.first().map(|r| r.name.as_str()).unwrap_or("-"),
            risk = ?recommendation.risk,
            "Competitor scan complete"
        );

        ScanReport {
            brand: request.brand.clone(),
            region: request.region.clone(),
            category: request.category.clone(),
            competitors: records,
            recommendation,
            meta: ReportMeta {
                scan_id,
                generated_at,
                source: data_source,
                language: ctx.language,
                from: ctx.from,
                fallback_peers,
            },
        }
    }

    /// One peer: live if possible, otherwise cached, otherwise sample.
    async fn scan_peer(
        &self,
        source: &dyn NewsSource,
        peer: &str,
        index: usize,
        ctx: &ScanContext<'_>,
    ) -> CompetitorSummary {
        let query = PeerQuery {
            peer: peer.to_string(),
            from: ctx.from,
            language: ctx.language,
            page_size: self.config.page_size,
        };

        match self.fetch_live(source, &query).await {
            Ok(articles) => {
                let record =
                    live_record(peer, ctx.category, &articles, self.config.citation_limit);
                self.cache.remember(ctx.language, &record);
                debug!(peer = peer, mentions = record.mentions, "Live coverage collected");
                record
            }
            Err(e) => {
                let record = self.cache.recall(peer, ctx.language).unwrap_or_else(|| {
                    sample::sample_record(peer, index, ctx.category, ctx.generated_at)
                });
                warn!(
                    peer = peer,
                    error = %e,
                    fallback = %record.provenance,
                    "Peer fetch failed, using fallback record"
                );
                record
            }
        }
    }

    /// Ask the source, on a deadline, with the breaker's permission.
    async fn fetch_live(
        &self,
        source: &dyn NewsSource,
        query: &PeerQuery,
    ) -> Result<Vec<Article>, NewsError> {
        if !self.breaker.allow_request() {
            self.metrics.increment_breaker_rejections();
            return Err(NewsError::CircuitOpen);
        }

        self.metrics.increment_peer_fetches();
        let timeout = self.config.fetch_timeout;
        let result = match tokio::time::timeout(timeout, source.search(query)).await {
            Ok(result) => result,
            Err(_) => Err(NewsError::Timeout(timeout.as_millis())),
        };

        match &result {
            Ok(_) => self.breaker.record_success(),
            Err(e) => {
                self.breaker.record_failure();
                self.metrics.increment_peer_failures();
                if e.is_timeout() {
                    self.metrics.increment_peer_timeouts();
                }
            }
        }

        result
    }
}

/// Turn a live article list into a competitor record. Untitled articles are
/// not mentions.
pub fn live_record(
    peer: &str,
    category: &str,
    articles: &[Article],
    citation_limit: usize,
) -> CompetitorSummary {
    let kept: Vec<&Article> = articles.iter().filter(|a| a.has_title()).collect();
    let titles: Vec<&str> = kept.iter().filter_map(|a| a.title.as_deref()).collect();

    CompetitorSummary {
        name: peer.to_string(),
        mentions: kept.len(),
        summary: text_scanner::synthesize(peer, category, &titles),
        citations: kept
            .iter()
            .take(citation_limit)
            .map(|a| Citation::from(*a))
            .collect(),
        provenance: Provenance::Live,
    }
}

/// Sort by mentions, most first, keeping catalog order on ties, then cut.
pub fn rank(records: &mut Vec<CompetitorSummary>, top_n: usize) {
    records.sort_by(|a, b| b.mentions.cmp(&a.mentions));
    records.truncate(top_n);
}

fn data_source_for(records: &[CompetitorSummary]) -> DataSource {
    if records.iter().all(|r| r.provenance == Provenance::Live) {
        DataSource::NewsApi
    } else if records.iter().all(|r| r.provenance == Provenance::Sample) {
        DataSource::Sample
    } else {
        DataSource::Mixed
    }
}
