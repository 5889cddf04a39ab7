// =============================================================================
// sources/sample.rs — PLACEHOLDER COVERAGE
// =============================================================================
//
// Deterministic sample records, used when there is no API key or when a
// peer's live fetch fails and nothing is cached for it.
//
// Sample records keep the report well-formed: every peer still gets a
// summary, a mention count and one citation. They are always stamped
// `Provenance::Sample` so nobody mistakes them for coverage.
// =============================================================================

use chrono::{DateTime, SecondsFormat, Utc};

use crate::models::{Citation, CompetitorSummary, Provenance};
use crate::text_scanner;

const SAMPLE_SOURCE: &str = "ExampleSource";
const SAMPLE_URL: &str = "https://example.com";

/// Mention count for the peer at `index` in the scanned list.
pub fn sample_mentions(index: usize) -> usize {
    5 + ((index * 3) % 7)
}

/// The sample record for the peer at `index` in the scanned list.
/// `generated_at` stamps the placeholder citation.
pub fn sample_record(
    peer: &str,
    index: usize,
    category: &str,
    generated_at: DateTime<Utc>,
) -> CompetitorSummary {
    let titles = [
        format!("{peer} announces new cleanser"),
        format!("{peer} partners with major retailer"),
        format!("{peer} sustainability update gains press"),
    ];

    CompetitorSummary {
        name: peer.to_string(),
        mentions: sample_mentions(index),
        summary: text_scanner::synthesize(peer, category, &titles),
        citations: vec![Citation {
            title: format!("{peer} launches new product"),
            source: Some(SAMPLE_SOURCE.to_string()),
            url: Some(SAMPLE_URL.to_string()),
            published_at: Some(generated_at.to_rfc3339_opts(SecondsFormat::Millis, true)),
        }],
        provenance: Provenance::Sample,
    }
}
