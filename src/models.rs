// =============================================================================
// models.rs — THE SHAPES OF A COMPETITOR REPORT
// =============================================================================
//
// Everything that crosses a boundary lives here: the query parameters coming
// in, the NewsAPI payload coming back, and the report going out. None of it
// is persisted; a report lives exactly as long as the request that built it.
// =============================================================================

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_BRAND: &str = "The Ordinary";
pub const DEFAULT_REGION: &str = "EU";
pub const DEFAULT_CATEGORY: &str = "skincare";

/// Region codes whose coverage we request in Spanish.
const SPANISH_REGIONS: &[&str] = &["ES", "PT", "BR", "MX"];

// =============================================================================
// Inbound
// =============================================================================

/// Raw query string of `GET /api/competitor-scan`. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScanParams {
    pub brand: Option<String>,
    pub region: Option<String>,
    pub category: Option<String>,
}

/// A normalized scan request: defaults applied, region upper-cased,
/// category lower-cased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanRequest {
    pub brand: String,
    pub region: String,
    pub category: String,
}

impl ScanRequest {
    pub fn language(&self) -> Language {
        Language::for_region(&self.region)
    }
}

impl From<ScanParams> for ScanRequest {
    fn from(params: ScanParams) -> Self {
        // An empty value is as good as a missing one.
        fn or_default(value: Option<String>, default: &str) -> String {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        }

        Self {
            brand: or_default(params.brand, DEFAULT_BRAND),
            region: or_default(params.region, DEFAULT_REGION).to_uppercase(),
            category: or_default(params.category, DEFAULT_CATEGORY).to_lowercase(),
        }
    }
}

/// The language we ask the news API for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    Es,
}

impl Language {
    pub fn for_region(region: &str) -> Self {
        if SPANISH_REGIONS.contains(&region) {
            Language::Es
        } else {
            Language::En
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Es => "es",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Everything a news source needs to run one peer query.
#[derive(Debug, Clone)]
pub struct PeerQuery {
    pub peer: String,
    pub from: NaiveDate,
    pub language: Language,
    pub page_size: u32,
}

// =============================================================================
// NewsAPI payload
// =============================================================================

/// Body of `GET /v2/everything`. On failure NewsAPI answers with
/// `status: "error"` plus `code`/`message` and no articles.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsApiResponse {
    pub status: Option<String>,
    pub total_results: Option<u64>,
    #[serde(default)]
    pub articles: Vec<Article>,
    pub code: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ArticleSource {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub title: Option<String>,
    pub source: Option<ArticleSource>,
    pub url: Option<String>,
    pub published_at: Option<String>,
}

impl Article {
    /// Only articles with an actual headline count as mentions.
    pub fn has_title(&self) -> bool {
        self.title.as_deref().is_some_and(|t| !t.is_empty())
    }
}

// =============================================================================
// Outbound report
// =============================================================================

/// A news article surfaced to the caller as evidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Citation {
    pub title: String,
    pub source: Option<String>,
    pub url: Option<String>,
    pub published_at: Option<String>,
}

impl From<&Article> for Citation {
    fn from(article: &Article) -> Self {
        Self {
            title: article.title.clone().unwrap_or_default(),
            source: article.source.as_ref().and_then(|s| s.name.clone()),
            url: article.url.clone(),
            published_at: article.published_at.clone(),
        }
    }
}

/// Keyword-derived summary of a competitor's recent headlines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Synthesis {
    pub short: String,
    pub positioning: String,
    pub strengths: Vec<String>,
    pub differentiators: Vec<String>,
    pub highlights: Vec<String>,
}

/// Where a competitor record came from. Synthetic data is never passed off
/// as live coverage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provenance {
    /// Fetched from the news API during this scan.
    Live,
    /// The last live record for this peer, reused because this fetch failed.
    Cached,
    /// Deterministic placeholder data.
    Sample,
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provenance::Live => write!(f, "live"),
            Provenance::Cached => write!(f, "cached"),
            Provenance::Sample => write!(f, "sample"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetitorSummary {
    pub name: String,
    pub mentions: usize,
    pub summary: Synthesis,
    pub citations: Vec<Citation>,
    pub provenance: Provenance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    None,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub text: String,
    pub next_steps: Vec<String>,
    pub risk: RiskLevel,
}

/// Overall data origin of a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    /// Every competitor came back live.
    #[serde(rename = "newsapi")]
    NewsApi,
    /// Live lookups were attempted and at least one peer fell back, or
    /// every peer was served from the cache.
    Mixed,
    /// Nothing but sample records (no API key, or nothing live or cached).
    Sample,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportMeta {
    pub scan_id: String,
    pub generated_at: DateTime<Utc>,
    pub source: DataSource,
    pub language: Language,
    pub from: NaiveDate,
    pub fallback_peers: Vec<String>,
}

/// The full response body of a competitor scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanReport {
    pub brand: String,
    pub region: String,
    pub category: String,
    pub competitors: Vec<CompetitorSummary>,
    pub recommendation: Recommendation,
    pub meta: ReportMeta,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_defaults_and_normalization() {
        let req = ScanRequest::from(ScanParams {
            brand: None,
            region: Some("es".into()),
            category: Some("SkinCare".into()),
        });
        assert_eq!(req.brand, "The Ordinary");
        assert_eq!(req.region, "ES");
        assert_eq!(req.category, "skincare");
        assert_eq!(req.language(), Language::Es);
    }

    #[test]
    fn test_empty_params_fall_back_to_defaults() {
        let req = ScanRequest::from(ScanParams {
            brand: Some(String::new()),
            region: Some("  ".into()),
            category: None,
        });
        assert_eq!(req.brand, DEFAULT_BRAND);
        assert_eq!(req.region, DEFAULT_REGION);
        assert_eq!(req.language(), Language::En);
    }

    #[test]
    fn test_language_by_region() {
        for region in ["ES", "PT", "BR", "MX"] {
            assert_eq!(Language::for_region(region), Language::Es);
        }
        assert_eq!(Language::for_region("EU"), Language::En);
        assert_eq!(Language::for_region("US"), Language::En);
    }

    #[test]
    fn test_newsapi_payload_parses() {
        let body = r#"{
            "status": "ok",
            "totalResults": 2,
            "articles": [
                {"source": {"id": null, "name": "Allure"}, "title": "CeraVe wins award",
                 "url": "https://a.example/1", "publishedAt": "2026-10-01T10:00:00Z"},
                {"source": {"id": null, "name": "Vogue"}, "title": null,
                 "url": "https://a.example/2", "publishedAt": "2026-10-02T10:00:00Z"}
            ]
        }"#;
        let parsed: NewsApiResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.total_results, Some(2));
        assert!(parsed.articles[0].has_title());
        assert!(!parsed.articles[1].has_title());

        let citation = Citation::from(&parsed.articles[0]);
        assert_eq!(citation.source.as_deref(), Some("Allure"));
        assert_eq!(citation.published_at.as_deref(), Some("2026-10-01T10:00:00Z"));
    }

    #[test]
    fn test_enums_serialize_lowercase() {
        assert_eq!(serde_json::to_string(&RiskLevel::None).unwrap(), "\"none\"");
        assert_eq!(serde_json::to_string(&DataSource::NewsApi).unwrap(), "\"newsapi\"");
        assert_eq!(serde_json::to_string(&Provenance::Cached).unwrap(), "\"cached\"");
        assert_eq!(serde_json::to_string(&Language::Es).unwrap(), "\"es\"");
    }
}
