// =============================================================================
// sources/newsapi.rs — ASKING THE NEWS WIRE ABOUT THE NEIGHBOURS
// =============================================================================
//
// Real API: https://newsapi.org/v2/everything
// Docs:     https://newsapi.org/docs/endpoints/everything
//
// One GET per peer:
//
//   /everything?q=<peer>&from=<yyyy-mm-dd>&language=<en|es>
//              &sortBy=popularity&pageSize=<n>
//
// The key travels in the `X-Api-Key` header instead of the `apiKey` query
// parameter, so request URLs can be logged without leaking it.
//
// NewsAPI reports most failures twice: once as an HTTP status and once as a
// `{"status": "error", "code": ..., "message": ...}` body. We read the body
// when there is one, because "rateLimited" is a lot more useful in a log
// line than "429".
// =============================================================================

use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

use super::{NewsError, NewsSource};
use crate::models::{Article, NewsApiResponse, PeerQuery};

const USER_AGENT: &str = "CompetitorScanEngine/0.1 (+https://github.com/competitor-scan/engine)";

pub struct NewsApiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl NewsApiClient {
    /// Build a client with the per-request timeout baked in.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, NewsError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    /// The `/everything` URL for one peer query. Contains no secrets.
    pub fn search_url(&self, query: &PeerQuery) -> String {
        format!(
            "{}/everything?q={}&from={}&language={}&sortBy=popularity&pageSize={}",
            self.base_url,
            urlencoding::encode(&query.peer),
            query.from.format("%Y-%m-%d"),
            query.language.code(),
            query.page_size,
        )
    }
}

#[async_trait]
impl NewsSource for NewsApiClient {
    fn name(&self) -> &str {
        "newsapi"
    }

    async fn search(&self, query: &PeerQuery) -> Result<Vec<Article>, NewsError> {
        let url = self.search_url(query);
        debug!(peer = query.peer.as_str(), url = url.as_str(), "NewsAPI: querying");

        let response = self
            .client
            .get(&url)
            .header("X-Api-Key", &self.api_key)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        let parsed = serde_json::from_str::<NewsApiResponse>(&body);

        // An error body explains more than the status code does.
        if let Ok(NewsApiResponse {
            status: Some(s),
            code,
            message,
            ..
        }) = &parsed
        {
            if s == "error" {
                return Err(NewsError::Api {
                    code: code.clone().unwrap_or_else(|| status.as_u16().to_string()),
                    message: message.clone().unwrap_or_default(),
                });
            }
        }

        if !status.is_success() {
            return Err(NewsError::Status(status.as_u16()));
        }

        let parsed = parsed?;
        debug!(
            peer = query.peer.as_str(),
            total_results = parsed.total_results.unwrap_or(0),
            returned = parsed.articles.len(),
            "NewsAPI: response received"
        );

        Ok(parsed.articles)
    }
}
