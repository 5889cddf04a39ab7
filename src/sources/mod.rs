// =============================================================================
// sources/mod.rs — WHERE THE HEADLINES COME FROM
// =============================================================================
//
// A news source answers one question: "what articles mention this peer,
// in this language, since this date?" The live answer comes from NewsAPI;
// the fallback answer is deterministic sample data built in `sample`.
//
// The trait exists so the scanner never knows (or cares) whether it is
// talking to the real wire or to a scripted stand-in in a test.
// =============================================================================

pub mod newsapi;
pub mod sample;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Article, PeerQuery};

pub use newsapi::NewsApiClient;

/// Everything that can go wrong fetching one peer's coverage. None of these
/// ever reach the caller; they decide which fallback a peer gets.
#[derive(Debug, Error)]
pub enum NewsError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("timed out after {0} ms")]
    Timeout(u128),

    #[error("upstream returned HTTP {0}")]
    Status(u16),

    #[error("upstream error {code}: {message}")]
    Api { code: String, message: String },

    #[error("could not decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("circuit breaker is open")]
    CircuitOpen,
}

impl NewsError {
    /// Whether the call ran out of time, either on our own deadline or on
    /// the HTTP client's.
    pub fn is_timeout(&self) -> bool {
        match self {
            NewsError::Timeout(_) => true,
            NewsError::Transport(e) => e.is_timeout(),
            _ => false,
        }
    }
}

#[async_trait]
pub trait NewsSource: Send + Sync {
    /// Short name for logs and metrics.
    fn name(&self) -> &str;

    /// All articles the source returns for `query`, unfiltered.
    async fn search(&self, query: &PeerQuery) -> Result<Vec<Article>, NewsError>;
}
