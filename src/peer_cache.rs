// =============================================================================
// peer_cache.rs — LAST KNOWN GOOD
// =============================================================================
//
// A bounded LRU of the most recent live record for each (peer, language).
// When a live fetch fails, the scan reaches for this before it reaches for
// sample data: yesterday's real headlines beat today's made-up ones.
//
// This is a fallback, not a cache in front of the API. Live fetches always
// go out; the cache only answers when they don't come back.
// =============================================================================

use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use tracing::debug;

use crate::models::{CompetitorSummary, Language, Provenance};

pub struct PeerCache {
    entries: Mutex<LruCache<(String, Language), CompetitorSummary>>,
}

impl PeerCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Remember a live record. Anything that isn't live is ignored, so a
    /// fallback can never overwrite real data.
    pub fn remember(&self, language: Language, record: &CompetitorSummary) {
        if record.provenance != Provenance::Live {
            return;
        }
        self.entries
            .lock()
            .put((record.name.to_lowercase(), language), record.clone());
    }

    /// The last live record for `peer`, re-stamped as cached.
    pub fn recall(&self, peer: &str, language: Language) -> Option<CompetitorSummary> {
        let key = (peer.to_lowercase(), language);
        let hit = self.entries.lock().get(&key).cloned();
        debug!(peer = peer, language = %language, hit = hit.is_some(), "Peer cache lookup");
        hit.map(|mut record| {
            record.provenance = Provenance::Cached;
            record
        })
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }
}
