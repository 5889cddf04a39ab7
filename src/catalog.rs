// =============================================================================
// catalog.rs — WHO COUNTS AS A PEER
// =============================================================================
//
// The peer catalog is a static, read-only map from category to an ordered
// list of brands. Order matters: it decides which peers make the cut when a
// scan is bounded, and it breaks ties when two peers have the same number of
// mentions.
// =============================================================================

use serde::Serialize;

/// Category key -> ordered peer list.
static PEER_CATALOG: &[(&str, &[&str])] = &[(
    "skincare",
    &[
        "The Ordinary",
        "CeraVe",
        "La Roche-Posay",
        "The INKEY List",
        "Paula’s Choice",
        "Bioderma",
        "Avene",
        "Eucerin",
    ],
)];

/// One catalog entry, as exposed on `GET /api/categories`.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryEntry {
    pub category: &'static str,
    pub peers: Vec<&'static str>,
}

/// Peers for a category key, in catalog order. Unknown categories have none.
pub fn peers_for(category: &str) -> &'static [&'static str] {
    PEER_CATALOG
        .iter()
        .find(|(key, _)| *key == category)
        .map(|(_, peers)| *peers)
        .unwrap_or(&[])
}

/// Resolve the competitors of `brand` in `category`: the catalog list with
/// the brand itself removed (case-insensitive).
pub fn resolve_peers(category: &str, brand: &str) -> Vec<String> {
    let brand = brand.to_lowercase();
    peers_for(category)
        .iter()
        .filter(|peer| peer.to_lowercase() != brand)
        .map(|peer| peer.to_string())
        .collect()
}

pub fn categories() -> Vec<CategoryEntry> {
    PEER_CATALOG
        .iter()
        .map(|(category, peers)| CategoryEntry {
            category: *category,
            peers: peers.to_vec(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_brand_is_excluded_case_insensitively() {
        let peers = resolve_peers("skincare", "the ordinary");
        assert_eq!(peers.len(), 7);
        assert!(!peers.iter().any(|p| p.eq_ignore_ascii_case("The Ordinary")));
        assert_eq!(peers[0], "CeraVe");
    }

    #[test]
    fn test_non_ascii_brand_is_excluded() {
        let peers = resolve_peers("skincare", "PAULA’S CHOICE");
        assert!(!peers.contains(&"Paula’s Choice".to_string()));
        assert_eq!(peers.len(), 7);
    }

    #[test]
    fn test_outside_brand_keeps_full_list_in_order() {
        let peers = resolve_peers("skincare", "Glossier");
        assert_eq!(peers, peers_for("skincare").to_vec());
    }

    #[test]
    fn test_unknown_category_has_no_peers() {
        assert!(resolve_peers("haircare", "The Ordinary").is_empty());
    }

    #[test]
    fn test_every_category_excludes_every_member() {
        for entry in categories() {
            for member in &entry.peers {
                let peers = resolve_peers(entry.category, &member.to_uppercase());
                assert!(!peers.iter().any(|p| p == member));
            }
        }
    }
}
