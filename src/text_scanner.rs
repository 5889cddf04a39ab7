// =============================================================================
// text_scanner.rs — HEADLINES IN, POSITIONING OUT
// =============================================================================
//
// This is where a pile of headlines turns into something a brand manager can
// read: a list of strengths, a list of differentiators, a one-line summary
// and a handful of highlight titles.
//
// The rules are plain keyword rules. Each rule owns a label and a handful of
// keywords; if ANY keyword shows up ANYWHERE in the headlines, the label is
// added once. Matching is substring matching with no word boundaries, so
// "ai" fires inside "retail" and "new" fires inside "renewal". Downstream
// consumers are calibrated against exactly that behaviour.
//
// All keywords of a rule table are compiled into a single Aho-Corasick
// automaton and scanned with overlapping matches, so one pass over the text
// finds every rule that fires no matter how the keywords overlap.
// =============================================================================

use aho_corasick::AhoCorasick;
use std::sync::LazyLock;
use tracing::debug;

use crate::models::Synthesis;

/// Headline separator used when joining titles for scanning.
const TITLE_SEPARATOR: &str = " • ";

/// How many titles become highlights.
const HIGHLIGHT_LIMIT: usize = 3;

/// A label plus the keywords that trigger it.
type Rule = (&'static str, &'static [&'static str]);

const STRENGTH_RULES: &[Rule] = &[
    ("Brand momentum", &["award", "bestseller"]),
    ("Active product launches", &["launch", "new"]),
    ("Partnership activity", &["partnership", "collab"]),
    ("Sustainability narrative", &["sustainab", "eco"]),
    ("Retail distribution updates", &["retail", "store"]),
    ("Growth signals", &["growth", "revenue"]),
];

const DIFFERENTIATOR_RULES: &[Rule] = &[
    ("Actives-led positioning", &["vitamin c", "retinol", "niacinamide"]),
    ("Wellness/clinic crossover", &["spa", "clinic"]),
    ("Personalization/tech angle", &["ai", "personalized"]),
];

/// A compiled rule table: one automaton over every keyword, plus a map from
/// automaton pattern id back to the rule that owns it.
struct RuleSet {
    rules: &'static [Rule],
    automaton: AhoCorasick,
    owner: Vec<usize>,
}

impl RuleSet {
    fn compile(rules: &'static [Rule]) -> Self {
        let mut patterns = Vec::new();
        let mut owner = Vec::new();
        for (idx, (_, keywords)) in rules.iter().enumerate() {
            for keyword in keywords.iter() {
                patterns.push(*keyword);
                owner.push(idx);
            }
        }

        let automaton = AhoCorasick::builder()
            .ascii_case_insensitive(true)
            .build(&patterns)
            .expect("keyword rule tables are static and always compile");

        Self { rules, automaton, owner }
    }

    /// Labels of every rule that fires on `text`, in rule-table order.
    fn labels(&self, text: &str) -> Vec<String> {
        let mut fired = vec![false; self.rules.len()];
        for m in self.automaton.find_overlapping_iter(text) {
            fired[self.owner[m.pattern().as_usize()]] = true;
        }

        self.rules
            .iter()
            .zip(fired)
            .filter(|(_, hit)| *hit)
            .map(|((label, _), _)| label.to_string())
            .collect()
    }
}

static STRENGTHS: LazyLock<RuleSet> = LazyLock::new(|| RuleSet::compile(STRENGTH_RULES));
static DIFFERENTIATORS: LazyLock<RuleSet> =
    LazyLock::new(|| RuleSet::compile(DIFFERENTIATOR_RULES));

/// Summarize a peer's headlines.
///
/// Pure and deterministic: the same peer, category and titles always give
/// the same synthesis. `category` only feeds the fallback positioning line.
pub fn synthesize<S: AsRef<str>>(peer: &str, category: &str, titles: &[S]) -> Synthesis {
    let corpus = titles
        .iter()
        .map(|t| t.as_ref().to_lowercase())
        .collect::<Vec<_>>()
        .join(TITLE_SEPARATOR);

    let strengths = STRENGTHS.labels(&corpus);
    let differentiators = DIFFERENTIATORS.labels(&corpus);

    let highlights = titles
        .iter()
        .take(HIGHLIGHT_LIMIT)
        .map(|t| t.as_ref().to_string())
        .collect();

    let short = match strengths.first() {
        Some(lead) => format!("{peer} shows {} in recent coverage.", lead.to_lowercase()),
        None => format!("{peer} has steady coverage this period."),
    };

    let positioning = differentiators
        .first()
        .cloned()
        .unwrap_or_else(|| format!("General DTC {category} positioning"));

    debug!(
        peer = peer,
        titles = titles.len(),
        strengths = strengths.len(),
        differentiators = differentiators.len(),
        "Headline synthesis complete"
    );

    Synthesis {
        short,
        positioning,
        strengths,
        differentiators,
        highlights,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_award_and_launch_titles() {
        let s = synthesize("X", "skincare", &["X wins award", "X launches new serum"]);
        assert!(s.strengths.contains(&"Brand momentum".to_string()));
        assert!(s.strengths.contains(&"Active product launches".to_string()));
        assert_eq!(s.short, "X shows brand momentum in recent coverage.");
    }

    #[test]
    fn test_no_titles_gives_steady_coverage() {
        let s = synthesize::<&str>("CeraVe", "skincare", &[]);
        assert!(s.strengths.is_empty());
        assert!(s.differentiators.is_empty());
        assert!(s.highlights.is_empty());
        assert_eq!(s.short, "CeraVe has steady coverage this period.");
        assert_eq!(s.positioning, "General DTC skincare positioning");
    }

    #[test]
    fn test_labels_follow_rule_order_not_title_order() {
        let s = synthesize(
            "Bioderma",
            "skincare",
            &["Bioderma revenue climbs", "Bioderma eco refill", "Bioderma wins award"],
        );
        assert_eq!(
            s.strengths,
            vec!["Brand momentum", "Sustainability narrative", "Growth signals"]
        );
    }

    #[test]
    fn test_each_label_added_once() {
        let s = synthesize("Avene", "skincare", &["new launch", "another new launch"]);
        assert_eq!(s.strengths, vec!["Active product launches"]);
    }

    #[test]
    fn test_differentiators_and_positioning() {
        let s = synthesize(
            "La Roche-Posay",
            "skincare",
            &["Retinol serum review", "Dermatology clinic partners"],
        );
        assert_eq!(
            s.differentiators,
            vec!["Actives-led positioning", "Wellness/clinic crossover"]
        );
        assert_eq!(s.positioning, "Actives-led positioning");
    }

    #[test]
    fn test_substring_matching_has_no_word_boundaries() {
        // "retail" contains "ai"
        let s = synthesize("Eucerin", "skincare", &["Eucerin expands retail"]);
        assert!(s.strengths.contains(&"Retail distribution updates".to_string()));
        assert!(s.differentiators.contains(&"Personalization/tech angle".to_string()));
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        let s = synthesize("CeraVe", "skincare", &["CERAVE NIACINAMIDE BESTSELLER"]);
        assert_eq!(s.strengths, vec!["Brand momentum"]);
        assert_eq!(s.differentiators, vec!["Actives-led positioning"]);
    }

    #[test]
    fn test_highlights_capped_at_three_in_order() {
        let titles = ["one", "two", "three", "four"];
        let s = synthesize("P", "skincare", &titles);
        assert_eq!(s.highlights, vec!["one", "two", "three"]);
    }

    #[test]
    fn test_synthesis_is_deterministic() {
        let titles = vec![
            "CeraVe launches AI skin tool".to_string(),
            "CeraVe partnership with clinic chain".to_string(),
        ];
        let a = synthesize("CeraVe", "skincare", &titles);
        let b = synthesize("CeraVe", "skincare", &titles);
        assert_eq!(a, b);
    }

    #[test]
    fn test_keywords_do_not_span_titles() {
        let s = synthesize("P", "skincare", &["vitamin", "c is here"]);
        assert!(!s.differentiators.contains(&"Actives-led positioning".to_string()));
    }
}
