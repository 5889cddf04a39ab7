// =============================================================================
// recommendation.rs — SO WHAT DO WE DO ABOUT IT
// =============================================================================
//
// One paragraph, a few next steps, and a coarse risk level. The leader is
// whoever ranked first; the risk level says how much evidence backs the
// advice, measured as the total number of citations in the report.
// =============================================================================

use crate::models::{CompetitorSummary, Recommendation, RiskLevel};

/// Build the recommendation for an already-ranked competitor list.
///
/// `risk_threshold` is the citation count below which the advice is only
/// `medium` confidence.
pub fn recommend(ranked: &[CompetitorSummary], risk_threshold: usize) -> Recommendation {
    let Some(leader) = ranked.first().map(|c| c.name.as_str()) else {
        return Recommendation {
            text: "Coverage is low this month. Maintain plan and re-check next week.".to_string(),
            next_steps: vec!["Schedule auto re-run next Monday".to_string()],
            risk: RiskLevel::None,
        };
    };

    let total_citations: usize = ranked.iter().map(|c| c.citations.len()).sum();
    let risk = if total_citations < risk_threshold {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    };

    Recommendation {
        text: format!(
            "Momentum this month is led by {leader}. Compare pricing and landing copy; \
             ship one reactive post this week."
        ),
        next_steps: vec![
            format!("Add {leader} to watchlist and enable weekly alert"),
            "Review pricing/landing copy vs the top competitor".to_string(),
            "Publish one reactive post based on a cited article".to_string(),
        ],
        risk,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Citation, Provenance};
    use crate::text_scanner;

    fn competitor(name: &str, citations: usize) -> CompetitorSummary {
        CompetitorSummary {
            name: name.to_string(),
            mentions: citations,
            summary: text_scanner::synthesize::<&str>(name, "skincare", &[]),
            citations: (0..citations)
                .map(|i| Citation {
                    title: format!("{name} story {i}"),
                    source: None,
                    url: None,
                    published_at: None,
                })
                .collect(),
            provenance: Provenance::Live,
        }
    }

    #[test]
    fn test_no_competitors_means_no_risk_signal() {
        let rec = recommend(&[], 4);
        assert_eq!(rec.risk, RiskLevel::None);
        assert_eq!(rec.next_steps, vec!["Schedule auto re-run next Monday"]);
        assert!(rec.text.starts_with("Coverage is low"));
    }

    #[test]
    fn test_few_citations_is_medium_risk() {
        let ranked = vec![competitor("CeraVe", 2), competitor("Avene", 1)];
        let rec = recommend(&ranked, 4);
        assert_eq!(rec.risk, RiskLevel::Medium);
        assert!(rec.text.contains("led by CeraVe"));
        assert_eq!(rec.next_steps.len(), 3);
        assert_eq!(rec.next_steps[0], "Add CeraVe to watchlist and enable weekly alert");
    }

    #[test]
    fn test_threshold_citations_is_low_risk() {
        let ranked = vec![competitor("CeraVe", 3), competitor("Avene", 1)];
        assert_eq!(recommend(&ranked, 4).risk, RiskLevel::Low);
    }

    #[test]
    fn test_leader_without_citations_is_still_a_leader() {
        let rec = recommend(&[competitor("Eucerin", 0)], 4);
        assert_eq!(rec.risk, RiskLevel::Medium);
        assert!(rec.text.contains("Eucerin"));
    }
}
