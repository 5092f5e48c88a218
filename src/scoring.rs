//! Lead scoring
//!
//! A pure, deterministic function from raw lead attributes (title, company
//! size, industry) to a bounded score. Used at discovery time; the score is
//! immutable once a lead is stored.

use serde::{Deserialize, Serialize};

/// Criteria used to score a lead.
///
/// Each list is matched case-insensitively as a substring; only the first
/// hit in each category counts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringCriteria {
    /// Title keywords worth a flat bonus (first match only)
    #[serde(default = "default_title_keywords")]
    pub title_keywords: Vec<String>,

    /// Company-size token → bonus (first matching token wins)
    #[serde(default = "default_size_bonus")]
    pub size_bonus: Vec<(String, f64)>,

    /// Industry tokens worth a flat bonus (first match only)
    #[serde(default = "default_industry_match")]
    pub industry_match: Vec<String>,
}

fn default_title_keywords() -> Vec<String> {
    ["ceo", "cto", "vp", "director", "manager", "head"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_size_bonus() -> Vec<(String, f64)> {
    vec![
        ("startup".to_string(), 5.0),
        ("enterprise".to_string(), 10.0),
        ("mid-market".to_string(), 8.0),
    ]
}

fn default_industry_match() -> Vec<String> {
    ["saas", "technology", "software", "fintech"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for ScoringCriteria {
    fn default() -> Self {
        Self {
            title_keywords: default_title_keywords(),
            size_bonus: default_size_bonus(),
            industry_match: default_industry_match(),
        }
    }
}

/// Base score every lead starts from.
const BASE_SCORE: f64 = 5.0;
/// Bonus for a title keyword hit.
const TITLE_BONUS: f64 = 2.0;
/// Bonus for an industry match.
const INDUSTRY_BONUS: f64 = 3.0;
/// Scores are capped here; the base guarantees the floor.
const MAX_SCORE: f64 = 10.0;

impl ScoringCriteria {
    /// Score a lead from its raw attributes. Always in `[0.0, 10.0]`.
    pub fn score(&self, title: &str, company_size: &str, industry: &str) -> f64 {
        let mut score = BASE_SCORE;

        let title = title.to_lowercase();
        if self.title_keywords.iter().any(|k| title.contains(k.as_str())) {
            score += TITLE_BONUS;
        }

        let company_size = company_size.to_lowercase();
        for (token, bonus) in &self.size_bonus {
            if company_size.contains(token.as_str()) {
                score += bonus;
                break;
            }
        }

        let industry = industry.to_lowercase();
        if self
            .industry_match
            .iter()
            .any(|m| industry.contains(m.as_str()))
        {
            score += INDUSTRY_BONUS;
        }

        score.min(MAX_SCORE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_score_for_unmatched_attributes() {
        let criteria = ScoringCriteria::default();
        assert_eq!(criteria.score("Intern", "unknown", "agriculture"), 5.0);
    }

    #[test]
    fn test_title_bonus_not_cumulative() {
        let criteria = ScoringCriteria::default();
        // "CEO" and "head" both match but only one bonus applies
        assert_eq!(criteria.score("CEO and Head of Sales", "", ""), 7.0);
    }

    #[test]
    fn test_case_insensitive() {
        let criteria = ScoringCriteria::default();
        assert_eq!(
            criteria.score("CTO", "STARTUP", "SaaS"),
            criteria.score("cto", "startup", "saas"),
        );
    }

    #[test]
    fn test_clamped_to_max() {
        let criteria = ScoringCriteria::default();
        // 5.0 + 2.0 + 10.0 + 3.0 would be 20 without the cap
        let score = criteria.score("CEO", "enterprise", "fintech");
        assert_eq!(score, 10.0);
    }

    #[test]
    fn test_bounded_and_deterministic() {
        let criteria = ScoringCriteria::default();
        let inputs = [
            ("CEO", "startup", "saas"),
            ("VP Engineering", "mid-market", "software"),
            ("", "", ""),
            ("Analyst", "enterprise", "retail"),
        ];
        for (title, size, industry) in inputs {
            let a = criteria.score(title, size, industry);
            let b = criteria.score(title, size, industry);
            assert_eq!(a, b);
            assert!((0.0..=10.0).contains(&a));
        }
    }

    #[test]
    fn test_any_size_token_caps_the_score() {
        let criteria = ScoringCriteria::default();
        for size in ["startup", "enterprise", "mid-market"] {
            assert_eq!(criteria.score("", size, ""), 10.0);
        }
    }
}
