//! Lexical normalization of free-text inputs
//!
//! Job titles resolve to a canonical job category; education text resolves
//! directly to an [`EducationFactor`]. Both use the same strategy:
//!
//! 1. Lowercase + trim
//! 2. Exact table hit
//! 3. Substring fuzzy match in table order (input contains key, or key
//!    contains input); first match wins
//! 4. Fallback (never an error)

use tracing::debug;

use crate::factors::{EducationFactor, EDUCATION_HIT_CONFIDENCE};
use crate::rules::{normalize_key, Rules};

/// How a job title was resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleMatch {
    Exact,
    Fuzzy,
    /// No table entry matched; the raw title is used as the category
    Unmatched,
}

/// Result of job title normalization
#[derive(Debug, Clone, PartialEq)]
pub struct JobCategory {
    pub name: String,
    pub matched: TitleMatch,
}

impl JobCategory {
    /// True when the category came from the mapping table
    pub fn is_known(&self) -> bool {
        self.matched != TitleMatch::Unmatched
    }
}

/// Map a raw job title to its canonical category
///
/// Unmatched titles are returned trimmed but otherwise as typed; benchmark
/// resolution handles the unknown category through its fallback tiers.
pub fn normalize_job_title(rules: &Rules, raw: &str) -> JobCategory {
    let normalized = normalize_key(raw);

    if let Some(entry) = rules.job_title_exact(&normalized) {
        return JobCategory {
            name: entry.category.clone(),
            matched: TitleMatch::Exact,
        };
    }

    if let Some(entry) = rules
        .job_titles
        .iter()
        .find(|entry| fuzzy_matches(&normalized, &entry.key))
    {
        debug!("Job title '{}' fuzzy-matched key '{}'", raw, entry.key);
        return JobCategory {
            name: entry.category.clone(),
            matched: TitleMatch::Fuzzy,
        };
    }

    JobCategory {
        name: raw.trim().to_string(),
        matched: TitleMatch::Unmatched,
    }
}

/// Resolve free-text education to its factor triple
pub fn normalize_education(rules: &Rules, raw: &str) -> EducationFactor {
    let normalized = normalize_key(raw);

    rules
        .education
        .iter()
        .find(|entry| fuzzy_matches(&normalized, &entry.key))
        .map(|entry| EducationFactor {
            multiplier: entry.multiplier,
            weight: entry.weight,
            match_confidence: EDUCATION_HIT_CONFIDENCE,
            matched_key: Some(entry.key.clone()),
        })
        .unwrap_or_else(EducationFactor::unmatched)
}

/// Bidirectional substring match
///
/// An empty input never matches: every key contains the empty string.
pub(crate) fn fuzzy_matches(normalized: &str, key: &str) -> bool {
    !normalized.is_empty() && (normalized.contains(key) || key.contains(normalized))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factors::EDUCATION_MISS_CONFIDENCE;

    #[test]
    fn test_exact_match_is_case_and_whitespace_insensitive() {
        let rules = Rules::default();
        let cat = normalize_job_title(&rules, "  Software ENGINEER ");
        assert_eq!(cat.name, "Software Engineer");
        assert_eq!(cat.matched, TitleMatch::Exact);
    }

    #[test]
    fn test_fuzzy_input_contains_key() {
        let rules = Rules::default();
        let cat = normalize_job_title(&rules, "Senior Data Scientist II");
        assert_eq!(cat.name, "Data Scientist");
        assert_eq!(cat.matched, TitleMatch::Fuzzy);
    }

    #[test]
    fn test_fuzzy_key_contains_input() {
        let rules = Rules::default();
        // "pharmac" is contained in the key "pharmacist"
        let cat = normalize_job_title(&rules, "Pharmac");
        assert_eq!(cat.name, "Pharmacist");
    }

    #[test]
    fn test_fuzzy_first_match_wins_in_table_order() {
        let rules = Rules::default();
        // Contains both "web developer" and "software developer";
        // "software developer" comes first in the table
        let cat = normalize_job_title(&rules, "software developer / web developer");
        assert_eq!(cat.name, "Software Engineer");

        // Contains "project manager" but not the "it manager" key
        let cat = normalize_job_title(&rules, "IT project manager");
        assert_eq!(cat.name, "Project Manager");
    }

    #[test]
    fn test_unmatched_title_returns_raw() {
        let rules = Rules::default();
        let cat = normalize_job_title(&rules, "  Zeppelin Navigator ");
        assert_eq!(cat.name, "Zeppelin Navigator");
        assert_eq!(cat.matched, TitleMatch::Unmatched);
        assert!(!cat.is_known());
    }

    #[test]
    fn test_empty_title_is_unmatched() {
        let rules = Rules::default();
        let cat = normalize_job_title(&rules, "   ");
        assert_eq!(cat.matched, TitleMatch::Unmatched);
        assert_eq!(cat.name, "");
    }

    #[test]
    fn test_education_bachelors_degree() {
        let rules = Rules::default();
        let edu = normalize_education(&rules, "Bachelor's Degree");
        assert!(edu.multiplier >= 1.15 && edu.multiplier <= 1.20);
        assert_eq!(edu.weight, 3);
        assert_eq!(edu.match_confidence, EDUCATION_HIT_CONFIDENCE);
        assert!(edu.is_known());
    }

    #[test]
    fn test_education_order_matters() {
        let rules = Rules::default();
        // "phd" precedes "degree"
        let edu = normalize_education(&rules, "PhD degree in Physics");
        assert_eq!(edu.weight, 5);
    }

    #[test]
    fn test_education_unmatched_fallback() {
        let rules = Rules::default();
        let edu = normalize_education(&rules, "self taught");
        assert_eq!(edu.multiplier, 1.0);
        assert_eq!(edu.match_confidence, EDUCATION_MISS_CONFIDENCE);
        assert!(!edu.is_known());
    }
}
