//! Factor table lookups
//!
//! Multiplicative adjustment factors and match confidences for location,
//! education and job seniority, plus the experience multiplier curve.

use serde::Serialize;

use crate::normalize::normalize_education;
use crate::rules::{normalize_key, LocationTier, Rules};

/// Confidence of a direct location table hit
pub const LOCATION_HIT_CONFIDENCE: f64 = 0.95;
/// Confidence of the default (rural) location fallback
pub const LOCATION_MISS_CONFIDENCE: f64 = 0.75;
/// Confidence of an education table hit
pub const EDUCATION_HIT_CONFIDENCE: f64 = 0.95;
/// Confidence of the unmatched education fallback
pub const EDUCATION_MISS_CONFIDENCE: f64 = 0.70;
/// Credential weight assumed when education text matches nothing
pub const DEFAULT_EDUCATION_WEIGHT: u8 = 2;
/// Seniority level used when no keyword appears in the title ("low-mid")
pub const DEFAULT_SENIORITY_LEVEL: f64 = 1.5;
/// Upper bound of the experience multiplier
pub const EXPERIENCE_MULTIPLIER_CAP: f64 = 2.2;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationFactor {
    pub multiplier: f64,
    pub tier: LocationTier,
    pub match_confidence: f64,
    /// False when the default entry was used
    pub known: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EducationFactor {
    pub multiplier: f64,
    pub weight: u8,
    pub match_confidence: f64,
    pub matched_key: Option<String>,
}

impl EducationFactor {
    pub(crate) fn unmatched() -> Self {
        Self {
            multiplier: 1.0,
            weight: DEFAULT_EDUCATION_WEIGHT,
            match_confidence: EDUCATION_MISS_CONFIDENCE,
            matched_key: None,
        }
    }

    pub fn is_known(&self) -> bool {
        self.matched_key.is_some()
    }
}

/// Look up a location (exact, case-insensitive); unknown → default entry
pub fn location_factor(rules: &Rules, raw: &str) -> LocationFactor {
    match rules.location_exact(&normalize_key(raw)) {
        Some(entry) => LocationFactor {
            multiplier: entry.multiplier,
            tier: entry.tier,
            match_confidence: LOCATION_HIT_CONFIDENCE,
            known: true,
        },
        None => LocationFactor {
            multiplier: rules.default_location.multiplier,
            tier: rules.default_location.tier,
            match_confidence: LOCATION_MISS_CONFIDENCE,
            known: false,
        },
    }
}

/// Seniority level of a job title: first keyword found in table order
pub fn seniority_level(rules: &Rules, job_title: &str) -> f64 {
    let title = normalize_key(job_title);
    rules
        .seniority
        .iter()
        .find(|entry| !entry.keyword.is_empty() && title.contains(&entry.keyword))
        .map(|entry| entry.level)
        .unwrap_or(DEFAULT_SENIORITY_LEVEL)
}

/// Credential weight of free-text education (same fuzzy rule as the normalizer)
pub fn education_weight(rules: &Rules, raw: &str) -> u8 {
    normalize_education(rules, raw).weight
}

/// Piecewise experience multiplier
///
/// | years  | multiplier                 |
/// |--------|----------------------------|
/// | 0      | 0.75                       |
/// | 1..=2  | 0.85 + 0.075/yr            |
/// | 3..=5  | 1.00 + 0.08/yr above 2     |
/// | 6..=10 | 1.24 + 0.06/yr above 5     |
/// | 11..=15| 1.54 + 0.04/yr above 10    |
/// | 16..   | 1.74 + 0.02/yr above 15, capped at 2.2 |
///
/// Monotonically non-decreasing and concave past the first year.
pub fn experience_multiplier(years: u32) -> f64 {
    let y = f64::from(years);
    let m = match years {
        0 => 0.75,
        1..=2 => 0.85 + y * 0.075,
        3..=5 => 1.0 + (y - 2.0) * 0.08,
        6..=10 => 1.24 + (y - 5.0) * 0.06,
        11..=15 => 1.54 + (y - 10.0) * 0.04,
        _ => 1.74 + (y - 15.0) * 0.02,
    };
    m.min(EXPERIENCE_MULTIPLIER_CAP)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_experience_breakpoints() {
        assert!(approx(experience_multiplier(0), 0.75));
        assert!(approx(experience_multiplier(2), 1.0));
        assert!(approx(experience_multiplier(5), 1.24));
        assert!(approx(experience_multiplier(10), 1.54));
        assert!(approx(experience_multiplier(15), 1.74));
        assert!(approx(experience_multiplier(20), 1.84));
    }

    #[test]
    fn test_experience_monotonic_and_capped() {
        let mut prev = experience_multiplier(0);
        for years in 1..=200 {
            let m = experience_multiplier(years);
            assert!(m >= prev, "multiplier decreased at {} years", years);
            assert!(m <= EXPERIENCE_MULTIPLIER_CAP);
            prev = m;
        }
        assert!(approx(experience_multiplier(u32::MAX), EXPERIENCE_MULTIPLIER_CAP));
    }

    #[test]
    fn test_experience_growth_tapers() {
        let early = experience_multiplier(4) - experience_multiplier(3);
        let mid = experience_multiplier(8) - experience_multiplier(7);
        let late = experience_multiplier(18) - experience_multiplier(17);
        assert!(early > mid && mid > late);
    }

    #[test]
    fn test_location_hit_and_miss() {
        let rules = Rules::default();

        let hit = location_factor(&rules, " NAIROBI ");
        assert!(approx(hit.multiplier, 1.45));
        assert_eq!(hit.tier, LocationTier::UrbanMajor);
        assert!(approx(hit.match_confidence, LOCATION_HIT_CONFIDENCE));
        assert!(hit.known);

        let miss = location_factor(&rules, "Atlantis");
        assert_eq!(miss.tier, LocationTier::Rural);
        assert!(approx(miss.multiplier, 0.88));
        assert!(approx(miss.match_confidence, LOCATION_MISS_CONFIDENCE));
        assert!(!miss.known);
    }

    #[test]
    fn test_seniority_first_keyword_wins() {
        let rules = Rules::default();
        assert!(approx(seniority_level(&rules, "Senior Software Engineer"), 3.0));
        // "senior" is listed before "manager"
        assert!(approx(seniority_level(&rules, "Senior Manager"), 3.0));
        assert!(approx(seniority_level(&rules, "Engineering Director"), 4.0));
        assert!(approx(seniority_level(&rules, "VP Sales"), 4.5));
        assert!(approx(seniority_level(&rules, "Software Engineer"), DEFAULT_SENIORITY_LEVEL));
    }

    #[test]
    fn test_education_weight_default() {
        let rules = Rules::default();
        assert_eq!(education_weight(&rules, "Masters in Finance"), 4);
        assert_eq!(education_weight(&rules, "bootcamp"), DEFAULT_EDUCATION_WEIGHT);
    }
}
