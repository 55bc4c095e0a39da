//! Career index
//!
//! A single 0..=5 scalar summarizing career trajectory:
//!
//! ```text
//! index = (ln(experience + 1) * 0.4 + education_weight + seniority_level) / 3
//! ```
//!
//! The logarithmic experience term gives diminishing returns to tenure.
//! Only the ensemble's secondary sub-models consume this value.

use crate::factors::{education_weight, seniority_level};
use crate::rules::Rules;

/// Maximum career index
pub const CAREER_INDEX_MAX: f64 = 5.0;

/// Scale of the logarithmic experience term
const EXPERIENCE_LOG_SCALE: f64 = 0.4;

/// Compute the career index from raw inputs
pub fn career_index(rules: &Rules, experience_years: u32, education_raw: &str, job_title_raw: &str) -> f64 {
    career_index_from_parts(
        experience_years,
        education_weight(rules, education_raw),
        seniority_level(rules, job_title_raw),
    )
}

/// Compute the career index from already-resolved components
pub fn career_index_from_parts(experience_years: u32, education_weight: u8, seniority_level: f64) -> f64 {
    let experience_term = (f64::from(experience_years) + 1.0).ln() * EXPERIENCE_LOG_SCALE;
    let index = (experience_term + f64::from(education_weight) + seniority_level) / 3.0;
    index.clamp(0.0, CAREER_INDEX_MAX)
}
