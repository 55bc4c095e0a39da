//! End-to-end wage prediction
//!
//! Data flows strictly one way:
//!
//! ```text
//! WageQuery → normalizer + factor tables → benchmark resolver
//!           → career index → ensemble → confidence calibrator → PredictionResult
//! ```
//!
//! The predictor holds no mutable state. Identical queries against an
//! unchanged benchmark dataset give identical results, and queries can run
//! concurrently against a shared `WagePredictor`.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::benchmark::{resolve_benchmark, BenchmarkSource, WageRange};
use crate::calibration::{calibrate, CalibrationInputs, InputCompleteness};
use crate::career::career_index_from_parts;
use crate::ensemble::{ensemble, EnsembleInputs, SubEstimates};
use crate::factors::{experience_multiplier, location_factor, seniority_level};
use crate::fairness::{classify_with_tolerance, FairnessAssessment};
use crate::normalize::{normalize_education, normalize_job_title};
use crate::rules::{LocationTier, Rules};
use crate::Result;

/// Range half-width never exceeds this fraction of the prediction
const MAX_RANGE_HALF_WIDTH: f64 = 0.9;

/// One prediction request; experience is validated non-negative upstream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WageQuery {
    pub job_title: String,
    pub education: String,
    pub experience_years: u32,
    pub location: String,
}

impl WageQuery {
    pub fn new(
        job_title: impl Into<String>,
        education: impl Into<String>,
        experience_years: u32,
        location: impl Into<String>,
    ) -> Self {
        Self {
            job_title: job_title.into(),
            education: education.into(),
            experience_years,
            location: location.into(),
        }
    }
}

/// Integer currency range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WageBand {
    pub min: i64,
    pub max: i64,
}

impl From<WageRange> for WageBand {
    fn from(range: WageRange) -> Self {
        Self {
            min: range.min.round() as i64,
            max: range.max.round() as i64,
        }
    }
}

/// Diagnostic scalars reported alongside a prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionMetadata {
    pub job_category: String,
    pub benchmark_tier: u8,
    pub career_index: f64,
    pub variance: f64,
    pub consistency_score: f64,
    /// Data quality as a percentage
    pub data_quality: u8,
    pub location_tier: LocationTier,
    pub benchmark_range: WageBand,
    pub sub_estimates: SubEstimateBand,
}

/// Rounded ensemble sub-estimates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubEstimateBand {
    pub linear: i64,
    pub career: i64,
    pub anchored: i64,
}

impl From<SubEstimates> for SubEstimateBand {
    fn from(e: SubEstimates) -> Self {
        Self {
            linear: e.linear.round() as i64,
            career: e.career.round() as i64,
            anchored: e.anchored.round() as i64,
        }
    }
}

/// Output contract of the predictor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionResult {
    pub predicted_wage: i64,
    pub confidence: u8,
    /// Band derived from the prediction, so min < predicted < max
    pub wage_range: WageBand,
    pub model_version: String,
    pub metadata: PredictionMetadata,
}

/// Rule-driven ensemble wage predictor
#[derive(Debug, Clone)]
pub struct WagePredictor {
    rules: Arc<Rules>,
    model_version: String,
}

impl WagePredictor {
    /// Create a predictor reporting the rules profile's model version
    pub fn new(rules: Arc<Rules>) -> Self {
        let model_version = rules.profile.model_version.clone();
        Self {
            rules,
            model_version,
        }
    }

    /// Override the reported model version tag
    pub fn with_model_version(mut self, model_version: impl Into<String>) -> Self {
        self.model_version = model_version.into();
        self
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    pub fn model_version(&self) -> &str {
        &self.model_version
    }

    /// Predict the fair wage for one query
    ///
    /// Fails only when the benchmark source itself errors.
    pub async fn predict<S: BenchmarkSource>(&self, source: &S, query: &WageQuery) -> Result<PredictionResult> {
        let rules = self.rules.as_ref();
        let profile = &rules.profile;

        let category = normalize_job_title(rules, &query.job_title);
        let location = location_factor(rules, &query.location);
        let education = normalize_education(rules, &query.education);

        debug!(
            "Normalized '{}' → '{}' ({:?}), location tier {}, education ×{:.2}",
            query.job_title, category.name, category.matched, location.tier, education.multiplier
        );

        let benchmark = resolve_benchmark(
            source,
            &category.name,
            query.location.trim(),
            query.education.trim(),
            &profile.fallback,
        )
        .await?;

        let career_index = career_index_from_parts(
            query.experience_years,
            education.weight,
            seniority_level(rules, &query.job_title),
        );

        let result = ensemble(
            profile,
            &EnsembleInputs {
                base_wage: benchmark.base_wage,
                experience_multiplier: experience_multiplier(query.experience_years),
                education_multiplier: education.multiplier,
                location_multiplier: location.multiplier,
                career_index,
                benchmark_range: benchmark.wage_range,
            },
        );

        debug!(
            "Tier {} base {:.0}: linear {:.0}, career {:.0}, anchored {:.0} → {:.0} (cv {:.3})",
            benchmark.tier.number(),
            benchmark.base_wage,
            result.estimates.linear,
            result.estimates.career,
            result.estimates.anchored,
            result.prediction,
            result.variance
        );

        let confidence = calibrate(
            profile,
            &CalibrationInputs {
                base_confidence: benchmark.confidence,
                data_quality: benchmark.data_quality,
                location_confidence: location.match_confidence,
                education_confidence: education.match_confidence,
                variance: result.variance,
                completeness: InputCompleteness {
                    job_title_known: category.is_known(),
                    location_known: location.known,
                    education_known: education.is_known(),
                    experience_present: true,
                },
                experience_years: query.experience_years,
            },
        );

        Ok(PredictionResult {
            predicted_wage: whole_wage(result.prediction),
            confidence,
            wage_range: self.prediction_band(result.prediction, result.variance),
            model_version: self.model_version.clone(),
            metadata: PredictionMetadata {
                job_category: category.name,
                benchmark_tier: benchmark.tier.number(),
                career_index: round_to(career_index, 2),
                variance: round_to(result.variance, 2),
                consistency_score: round_to(result.consistency_score, 2),
                data_quality: (benchmark.data_quality * 100.0).round() as u8,
                location_tier: location.tier,
                benchmark_range: benchmark.wage_range.into(),
                sub_estimates: result.estimates.into(),
            },
        })
    }

    /// Classify an actual wage against a prediction using the profile tolerance
    pub fn assess(&self, prediction: &PredictionResult, actual_wage: f64) -> Result<FairnessAssessment> {
        classify_with_tolerance(
            actual_wage,
            prediction.predicted_wage as f64,
            self.rules.profile.fairness_tolerance,
        )
    }

    /// Symmetric band around the prediction, widened by model disagreement
    ///
    /// After rounding, each end stays at least one unit away from the
    /// reported wage.
    pub fn prediction_band(&self, prediction: f64, variance: f64) -> WageBand {
        let profile = &self.rules.profile;
        let half = (profile.range_band * (1.0 + profile.range_variance_widening * variance))
            .min(MAX_RANGE_HALF_WIDTH);
        let predicted = whole_wage(prediction);
        WageBand {
            min: ((prediction * (1.0 - half)).round() as i64).min(predicted - 1),
            max: ((prediction * (1.0 + half)).round() as i64).max(predicted + 1),
        }
    }
}

/// Reported wage: rounded to a whole unit, never below one
fn whole_wage(prediction: f64) -> i64 {
    (prediction.round() as i64).max(1)
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
