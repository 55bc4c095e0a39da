//! Ensemble wage prediction
//!
//! Three independently formulated estimates are blended with the profile's
//! fixed weights (default 60/25/15):
//!
//! - **linear**: `base × experience × education × location`
//! - **career**: linear × `(1 + (career_index − 2.5) × career_slope)`
//! - **anchored**: `anchor_blend × linear + (1 − anchor_blend) × benchmark midpoint`
//!
//! Inter-model disagreement is reported as the coefficient of variation of the
//! three estimates; it feeds confidence calibration and range widening.

use serde::Serialize;

use crate::benchmark::WageRange;
use crate::rules::ModelProfile;

/// Career index value at which the career sub-model equals the linear one
const CAREER_INDEX_MIDPOINT: f64 = 2.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnsembleInputs {
    pub base_wage: f64,
    pub experience_multiplier: f64,
    pub education_multiplier: f64,
    pub location_multiplier: f64,
    pub career_index: f64,
    /// The benchmark's observed range (not the returned prediction band)
    pub benchmark_range: WageRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SubEstimates {
    pub linear: f64,
    pub career: f64,
    pub anchored: f64,
}

impl SubEstimates {
    fn as_array(&self) -> [f64; 3] {
        [self.linear, self.career, self.anchored]
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnsembleResult {
    pub prediction: f64,
    /// Coefficient of variation of the sub-estimates (>= 0)
    pub variance: f64,
    /// 1.0 when the prediction sits at the benchmark range midpoint
    pub consistency_score: f64,
    pub estimates: SubEstimates,
}

/// Compute the three sub-estimates and their weighted blend
pub fn ensemble(profile: &ModelProfile, inputs: &EnsembleInputs) -> EnsembleResult {
    let linear = inputs.base_wage
        * inputs.experience_multiplier
        * inputs.education_multiplier
        * inputs.location_multiplier;

    let career_adjustment = 1.0 + (inputs.career_index - CAREER_INDEX_MIDPOINT) * profile.career_slope;
    let career = linear * career_adjustment;

    let anchored = profile.anchor_blend * linear
        + (1.0 - profile.anchor_blend) * inputs.benchmark_range.midpoint();

    let estimates = SubEstimates {
        linear,
        career,
        anchored,
    };

    let w = profile.weights;
    let prediction = linear * w.linear + career * w.career + anchored * w.anchored;

    EnsembleResult {
        prediction,
        variance: coefficient_of_variation(&estimates.as_array()),
        consistency_score: consistency_score(prediction, &inputs.benchmark_range),
        estimates,
    }
}

/// Population standard deviation divided by the mean
///
/// Returns 0.0 for an empty slice or a non-positive mean.
pub fn coefficient_of_variation(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    if mean <= 0.0 {
        return 0.0;
    }
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    var.sqrt() / mean
}

/// Closeness of a prediction to the centre of a known range
///
/// `1 − |prediction − midpoint| / width`, clamped to [0, 1]: 1.0 dead centre,
/// 0.5 at either edge, 0.0 half a width outside the range.
pub fn consistency_score(prediction: f64, range: &WageRange) -> f64 {
    let width = range.width();
    let distance = (prediction - range.midpoint()).abs();
    if width <= 0.0 {
        return if distance < f64::EPSILON { 1.0 } else { 0.0 };
    }
    (1.0 - distance / width).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs(career_index: f64) -> EnsembleInputs {
        EnsembleInputs {
            base_wage: 100_000.0,
            experience_multiplier: 1.24,
            education_multiplier: 1.18,
            location_multiplier: 1.45,
            career_index,
            benchmark_range: WageRange {
                min: 60_000.0,
                max: 250_000.0,
            },
        }
    }

    #[test]
    fn test_linear_estimate_is_plain_product() {
        let result = ensemble(&ModelProfile::default(), &inputs(2.5));
        let expected = 100_000.0 * 1.24 * 1.18 * 1.45;
        assert!((result.estimates.linear - expected).abs() < 1e-6);
    }

    #[test]
    fn test_career_midpoint_matches_linear() {
        let result = ensemble(&ModelProfile::default(), &inputs(2.5));
        assert!((result.estimates.career - result.estimates.linear).abs() < 1e-6);
    }

    #[test]
    fn test_career_index_moves_career_estimate() {
        let profile = ModelProfile::default();
        let low = ensemble(&profile, &inputs(1.0));
        let high = ensemble(&profile, &inputs(4.0));
        assert!(low.estimates.career < low.estimates.linear);
        assert!(high.estimates.career > high.estimates.linear);
        assert!(high.prediction > low.prediction);
    }

    #[test]
    fn test_anchored_pulls_toward_midpoint() {
        let result = ensemble(&ModelProfile::default(), &inputs(2.5));
        let expected = 0.7 * result.estimates.linear + 0.3 * 155_000.0;
        assert!((result.estimates.anchored - expected).abs() < 1e-6);
    }

    #[test]
    fn test_prediction_is_weighted_blend() {
        let profile = ModelProfile::default();
        let r = ensemble(&profile, &inputs(1.7));
        let e = r.estimates;
        let expected = 0.60 * e.linear + 0.25 * e.career + 0.15 * e.anchored;
        assert!((r.prediction - expected).abs() < 1e-6);
        let lo = e.linear.min(e.career).min(e.anchored);
        let hi = e.linear.max(e.career).max(e.anchored);
        assert!(r.prediction >= lo && r.prediction <= hi);
    }

    #[test]
    fn test_coefficient_of_variation() {
        assert_eq!(coefficient_of_variation(&[5.0, 5.0, 5.0]), 0.0);
        assert_eq!(coefficient_of_variation(&[]), 0.0);
        // mean 2, population std sqrt(2/3)
        let cv = coefficient_of_variation(&[1.0, 2.0, 3.0]);
        assert!((cv - (2.0f64 / 3.0).sqrt() / 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_consistency_score_shape() {
        let range = WageRange { min: 100.0, max: 200.0 };
        assert_eq!(consistency_score(150.0, &range), 1.0);
        assert!((consistency_score(200.0, &range) - 0.5).abs() < 1e-12);
        assert!((consistency_score(100.0, &range) - 0.5).abs() < 1e-12);
        assert_eq!(consistency_score(250.0, &range), 0.0);
        assert_eq!(consistency_score(1_000.0, &range), 0.0);
    }

    #[test]
    fn test_consistency_score_degenerate_range() {
        let range = WageRange { min: 100.0, max: 100.0 };
        assert_eq!(consistency_score(100.0, &range), 1.0);
        assert_eq!(consistency_score(101.0, &range), 0.0);
    }
}
