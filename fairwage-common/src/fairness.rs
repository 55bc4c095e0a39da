//! Fairness classification of an actual wage against a predicted fair wage

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Default fair band half-width (±15%)
pub const DEFAULT_FAIRNESS_TOLERANCE: f64 = 0.15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FairnessVerdict {
    #[serde(rename = "Below Market Average")]
    BelowMarket,
    #[serde(rename = "Fair Wage")]
    Fair,
    #[serde(rename = "Above Market Average")]
    AboveMarket,
}

impl FairnessVerdict {
    /// Display label used in API responses
    pub fn label(&self) -> &'static str {
        match self {
            FairnessVerdict::BelowMarket => "Below Market Average",
            FairnessVerdict::Fair => "Fair Wage",
            FairnessVerdict::AboveMarket => "Above Market Average",
        }
    }
}

impl std::fmt::Display for FairnessVerdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FairnessAssessment {
    pub status: FairnessVerdict,
    /// Signed deviation of actual from predicted, percent, one decimal place
    pub percent_difference: f64,
}

/// Classify `actual` against `predicted` with the default ±15% band
pub fn classify(actual_wage: f64, predicted_wage: f64) -> Result<FairnessAssessment> {
    classify_with_tolerance(actual_wage, predicted_wage, DEFAULT_FAIRNESS_TOLERANCE)
}

/// Classify with an explicit tolerance
///
/// `diff = (actual − predicted) / predicted`; below `−tolerance` is
/// BelowMarket, above `+tolerance` is AboveMarket, anything else is Fair
/// (band edges included).
pub fn classify_with_tolerance(
    actual_wage: f64,
    predicted_wage: f64,
    tolerance: f64,
) -> Result<FairnessAssessment> {
    if !predicted_wage.is_finite() || predicted_wage <= 0.0 {
        return Err(Error::InvalidInput(format!(
            "predicted wage must be positive, got {}",
            predicted_wage
        )));
    }
    if !actual_wage.is_finite() || actual_wage < 0.0 {
        return Err(Error::InvalidInput(format!(
            "actual wage must be a non-negative number, got {}",
            actual_wage
        )));
    }

    let diff = (actual_wage - predicted_wage) / predicted_wage;
    let status = if diff < -tolerance {
        FairnessVerdict::BelowMarket
    } else if diff > tolerance {
        FairnessVerdict::AboveMarket
    } else {
        FairnessVerdict::Fair
    };

    Ok(FairnessAssessment {
        status,
        percent_difference: round_to_tenth(diff * 100.0),
    })
}

fn round_to_tenth(value: f64) -> f64 {
    let rounded = (value * 10.0).round() / 10.0;
    // Avoid reporting -0.0
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_classifications() {
        let fair = classify(100.0, 100.0).unwrap();
        assert_eq!(fair.status, FairnessVerdict::Fair);
        assert_eq!(fair.percent_difference, 0.0);

        let below = classify(70.0, 100.0).unwrap();
        assert_eq!(below.status, FairnessVerdict::BelowMarket);
        assert_eq!(below.percent_difference, -30.0);

        let above = classify(130.0, 100.0).unwrap();
        assert_eq!(above.status, FairnessVerdict::AboveMarket);
        assert_eq!(above.percent_difference, 30.0);

        let within = classify(90.0, 100.0).unwrap();
        assert_eq!(within.status, FairnessVerdict::Fair);
        assert_eq!(within.percent_difference, -10.0);
    }

    #[test]
    fn test_band_edges_are_fair() {
        assert_eq!(classify(115.0, 100.0).unwrap().status, FairnessVerdict::Fair);
        assert_eq!(classify(85.0, 100.0).unwrap().status, FairnessVerdict::Fair);
        assert_eq!(classify(115.1, 100.0).unwrap().status, FairnessVerdict::AboveMarket);
        assert_eq!(classify(84.9, 100.0).unwrap().status, FairnessVerdict::BelowMarket);
    }

    #[test]
    fn test_one_decimal_rounding() {
        let a = classify(100_000.0, 87_654.0).unwrap();
        assert_eq!(a.percent_difference, 14.1);
        let b = classify(1.0, 100_000.0).unwrap();
        assert_eq!(b.percent_difference, -100.0);
    }

    #[test]
    fn test_custom_tolerance() {
        let a = classify_with_tolerance(90.0, 100.0, 0.05).unwrap();
        assert_eq!(a.status, FairnessVerdict::BelowMarket);
    }

    #[test]
    fn test_invalid_predicted_wage() {
        assert!(classify(100.0, 0.0).is_err());
        assert!(classify(100.0, -5.0).is_err());
        assert!(classify(100.0, f64::NAN).is_err());
        assert!(classify(f64::INFINITY, 100.0).is_err());
    }

    #[test]
    fn test_serialized_labels() {
        let json = serde_json::to_string(&FairnessVerdict::BelowMarket).unwrap();
        assert_eq!(json, "\"Below Market Average\"");
        assert_eq!(FairnessVerdict::Fair.to_string(), "Fair Wage");
    }
}
