//! Confidence calibration
//!
//! Starts from the benchmark match confidence and applies, in order:
//!
//! 1. data coverage: `× (0.85 + 0.15 × coverage)`, where coverage blends
//!    data quality (50%), location match (30%) and education match (20%)
//! 2. input completeness bonus: `× (1 + 0.06 × completeness)`
//! 3. typical-experience bonus: `× 1.03` for 3..=10 years
//! 4. variance penalty: `× (0.85 + 0.15 × max(0, 1 − 2 × variance))`
//!
//! The result is expressed as a percentage, rounded, and hard-clamped to the
//! profile's band (default [70, 95]). No combination of inputs escapes it.

use crate::rules::ModelProfile;

const COVERAGE_DATA_QUALITY_WEIGHT: f64 = 0.50;
const COVERAGE_LOCATION_WEIGHT: f64 = 0.30;
const COVERAGE_EDUCATION_WEIGHT: f64 = 0.20;
const COMPLETENESS_BONUS: f64 = 0.06;
const TYPICAL_EXPERIENCE_BONUS: f64 = 1.03;
const TYPICAL_EXPERIENCE_YEARS: std::ops::RangeInclusive<u32> = 3..=10;

/// Which inputs were present and resolved to a known table entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InputCompleteness {
    pub job_title_known: bool,
    pub location_known: bool,
    pub education_known: bool,
    pub experience_present: bool,
}

impl InputCompleteness {
    /// Fraction of the four inputs that are present and recognized
    pub fn fraction(&self) -> f64 {
        let known = [
            self.job_title_known,
            self.location_known,
            self.education_known,
            self.experience_present,
        ]
        .iter()
        .filter(|&&k| k)
        .count();
        known as f64 / 4.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalibrationInputs {
    pub base_confidence: f64,
    pub data_quality: f64,
    pub location_confidence: f64,
    pub education_confidence: f64,
    pub variance: f64,
    pub completeness: InputCompleteness,
    pub experience_years: u32,
}

/// Unclamped confidence in [0, ~1.1]
pub fn raw_confidence(inputs: &CalibrationInputs) -> f64 {
    let coverage = COVERAGE_DATA_QUALITY_WEIGHT * inputs.data_quality
        + COVERAGE_LOCATION_WEIGHT * inputs.location_confidence
        + COVERAGE_EDUCATION_WEIGHT * inputs.education_confidence;

    let mut confidence = inputs.base_confidence * (0.85 + 0.15 * coverage);

    confidence *= 1.0 + COMPLETENESS_BONUS * inputs.completeness.fraction();

    if TYPICAL_EXPERIENCE_YEARS.contains(&inputs.experience_years) {
        confidence *= TYPICAL_EXPERIENCE_BONUS;
    }

    let variance_penalty = (1.0 - inputs.variance * 2.0).max(0.0);
    confidence * (0.85 + 0.15 * variance_penalty)
}

/// Final integer confidence percentage within the profile band
pub fn calibrate(profile: &ModelProfile, inputs: &CalibrationInputs) -> u8 {
    clamp_confidence(profile, raw_confidence(inputs) * 100.0)
}

/// Round and clamp a percentage into the profile band
///
/// Non-finite values land on the floor.
pub fn clamp_confidence(profile: &ModelProfile, percent: f64) -> u8 {
    let floor = f64::from(profile.confidence_floor);
    let ceiling = f64::from(profile.confidence_ceiling);
    if !percent.is_finite() {
        return profile.confidence_floor;
    }
    percent.round().clamp(floor, ceiling) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> InputCompleteness {
        InputCompleteness {
            job_title_known: true,
            location_known: true,
            education_known: true,
            experience_present: true,
        }
    }

    fn inputs() -> CalibrationInputs {
        CalibrationInputs {
            base_confidence: 0.85,
            data_quality: 0.85,
            location_confidence: 0.95,
            education_confidence: 0.95,
            variance: 0.05,
            completeness: complete(),
            experience_years: 5,
        }
    }

    #[test]
    fn test_completeness_fraction() {
        assert_eq!(InputCompleteness::default().fraction(), 0.0);
        assert_eq!(complete().fraction(), 1.0);
        let half = InputCompleteness {
            job_title_known: true,
            experience_present: true,
            ..Default::default()
        };
        assert_eq!(half.fraction(), 0.5);
    }

    #[test]
    fn test_higher_variance_lowers_confidence() {
        let low = raw_confidence(&inputs());
        let high = raw_confidence(&CalibrationInputs {
            variance: 0.4,
            ..inputs()
        });
        assert!(high < low);
    }

    #[test]
    fn test_variance_penalty_saturates() {
        let a = raw_confidence(&CalibrationInputs { variance: 0.5, ..inputs() });
        let b = raw_confidence(&CalibrationInputs { variance: 50.0, ..inputs() });
        assert_eq!(a, b);
    }

    #[test]
    fn test_completeness_raises_confidence() {
        let full = raw_confidence(&inputs());
        let none = raw_confidence(&CalibrationInputs {
            completeness: InputCompleteness::default(),
            ..inputs()
        });
        assert!(full > none);
    }

    #[test]
    fn test_typical_experience_bonus() {
        let typical = raw_confidence(&inputs());
        let novice = raw_confidence(&CalibrationInputs {
            experience_years: 0,
            ..inputs()
        });
        assert!((typical / novice - TYPICAL_EXPERIENCE_BONUS).abs() < 1e-12);
    }

    #[test]
    fn test_calibrate_stays_in_band() {
        let profile = ModelProfile::default();
        for base in [0.0, 0.3, 0.62, 0.92, 1.0, 5.0] {
            for variance in [0.0, 0.1, 1.0, 1e9] {
                for years in [0, 5, 40] {
                    let c = calibrate(
                        &profile,
                        &CalibrationInputs {
                            base_confidence: base,
                            variance,
                            experience_years: years,
                            ..inputs()
                        },
                    );
                    assert!((70..=95).contains(&c), "confidence {} escaped band", c);
                }
            }
        }
    }

    #[test]
    fn test_clamp_handles_non_finite() {
        let profile = ModelProfile::default();
        assert_eq!(clamp_confidence(&profile, f64::NAN), 70);
        assert_eq!(clamp_confidence(&profile, f64::INFINITY), 70);
        assert_eq!(clamp_confidence(&profile, 1e12), 95);
        assert_eq!(clamp_confidence(&profile, 81.4), 81);
    }

    #[test]
    fn test_custom_band_respected() {
        let profile = ModelProfile {
            confidence_floor: 40,
            confidence_ceiling: 60,
            ..ModelProfile::default()
        };
        assert_eq!(calibrate(&profile, &inputs()), 60);
    }
}
