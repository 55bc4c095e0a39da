//! Prediction rules: model profile plus factor tables
//!
//! All lookup tables and tunable constants live here as immutable data,
//! loaded once at process start and threaded explicitly through the
//! normalizer, resolver and predictor as `&Rules` (or `Arc<Rules>`).
//!
//! # Sources
//!
//! 1. Rules TOML file (`rules_file` in the bootstrap config)
//! 2. Built-in defaults (see [`defaults`])
//!
//! A TOML file only needs to name the sections it overrides; an array such as
//! `[[job_titles]]` replaces the built-in list entirely, preserving the order
//! written in the file.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::benchmark::MIN_WAGE_FIGURE;
use crate::{Error, Result};

pub mod defaults;

/// Coarse urbanization tier attached to every location entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationTier {
    UrbanMajor,
    UrbanSecondary,
    Town,
    Rural,
}

impl LocationTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            LocationTier::UrbanMajor => "urban_major",
            LocationTier::UrbanSecondary => "urban_secondary",
            LocationTier::Town => "town",
            LocationTier::Rural => "rural",
        }
    }
}

impl std::fmt::Display for LocationTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw job title fragment mapped to a canonical job category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobTitleEntry {
    pub key: String,
    pub category: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationEntry {
    pub name: String,
    pub multiplier: f64,
    pub tier: LocationTier,
}

/// Entry used for any location not present in the table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefaultLocation {
    pub multiplier: f64,
    pub tier: LocationTier,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EducationEntry {
    pub key: String,
    pub multiplier: f64,
    /// Credential weight on a 0..=5 scale, used by the career index
    pub weight: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeniorityEntry {
    pub keyword: String,
    pub level: f64,
}

/// Blend weights of the three ensemble sub-models
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnsembleWeights {
    pub linear: f64,
    pub career: f64,
    pub anchored: f64,
}

/// Global fallback benchmark used when nothing in the dataset matches
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FallbackBenchmark {
    pub base_wage: f64,
    pub wage_range_min: f64,
    pub wage_range_max: f64,
}

/// Calibration profile
///
/// `model_version` is the tag reported with every prediction; different
/// calibration profiles are distinguished by this tag only, never by
/// separate code paths.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelProfile {
    pub model_version: String,
    pub model_type: String,
    pub weights: EnsembleWeights,
    /// Per-point slope of the career adjustment around the index midpoint 2.5
    pub career_slope: f64,
    /// Share of the linear estimate in the range-anchored sub-model
    pub anchor_blend: f64,
    pub confidence_floor: u8,
    pub confidence_ceiling: u8,
    /// Fair band half-width as a fraction of the predicted wage
    pub fairness_tolerance: f64,
    /// Half-width of the returned wage range as a fraction of the prediction
    pub range_band: f64,
    /// Extra range widening per unit of inter-model variance
    pub range_variance_widening: f64,
    pub fallback: FallbackBenchmark,
}

/// Complete, validated rule set
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Rules {
    pub profile: ModelProfile,
    pub job_titles: Vec<JobTitleEntry>,
    pub locations: Vec<LocationEntry>,
    pub default_location: DefaultLocation,
    pub education: Vec<EducationEntry>,
    pub seniority: Vec<SeniorityEntry>,

    #[serde(skip)]
    job_title_index: HashMap<String, usize>,
    #[serde(skip)]
    location_index: HashMap<String, usize>,
}

impl Default for Rules {
    fn default() -> Self {
        let mut rules = Self {
            profile: ModelProfile::default(),
            job_titles: defaults::job_titles(),
            locations: defaults::locations(),
            default_location: defaults::default_location(),
            education: defaults::education(),
            seniority: defaults::seniority(),
            job_title_index: HashMap::new(),
            location_index: HashMap::new(),
        };
        rules.normalize_keys();
        rules.build_indexes();
        rules
    }
}

impl Rules {
    /// Parse rules from TOML text, then normalize and validate them
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let mut rules: Rules = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Failed to parse rules: {}", e)))?;
        rules.normalize_keys();
        rules.validate()?;
        rules.build_indexes();
        Ok(rules)
    }

    /// Load rules from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read rules file {}: {}", path.display(), e))
        })?;
        let rules = Self::from_toml_str(&content)?;
        info!(
            "Loaded rules from {} (profile {}, {} job titles, {} locations, {} education entries)",
            path.display(),
            rules.profile.model_version,
            rules.job_titles.len(),
            rules.locations.len(),
            rules.education.len()
        );
        Ok(rules)
    }

    /// Exact (already normalized) job title lookup
    pub fn job_title_exact(&self, normalized: &str) -> Option<&JobTitleEntry> {
        self.job_title_index
            .get(normalized)
            .map(|&idx| &self.job_titles[idx])
    }

    /// Exact (already normalized) location lookup
    pub fn location_exact(&self, normalized: &str) -> Option<&LocationEntry> {
        self.location_index
            .get(normalized)
            .map(|&idx| &self.locations[idx])
    }

    /// Check every invariant the predictor relies on
    pub fn validate(&self) -> Result<()> {
        let p = &self.profile;

        if p.model_version.trim().is_empty() {
            return Err(Error::Config("profile.model_version must not be empty".to_string()));
        }

        let w = p.weights;
        for (name, value) in [("linear", w.linear), ("career", w.career), ("anchored", w.anchored)] {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::Config(format!("Ensemble weight '{}' must be >= 0, got {}", name, value)));
            }
        }
        let sum = w.linear + w.career + w.anchored;
        if (sum - 1.0).abs() > 1e-6 {
            return Err(Error::Config(format!("Ensemble weights must sum to 1.0, got {}", sum)));
        }
        if w.linear < w.career || w.linear < w.anchored {
            return Err(Error::Config("Linear ensemble weight must be the largest".to_string()));
        }

        if !(0.0..=1.0).contains(&p.anchor_blend) {
            return Err(Error::Config(format!("anchor_blend must be in [0, 1], got {}", p.anchor_blend)));
        }
        if !p.career_slope.is_finite() || p.career_slope < 0.0 || p.career_slope >= 0.4 {
            // Keeps the career adjustment factor positive across the full 0..=5 index
            return Err(Error::Config(format!("career_slope must be in [0, 0.4), got {}", p.career_slope)));
        }
        if p.confidence_floor >= p.confidence_ceiling || p.confidence_ceiling > 100 {
            return Err(Error::Config(format!(
                "Confidence band must satisfy floor < ceiling <= 100, got [{}, {}]",
                p.confidence_floor, p.confidence_ceiling
            )));
        }
        if !(p.fairness_tolerance > 0.0 && p.fairness_tolerance < 1.0) {
            return Err(Error::Config(format!(
                "fairness_tolerance must be in (0, 1), got {}",
                p.fairness_tolerance
            )));
        }
        if !(p.range_band > 0.0 && p.range_band < 0.9) {
            return Err(Error::Config(format!("range_band must be in (0, 0.9), got {}", p.range_band)));
        }
        if !p.range_variance_widening.is_finite() || p.range_variance_widening < 0.0 {
            return Err(Error::Config("range_variance_widening must be >= 0".to_string()));
        }

        let fb = p.fallback;
        if !(fb.base_wage >= MIN_WAGE_FIGURE
            && fb.wage_range_min >= MIN_WAGE_FIGURE
            && fb.wage_range_min <= fb.wage_range_max)
        {
            return Err(Error::Config(format!(
                "Fallback benchmark must be at least {} with min <= max, got {:?}",
                MIN_WAGE_FIGURE,
                fb
            )));
        }

        if self.job_titles.iter().any(|e| e.key.is_empty() || e.category.trim().is_empty()) {
            return Err(Error::Config("Job title entries need a key and a category".to_string()));
        }
        for loc in &self.locations {
            check_multiplier(&format!("location '{}'", loc.name), loc.multiplier)?;
        }
        check_multiplier("default_location", self.default_location.multiplier)?;
        for edu in &self.education {
            // An empty key would fuzzy-match every education string
            if edu.key.is_empty() {
                return Err(Error::Config("Education entries need a non-empty key".to_string()));
            }
            check_multiplier(&format!("education '{}'", edu.key), edu.multiplier)?;
            if edu.weight > 5 {
                return Err(Error::Config(format!(
                    "Education weight for '{}' must be 0..=5, got {}",
                    edu.key, edu.weight
                )));
            }
        }
        for s in &self.seniority {
            if !(0.0..=5.0).contains(&s.level) {
                return Err(Error::Config(format!(
                    "Seniority level for '{}' must be 0..=5, got {}",
                    s.keyword, s.level
                )));
            }
        }

        Ok(())
    }

    fn normalize_keys(&mut self) {
        for e in &mut self.job_titles {
            e.key = normalize_key(&e.key);
        }
        for e in &mut self.locations {
            e.name = normalize_key(&e.name);
        }
        for e in &mut self.education {
            e.key = normalize_key(&e.key);
        }
        for e in &mut self.seniority {
            e.keyword = normalize_key(&e.keyword);
        }
    }

    fn build_indexes(&mut self) {
        self.job_title_index.clear();
        for (idx, entry) in self.job_titles.iter().enumerate() {
            // First occurrence wins, matching the fuzzy scan order
            self.job_title_index.entry(entry.key.clone()).or_insert(idx);
        }
        self.location_index.clear();
        for (idx, entry) in self.locations.iter().enumerate() {
            self.location_index.entry(entry.name.clone()).or_insert(idx);
        }
    }
}

/// Lowercase and trim, the canonical form for every table key
pub fn normalize_key(raw: &str) -> String {
    raw.trim().to_lowercase()
}

fn check_multiplier(what: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(Error::Config(format!("Multiplier for {} must be > 0, got {}", what, value)))
    }
}
