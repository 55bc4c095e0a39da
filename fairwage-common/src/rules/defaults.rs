//! Built-in rule tables
//!
//! These reproduce the reference calibration. Table order is significant:
//! fuzzy matching and seniority extraction are first-match-wins scans.

use super::{
    DefaultLocation, EducationEntry, EnsembleWeights, FallbackBenchmark, JobTitleEntry,
    LocationEntry, LocationTier, ModelProfile, SeniorityEntry,
};

pub const DEFAULT_MODEL_VERSION: &str = "v2.0-ensemble";
pub const DEFAULT_MODEL_TYPE: &str = "ensemble_statistical_v2";

impl Default for ModelProfile {
    fn default() -> Self {
        Self {
            model_version: DEFAULT_MODEL_VERSION.to_string(),
            model_type: DEFAULT_MODEL_TYPE.to_string(),
            weights: EnsembleWeights {
                linear: 0.60,
                career: 0.25,
                anchored: 0.15,
            },
            career_slope: 0.15,
            anchor_blend: 0.70,
            confidence_floor: 70,
            confidence_ceiling: 95,
            fairness_tolerance: 0.15,
            range_band: 0.18,
            range_variance_widening: 0.5,
            fallback: FallbackBenchmark {
                base_wage: 45_000.0,
                wage_range_min: 30_000.0,
                wage_range_max: 80_000.0,
            },
        }
    }
}

pub fn job_titles() -> Vec<JobTitleEntry> {
    [
        // Software & IT
        ("software developer", "Software Engineer"),
        ("software engineer", "Software Engineer"),
        ("web developer", "Software Engineer"),
        ("mobile developer", "Software Engineer"),
        ("full stack developer", "Software Engineer"),
        ("frontend developer", "Software Engineer"),
        ("backend developer", "Software Engineer"),
        ("devops engineer", "DevOps Engineer"),
        ("data scientist", "Data Scientist"),
        ("data analyst", "Data Analyst"),
        ("database administrator", "Database Administrator"),
        ("system administrator", "System Administrator"),
        ("network engineer", "Network Engineer"),
        ("it support", "IT Support Specialist"),
        ("cybersecurity analyst", "Cybersecurity Specialist"),
        // Management
        ("project manager", "Project Manager"),
        ("product manager", "Product Manager"),
        ("program manager", "Program Manager"),
        ("it manager", "IT Manager"),
        ("engineering manager", "Engineering Manager"),
        // Business & Finance
        ("accountant", "Accountant"),
        ("financial analyst", "Financial Analyst"),
        ("business analyst", "Business Analyst"),
        ("sales manager", "Sales Manager"),
        ("marketing manager", "Marketing Manager"),
        ("hr manager", "HR Manager"),
        // Healthcare
        ("nurse", "Nurse"),
        ("doctor", "Medical Doctor"),
        ("medical officer", "Medical Doctor"),
        ("pharmacist", "Pharmacist"),
        ("clinical officer", "Clinical Officer"),
        // Education
        ("teacher", "Teacher"),
        ("lecturer", "University Lecturer"),
        ("professor", "Professor"),
        // Operations
        ("operations manager", "Operations Manager"),
        ("logistics manager", "Logistics Manager"),
        ("supply chain manager", "Supply Chain Manager"),
    ]
    .into_iter()
    .map(|(key, category)| JobTitleEntry {
        key: key.to_string(),
        category: category.to_string(),
    })
    .collect()
}

pub fn locations() -> Vec<LocationEntry> {
    use LocationTier::*;
    [
        ("nairobi", 1.45, UrbanMajor),
        ("mombasa", 1.25, UrbanMajor),
        ("kisumu", 1.15, UrbanMajor),
        ("nakuru", 1.08, UrbanSecondary),
        ("eldoret", 1.05, UrbanSecondary),
        ("thika", 1.10, UrbanSecondary),
        ("malindi", 1.05, UrbanSecondary),
        ("nyeri", 0.95, Town),
        ("machakos", 0.98, Town),
        ("meru", 0.93, Town),
        ("kitale", 0.90, Town),
        ("garissa", 0.92, Town),
    ]
    .into_iter()
    .map(|(name, multiplier, tier)| LocationEntry {
        name: name.to_string(),
        multiplier,
        tier,
    })
    .collect()
}

pub fn default_location() -> DefaultLocation {
    DefaultLocation {
        multiplier: 0.88,
        tier: LocationTier::Rural,
    }
}

pub fn education() -> Vec<EducationEntry> {
    [
        ("phd", 1.45, 5),
        ("doctorate", 1.45, 5),
        ("masters", 1.28, 4),
        ("master's degree", 1.28, 4),
        ("master", 1.28, 4),
        ("mba", 1.32, 4),
        ("bachelor", 1.18, 3),
        ("bachelor's degree", 1.18, 3),
        ("degree", 1.18, 3),
        ("diploma", 0.95, 2),
        ("certificate", 0.85, 1),
        ("high school", 0.72, 0),
        ("secondary", 0.72, 0),
    ]
    .into_iter()
    .map(|(key, multiplier, weight)| EducationEntry {
        key: key.to_string(),
        multiplier,
        weight,
    })
    .collect()
}

pub fn seniority() -> Vec<SeniorityEntry> {
    [
        ("intern", 0.5),
        ("junior", 1.0),
        ("entry", 1.0),
        ("mid", 2.0),
        ("intermediate", 2.0),
        ("senior", 3.0),
        ("lead", 3.5),
        ("principal", 4.0),
        ("staff", 4.0),
        ("manager", 3.0),
        ("director", 4.0),
        ("vp", 4.5),
        ("c-level", 5.0),
        ("executive", 5.0),
    ]
    .into_iter()
    .map(|(keyword, level)| SeniorityEntry {
        keyword: keyword.to_string(),
        level,
    })
    .collect()
}
