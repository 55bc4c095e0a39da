//! Benchmark resolution
//!
//! Resolves a base wage for (job category, location, education) against an
//! injected [`BenchmarkSource`], degrading through four tiers:
//!
//! | tier | match                         | confidence | data quality |
//! |------|-------------------------------|------------|--------------|
//! | 1    | category + location + education | 0.92     | 1.00         |
//! | 2    | category + location (any education) | 0.85 | 0.85         |
//! | 3    | category only, averaged       | 0.75       | 0.70         |
//! | 4    | global fallback constant      | 0.62       | 0.50         |
//!
//! Unknown combinations always land in tier 4, and so does a lookup that
//! times out at any tier. Any other source error (store unreachable) fails
//! resolution.

use std::future::Future;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::rules::{normalize_key, FallbackBenchmark};
use crate::{Error, Result};

/// Smallest accepted base wage or range minimum (one currency unit)
pub const MIN_WAGE_FIGURE: f64 = 1.0;

/// Typed benchmark row
///
/// Construct through [`BenchmarkRecord::new`] so numeric invariants hold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BenchmarkRecord {
    pub job_category: String,
    pub location: String,
    pub education: String,
    pub base_wage: f64,
    pub wage_range_min: f64,
    pub wage_range_max: f64,
}

impl BenchmarkRecord {
    pub fn new(
        job_category: impl Into<String>,
        location: impl Into<String>,
        education: impl Into<String>,
        base_wage: f64,
        wage_range_min: f64,
        wage_range_max: f64,
    ) -> Result<Self> {
        let record = Self {
            job_category: job_category.into(),
            location: location.into(),
            education: education.into(),
            base_wage,
            wage_range_min,
            wage_range_max,
        };
        record.validate()?;
        Ok(record)
    }

    pub fn validate(&self) -> Result<()> {
        if self.job_category.trim().is_empty() {
            return Err(Error::InvalidBenchmark("job_category is empty".to_string()));
        }
        let all_finite = [self.base_wage, self.wage_range_min, self.wage_range_max]
            .iter()
            .all(|v| v.is_finite());
        if !all_finite {
            return Err(Error::InvalidBenchmark(format!(
                "non-finite wage figure for {}/{}/{}",
                self.job_category, self.location, self.education
            )));
        }
        if self.base_wage < MIN_WAGE_FIGURE || self.wage_range_min < MIN_WAGE_FIGURE {
            return Err(Error::InvalidBenchmark(format!(
                "wage figures must be at least {} for {}/{}/{}",
                MIN_WAGE_FIGURE, self.job_category, self.location, self.education
            )));
        }
        if self.wage_range_min > self.wage_range_max {
            return Err(Error::InvalidBenchmark(format!(
                "wage_range_min {} exceeds wage_range_max {} for {}/{}/{}",
                self.wage_range_min,
                self.wage_range_max,
                self.job_category,
                self.location,
                self.education
            )));
        }
        Ok(())
    }
}

/// Query key; `None` means "any value"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BenchmarkKey {
    pub job_category: String,
    pub location: Option<String>,
    pub education: Option<String>,
}

impl BenchmarkKey {
    pub fn matches(&self, record: &BenchmarkRecord) -> bool {
        fn eq(a: &str, b: &str) -> bool {
            normalize_key(a) == normalize_key(b)
        }
        eq(&self.job_category, &record.job_category)
            && self.location.as_deref().map_or(true, |l| eq(l, &record.location))
            && self.education.as_deref().map_or(true, |e| eq(e, &record.education))
    }
}

/// Reference dataset collaborator
///
/// Implementations return every record matching `key`, comparing text the
/// way [`normalize_key`] does (trimmed, Unicode lowercase). An empty vector
/// means "not found"; [`Error::BenchmarkTimeout`] means the store did not
/// answer in time; any other `Err` means it could not be consulted at all.
pub trait BenchmarkSource {
    fn find(&self, key: &BenchmarkKey) -> impl Future<Output = Result<Vec<BenchmarkRecord>>> + Send;
}

/// In-process benchmark dataset
#[derive(Debug, Clone, Default)]
pub struct InMemoryBenchmarks {
    records: Vec<BenchmarkRecord>,
}

impl InMemoryBenchmarks {
    pub fn new(records: Vec<BenchmarkRecord>) -> Self {
        Self { records }
    }

    pub fn push(&mut self, record: BenchmarkRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl BenchmarkSource for InMemoryBenchmarks {
    async fn find(&self, key: &BenchmarkKey) -> Result<Vec<BenchmarkRecord>> {
        Ok(self
            .records
            .iter()
            .filter(|r| key.matches(r))
            .cloned()
            .collect())
    }
}

/// Which resolution tier produced a benchmark
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BenchmarkTier {
    Exact,
    CategoryLocation,
    CategoryOnly,
    GlobalFallback,
}

impl BenchmarkTier {
    /// Benchmark match confidence in [0, 1]
    pub fn confidence(&self) -> f64 {
        match self {
            BenchmarkTier::Exact => 0.92,
            BenchmarkTier::CategoryLocation => 0.85,
            BenchmarkTier::CategoryOnly => 0.75,
            BenchmarkTier::GlobalFallback => 0.62,
        }
    }

    pub fn data_quality(&self) -> f64 {
        match self {
            BenchmarkTier::Exact => 1.0,
            BenchmarkTier::CategoryLocation => 0.85,
            BenchmarkTier::CategoryOnly => 0.70,
            BenchmarkTier::GlobalFallback => 0.50,
        }
    }

    /// 1-based tier number
    pub fn number(&self) -> u8 {
        match self {
            BenchmarkTier::Exact => 1,
            BenchmarkTier::CategoryLocation => 2,
            BenchmarkTier::CategoryOnly => 3,
            BenchmarkTier::GlobalFallback => 4,
        }
    }

    /// True for tiers where the dataset's range describes this exact role and place
    pub fn is_local(&self) -> bool {
        matches!(self, BenchmarkTier::Exact | BenchmarkTier::CategoryLocation)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WageRange {
    pub min: f64,
    pub max: f64,
}

impl WageRange {
    pub fn midpoint(&self) -> f64 {
        (self.min + self.max) / 2.0
    }

    pub fn width(&self) -> f64 {
        self.max - self.min
    }
}

/// Outcome of benchmark resolution
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedBenchmark {
    pub tier: BenchmarkTier,
    pub base_wage: f64,
    pub confidence: f64,
    pub wage_range: WageRange,
    pub data_quality: f64,
}

impl ResolvedBenchmark {
    fn from_record(tier: BenchmarkTier, record: &BenchmarkRecord) -> Self {
        Self {
            tier,
            base_wage: record.base_wage,
            confidence: tier.confidence(),
            wage_range: WageRange {
                min: record.wage_range_min,
                max: record.wage_range_max,
            },
            data_quality: tier.data_quality(),
        }
    }

    pub fn fallback(fallback: &FallbackBenchmark) -> Self {
        let tier = BenchmarkTier::GlobalFallback;
        Self {
            tier,
            base_wage: fallback.base_wage,
            confidence: tier.confidence(),
            wage_range: WageRange {
                min: fallback.wage_range_min,
                max: fallback.wage_range_max,
            },
            data_quality: tier.data_quality(),
        }
    }
}

/// Resolve a benchmark through the four tiers
///
/// Tiers 2 and 3 ignore education entirely. When several rows match a tier-1
/// or tier-2 key, the highest base wage is used. A timeout at any tier skips
/// the remaining tiers and returns the global fallback.
pub async fn resolve_benchmark<S: BenchmarkSource>(
    source: &S,
    job_category: &str,
    location: &str,
    education: &str,
    fallback: &FallbackBenchmark,
) -> Result<ResolvedBenchmark> {
    let exact_key = BenchmarkKey {
        job_category: job_category.to_string(),
        location: Some(location.to_string()),
        education: Some(education.to_string()),
    };
    let Some(exact) = lookup(source, &exact_key).await? else {
        return Ok(ResolvedBenchmark::fallback(fallback));
    };
    if let Some(record) = highest_base_wage(&exact) {
        debug!("Benchmark tier 1 for {}/{}/{}", job_category, location, education);
        return Ok(ResolvedBenchmark::from_record(BenchmarkTier::Exact, record));
    }

    let location_key = BenchmarkKey {
        education: None,
        ..exact_key
    };
    let Some(by_location) = lookup(source, &location_key).await? else {
        return Ok(ResolvedBenchmark::fallback(fallback));
    };
    if let Some(record) = highest_base_wage(&by_location) {
        debug!("Benchmark tier 2 for {}/{}", job_category, location);
        return Ok(ResolvedBenchmark::from_record(BenchmarkTier::CategoryLocation, record));
    }

    let category_key = BenchmarkKey {
        location: None,
        ..location_key
    };
    let Some(by_category) = lookup(source, &category_key).await? else {
        return Ok(ResolvedBenchmark::fallback(fallback));
    };
    if !by_category.is_empty() {
        debug!(
            "Benchmark tier 3 for {} ({} rows averaged)",
            job_category,
            by_category.len()
        );
        let tier = BenchmarkTier::CategoryOnly;
        let mean = by_category.iter().map(|r| r.base_wage).sum::<f64>() / by_category.len() as f64;
        let min = by_category
            .iter()
            .map(|r| r.wage_range_min)
            .fold(f64::INFINITY, f64::min);
        let max = by_category
            .iter()
            .map(|r| r.wage_range_max)
            .fold(f64::NEG_INFINITY, f64::max);
        return Ok(ResolvedBenchmark {
            tier,
            base_wage: mean,
            confidence: tier.confidence(),
            wage_range: WageRange { min, max },
            data_quality: tier.data_quality(),
        });
    }

    warn!(
        "No benchmark for category '{}' (location '{}', education '{}'), using global fallback",
        job_category, location, education
    );
    Ok(ResolvedBenchmark::fallback(fallback))
}

/// One tier lookup; `Ok(None)` when the store timed out
async fn lookup<S: BenchmarkSource>(source: &S, key: &BenchmarkKey) -> Result<Option<Vec<BenchmarkRecord>>> {
    match source.find(key).await {
        Ok(records) => Ok(Some(records)),
        Err(Error::BenchmarkTimeout(reason)) => {
            warn!(
                "Benchmark lookup timed out for {:?} ({}), using global fallback",
                key, reason
            );
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

fn highest_base_wage(records: &[BenchmarkRecord]) -> Option<&BenchmarkRecord> {
    records.iter().fold(None, |best: Option<&BenchmarkRecord>, r| match best {
        Some(b) if b.base_wage >= r.base_wage => Some(b),
        _ => Some(r),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::ModelProfile;

    fn dataset() -> InMemoryBenchmarks {
        InMemoryBenchmarks::new(vec![
            BenchmarkRecord::new("Software Engineer", "Nairobi", "Bachelor's Degree", 85_000.0, 60_000.0, 250_000.0).unwrap(),
            BenchmarkRecord::new("Software Engineer", "Nairobi", "Master's Degree", 110_000.0, 80_000.0, 300_000.0).unwrap(),
            BenchmarkRecord::new("Software Engineer", "Mombasa", "Diploma", 50_000.0, 35_000.0, 120_000.0).unwrap(),
            BenchmarkRecord::new("Nurse", "Kisumu", "Diploma", 40_000.0, 28_000.0, 70_000.0).unwrap(),
        ])
    }

    fn fallback() -> FallbackBenchmark {
        ModelProfile::default().fallback
    }

    #[tokio::test]
    async fn test_tier1_exact_match() {
        let resolved = resolve_benchmark(&dataset(), "software engineer", "NAIROBI", "bachelor's degree", &fallback())
            .await
            .unwrap();
        assert_eq!(resolved.tier, BenchmarkTier::Exact);
        assert_eq!(resolved.base_wage, 85_000.0);
        assert_eq!(resolved.confidence, 0.92);
        assert_eq!(resolved.data_quality, 1.0);
        assert_eq!(resolved.wage_range, WageRange { min: 60_000.0, max: 250_000.0 });
    }

    #[tokio::test]
    async fn test_tier2_ignores_education() {
        let resolved = resolve_benchmark(&dataset(), "Software Engineer", "Nairobi", "PhD", &fallback())
            .await
            .unwrap();
        assert_eq!(resolved.tier, BenchmarkTier::CategoryLocation);
        // Highest base wage among the Nairobi rows
        assert_eq!(resolved.base_wage, 110_000.0);
        assert_eq!(resolved.confidence, 0.85);
        assert_eq!(resolved.data_quality, 0.85);
    }

    #[tokio::test]
    async fn test_tier3_averages_category() {
        let resolved = resolve_benchmark(&dataset(), "Software Engineer", "Garissa", "Diploma", &fallback())
            .await
            .unwrap();
        assert_eq!(resolved.tier, BenchmarkTier::CategoryOnly);
        assert!((resolved.base_wage - 81_666.666_666).abs() < 0.01);
        assert_eq!(resolved.wage_range, WageRange { min: 35_000.0, max: 300_000.0 });
        assert_eq!(resolved.confidence, 0.75);
        assert_eq!(resolved.data_quality, 0.70);
    }

    #[tokio::test]
    async fn test_tier4_unknown_everything() {
        let resolved = resolve_benchmark(&dataset(), "Zeppelin Navigator", "Atlantis", "???", &fallback())
            .await
            .unwrap();
        assert_eq!(resolved.tier, BenchmarkTier::GlobalFallback);
        assert_eq!(resolved.base_wage, 45_000.0);
        assert_eq!(resolved.wage_range, WageRange { min: 30_000.0, max: 80_000.0 });
        assert_eq!(resolved.confidence, 0.62);
        assert_eq!(resolved.data_quality, 0.50);
    }

    #[tokio::test]
    async fn test_empty_dataset_falls_back() {
        let empty = InMemoryBenchmarks::default();
        let resolved = resolve_benchmark(&empty, "", "", "", &fallback()).await.unwrap();
        assert_eq!(resolved.tier.number(), 4);
    }

    struct Unreachable;

    impl BenchmarkSource for Unreachable {
        async fn find(&self, _key: &BenchmarkKey) -> Result<Vec<BenchmarkRecord>> {
            Err(Error::BenchmarkUnavailable("connection refused".to_string()))
        }
    }

    #[tokio::test]
    async fn test_source_error_is_fatal() {
        let err = resolve_benchmark(&Unreachable, "Nurse", "Kisumu", "Diploma", &fallback())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::BenchmarkUnavailable(_)));
    }

    /// Times out on fully specified keys, answers everything else
    struct SlowExactLookups(InMemoryBenchmarks);

    impl BenchmarkSource for SlowExactLookups {
        async fn find(&self, key: &BenchmarkKey) -> Result<Vec<BenchmarkRecord>> {
            if key.education.is_some() {
                return Err(Error::BenchmarkTimeout("pool timed out".to_string()));
            }
            self.0.find(key).await
        }
    }

    #[tokio::test]
    async fn test_timeout_resolves_to_fallback_without_trying_lower_tiers() {
        // Tier 2 would match Nairobi if it were consulted
        let source = SlowExactLookups(dataset());
        let resolved = resolve_benchmark(&source, "Software Engineer", "Nairobi", "Bachelor's Degree", &fallback())
            .await
            .unwrap();
        assert_eq!(resolved.tier, BenchmarkTier::GlobalFallback);
        assert_eq!(resolved.base_wage, fallback().base_wage);
    }

    #[test]
    fn test_record_validation() {
        assert!(BenchmarkRecord::new("Nurse", "Kisumu", "Diploma", 0.01, 0.01, 2.0).is_err());
        assert!(BenchmarkRecord::new("Nurse", "Kisumu", "Diploma", 1.0, 1.0, 2.0).is_ok());
        assert!(BenchmarkRecord::new("Nurse", "Kisumu", "Diploma", -1.0, 1.0, 2.0).is_err());
        assert!(BenchmarkRecord::new("Nurse", "Kisumu", "Diploma", 10.0, 5.0, 2.0).is_err());
        assert!(BenchmarkRecord::new("Nurse", "Kisumu", "Diploma", f64::NAN, 1.0, 2.0).is_err());
        assert!(BenchmarkRecord::new("  ", "Kisumu", "Diploma", 10.0, 5.0, 20.0).is_err());
        assert!(BenchmarkRecord::new("Nurse", "Kisumu", "Diploma", 10.0, 5.0, 20.0).is_ok());
    }
}
