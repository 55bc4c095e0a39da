//! Benchmark dataset store
//!
//! Rows are read untyped and converted to [`BenchmarkRecord`] at this
//! boundary; rows that fail validation are skipped with a warning and never
//! reach the prediction math.

use std::path::Path;

use serde_json::Value;
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool};
use tracing::{info, warn};

use super::init::KEY_COLLATION;
use crate::benchmark::{BenchmarkKey, BenchmarkRecord, BenchmarkSource};
use crate::{Error, Result};

/// Row as stored; wage columns are read as text so malformed values
/// (`'40000 KES'`, `'80,000'`) fail to parse instead of being truncated to
/// their leading digits
#[derive(Debug, Clone, FromRow)]
pub struct RawBenchmarkRow {
    pub id: i64,
    pub job_category: String,
    pub location: String,
    pub education: String,
    pub base_wage: Option<String>,
    pub wage_range_min: Option<String>,
    pub wage_range_max: Option<String>,
}

impl TryFrom<RawBenchmarkRow> for BenchmarkRecord {
    type Error = Error;

    fn try_from(row: RawBenchmarkRow) -> Result<Self> {
        let field = |name: &str, value: Option<&str>| {
            let text = value.ok_or_else(|| Error::InvalidBenchmark(format!("row {}: {} is NULL", row.id, name)))?;
            parse_amount_text(text).ok_or_else(|| {
                Error::InvalidBenchmark(format!("row {}: {} is not a number: '{}'", row.id, name, text))
            })
        };
        BenchmarkRecord::new(
            row.job_category.clone(),
            row.location.clone(),
            row.education.clone(),
            field("base_wage", row.base_wage.as_deref())?,
            field("wage_range_min", row.wage_range_min.as_deref())?,
            field("wage_range_max", row.wage_range_max.as_deref())?,
        )
    }
}

/// SQLite-backed benchmark source
#[derive(Debug, Clone)]
pub struct SqliteBenchmarkStore {
    pool: SqlitePool,
}

impl SqliteBenchmarkStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn fetch(&self, key: &BenchmarkKey) -> std::result::Result<Vec<RawBenchmarkRow>, sqlx::Error> {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT id, job_category, location, education, \
             CAST(base_wage AS TEXT) AS base_wage, \
             CAST(wage_range_min AS TEXT) AS wage_range_min, \
             CAST(wage_range_max AS TEXT) AS wage_range_max \
             FROM wage_benchmarks WHERE job_category = ",
        );
        qb.push_bind(key.job_category.trim().to_string());
        qb.push(" COLLATE ");
        qb.push(KEY_COLLATION);
        if let Some(location) = &key.location {
            qb.push(" AND location = ");
            qb.push_bind(location.trim().to_string());
            qb.push(" COLLATE ");
            qb.push(KEY_COLLATION);
        }
        if let Some(education) = &key.education {
            qb.push(" AND education = ");
            qb.push_bind(education.trim().to_string());
            qb.push(" COLLATE ");
            qb.push(KEY_COLLATION);
        }
        qb.push(" ORDER BY id");

        qb.build_query_as::<RawBenchmarkRow>()
            .fetch_all(&self.pool)
            .await
    }
}

impl BenchmarkSource for SqliteBenchmarkStore {
    async fn find(&self, key: &BenchmarkKey) -> Result<Vec<BenchmarkRecord>> {
        let rows = match self.fetch(key).await {
            Ok(rows) => rows,
            Err(sqlx::Error::PoolTimedOut) => {
                return Err(Error::BenchmarkTimeout("no database connection available".to_string()));
            }
            Err(e) => return Err(Error::BenchmarkUnavailable(e.to_string())),
        };

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            let id = row.id;
            match BenchmarkRecord::try_from(row) {
                Ok(record) => records.push(record),
                Err(e) => warn!("Skipping benchmark row {}: {}", id, e),
            }
        }
        Ok(records)
    }
}

/// Insert one validated benchmark record
pub async fn insert_benchmark(pool: &SqlitePool, record: &BenchmarkRecord) -> Result<i64> {
    record.validate()?;
    let result = sqlx::query(
        r#"
        INSERT INTO wage_benchmarks
            (job_category, location, education, base_wage, wage_range_min, wage_range_max)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(record.job_category.trim())
    .bind(record.location.trim())
    .bind(record.education.trim())
    .bind(record.base_wage)
    .bind(record.wage_range_min)
    .bind(record.wage_range_max)
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Number of stored benchmark rows
pub async fn count_benchmarks(pool: &SqlitePool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM wage_benchmarks")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Outcome of a JSON import
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImportSummary {
    pub imported: usize,
    pub skipped: usize,
}

/// Import benchmark rows from a JSON array
///
/// Each element is an object with `job_category`, `location`, `education`,
/// `base_wage`, `wage_range_min`, `wage_range_max`. Numeric fields may be
/// JSON numbers or numeric strings (as exported from a Postgres `numeric`
/// column). Invalid elements are skipped and counted; valid ones are
/// inserted in a single transaction.
pub async fn import_benchmarks_json(pool: &SqlitePool, path: &Path) -> Result<ImportSummary> {
    let content = std::fs::read_to_string(path)?;
    let value: Value = serde_json::from_str(&content)
        .map_err(|e| Error::InvalidInput(format!("{} is not valid JSON: {}", path.display(), e)))?;
    let items = value
        .as_array()
        .ok_or_else(|| Error::InvalidInput(format!("{} must contain a JSON array", path.display())))?;

    let mut summary = ImportSummary::default();
    let mut tx = pool.begin().await?;

    for (idx, item) in items.iter().enumerate() {
        let record = match benchmark_from_json(item) {
            Ok(record) => record,
            Err(e) => {
                warn!("Skipping benchmark element {}: {}", idx, e);
                summary.skipped += 1;
                continue;
            }
        };

        sqlx::query(
            r#"
            INSERT INTO wage_benchmarks
                (job_category, location, education, base_wage, wage_range_min, wage_range_max)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(record.job_category.trim())
        .bind(record.location.trim())
        .bind(record.education.trim())
        .bind(record.base_wage)
        .bind(record.wage_range_min)
        .bind(record.wage_range_max)
        .execute(&mut *tx)
        .await?;
        summary.imported += 1;
    }

    tx.commit().await?;

    info!(
        "Imported {} benchmark rows from {} ({} skipped)",
        summary.imported,
        path.display(),
        summary.skipped
    );
    Ok(summary)
}

/// Convert one untyped JSON object into a validated record
pub fn benchmark_from_json(item: &Value) -> Result<BenchmarkRecord> {
    let text = |name: &str| -> Result<String> {
        item.get(name)
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| Error::InvalidBenchmark(format!("missing text field '{}'", name)))
    };
    let number = |name: &str| -> Result<f64> {
        let raw = item
            .get(name)
            .ok_or_else(|| Error::InvalidBenchmark(format!("missing numeric field '{}'", name)))?;
        parse_amount(raw)
            .ok_or_else(|| Error::InvalidBenchmark(format!("field '{}' is not a number: {}", name, raw)))
    };

    BenchmarkRecord::new(
        text("job_category")?,
        text("location")?,
        text("education")?,
        number("base_wage")?,
        number("wage_range_min")?,
        number("wage_range_max")?,
    )
}

/// Parse a JSON number or numeric string
pub fn parse_amount(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(s) => parse_amount_text(s),
        _ => None,
    }
}

/// Parse a whole string as a finite number; no units or separators
pub fn parse_amount_text(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}
