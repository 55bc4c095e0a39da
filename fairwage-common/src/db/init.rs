//! Database initialization
//!
//! Creates the database file and tables on first run; safe to call on every
//! startup.

use std::path::Path;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::info;

use crate::rules::normalize_key;
use crate::Result;

/// Collation used for benchmark key lookups: trimmed, Unicode lowercase,
/// the same comparison in-memory sources use. SQLite's built-in `NOCASE`
/// folds ASCII only.
pub const KEY_COLLATION: &str = "FAIRWAGE_KEY";

/// Connection options for the benchmark database
///
/// Every connection registers [`KEY_COLLATION`]; pools built from other
/// options cannot run benchmark lookups.
pub fn connect_options(db_path: &Path) -> SqliteConnectOptions {
    SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_millis(5000))
        .collation(KEY_COLLATION, |a: &str, b: &str| normalize_key(a).cmp(&normalize_key(b)))
}

/// Open (creating if needed) the database and ensure the schema exists
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .min_connections(1)
        .connect_with(connect_options(db_path))
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    create_schema(&pool).await?;

    Ok(pool)
}

/// Create all tables and indexes (idempotent)
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    create_wage_benchmarks_table(pool).await?;
    create_model_versions_table(pool).await?;
    Ok(())
}

async fn create_wage_benchmarks_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS wage_benchmarks (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            job_category TEXT NOT NULL,
            location TEXT NOT NULL,
            education TEXT NOT NULL,
            base_wage REAL,
            wage_range_min REAL,
            wage_range_max REAL,
            experience_min INTEGER,
            experience_max INTEGER,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_wage_benchmarks_category_location
        ON wage_benchmarks (job_category COLLATE NOCASE, location COLLATE NOCASE)
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_model_versions_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS model_versions (
            version TEXT NOT NULL,
            model_type TEXT NOT NULL,
            is_active INTEGER NOT NULL DEFAULT 0,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            PRIMARY KEY (version, model_type)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_init_creates_tables() {
        let dir = tempfile::tempdir().unwrap();
        let pool = init_database(&dir.path().join("nested/fairwage.db")).await.unwrap();

        let tables: Vec<(String,)> = sqlx::query_as(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
        )
        .fetch_all(&pool)
        .await
        .unwrap();
        let names: Vec<&str> = tables.iter().map(|(n,)| n.as_str()).collect();
        assert_eq!(names, vec!["model_versions", "wage_benchmarks"]);
    }

    #[tokio::test]
    async fn test_init_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fairwage.db");
        let first = init_database(&path).await.unwrap();
        drop(first);
        let second = init_database(&path).await;
        assert!(second.is_ok(), "Failed to reopen: {:?}", second.err());
    }
}
