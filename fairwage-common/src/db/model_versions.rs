//! Model version registry
//!
//! The active row for a model type supplies the `modelVersion` tag reported
//! with predictions, so a recalibrated profile can be rolled out by data.

use sqlx::SqlitePool;

use crate::Result;

/// Version tag of the active model for `model_type`, if any
pub async fn active_model_version(pool: &SqlitePool, model_type: &str) -> Result<Option<String>> {
    let version: Option<String> = sqlx::query_scalar(
        r#"
        SELECT version FROM model_versions
        WHERE model_type = ? AND is_active = 1
        ORDER BY created_at DESC, version DESC
        LIMIT 1
        "#,
    )
    .bind(model_type)
    .fetch_optional(pool)
    .await?;

    Ok(version)
}

/// Register a version; when `activate` is set, every other version of the
/// same model type is deactivated in the same transaction
pub async fn register_model_version(
    pool: &SqlitePool,
    version: &str,
    model_type: &str,
    activate: bool,
) -> Result<()> {
    let mut tx = pool.begin().await?;

    if activate {
        sqlx::query("UPDATE model_versions SET is_active = 0 WHERE model_type = ?")
            .bind(model_type)
            .execute(&mut *tx)
            .await?;
    }

    sqlx::query(
        r#"
        INSERT INTO model_versions (version, model_type, is_active)
        VALUES (?, ?, ?)
        ON CONFLICT (version, model_type) DO UPDATE SET is_active = excluded.is_active
        "#,
    )
    .bind(version)
    .bind(model_type)
    .bind(activate as i64)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_database;

    #[tokio::test]
    async fn test_no_active_version() {
        let dir = tempfile::tempdir().unwrap();
        let pool = init_database(&dir.path().join("fairwage.db")).await.unwrap();
        assert_eq!(active_model_version(&pool, "ensemble_statistical_v2").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_activation_replaces_previous() {
        let dir = tempfile::tempdir().unwrap();
        let pool = init_database(&dir.path().join("fairwage.db")).await.unwrap();

        register_model_version(&pool, "v2.0-ensemble", "ensemble_statistical_v2", true).await.unwrap();
        register_model_version(&pool, "v2.1-ensemble", "ensemble_statistical_v2", true).await.unwrap();
        register_model_version(&pool, "v1.0-statistical", "statistical_v1", true).await.unwrap();
        register_model_version(&pool, "v2.2-draft", "ensemble_statistical_v2", false).await.unwrap();

        assert_eq!(
            active_model_version(&pool, "ensemble_statistical_v2").await.unwrap().as_deref(),
            Some("v2.1-ensemble")
        );
        assert_eq!(
            active_model_version(&pool, "statistical_v1").await.unwrap().as_deref(),
            Some("v1.0-statistical")
        );
    }
}
