//! Database operations for the `settings` key/value table.

use beatdb_core::{DataVisibility, DATA_VISIBILITY_KEY};
use chrono::{DateTime, Utc};
use sqlx::PgPool;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SettingRow {
    pub key: String,
    pub value: String,
    pub updated_at: DateTime<Utc>,
}

/// List every setting, ordered by key.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn list_settings(pool: &PgPool) -> Result<Vec<SettingRow>, sqlx::Error> {
    sqlx::query_as::<_, SettingRow>("SELECT key, value, updated_at FROM settings ORDER BY key")
        .fetch_all(pool)
        .await
}

/// Fetch one setting by key.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn get_setting(pool: &PgPool, key: &str) -> Result<Option<SettingRow>, sqlx::Error> {
    sqlx::query_as::<_, SettingRow>("SELECT key, value, updated_at FROM settings WHERE key = $1")
        .bind(key)
        .fetch_optional(pool)
        .await
}

/// Insert or overwrite a setting and return the stored row.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn upsert_setting(
    pool: &PgPool,
    key: &str,
    value: &str,
) -> Result<SettingRow, sqlx::Error> {
    sqlx::query_as::<_, SettingRow>(
        "INSERT INTO settings (key, value) VALUES ($1, $2) \
         ON CONFLICT (key) DO UPDATE SET \
             value      = EXCLUDED.value, \
             updated_at = NOW() \
         RETURNING key, value, updated_at",
    )
    .bind(key)
    .bind(value)
    .fetch_one(pool)
    .await
}

/// Read the store data visibility flag; visible when unset.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn get_data_visibility(pool: &PgPool) -> Result<DataVisibility, sqlx::Error> {
    let row = get_setting(pool, DATA_VISIBILITY_KEY).await?;
    Ok(DataVisibility::from_setting(
        row.as_ref().map(|r| r.value.as_str()),
    ))
}
