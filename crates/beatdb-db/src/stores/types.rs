//! Row types for the `stores` table.

use chrono::{DateTime, Utc};

/// Input record for inserting a store.
///
/// Both legacy name columns are written; callers usually pass the same
/// display name for each.
#[derive(Debug, Clone)]
pub struct NewStore {
    pub shop: String,
    pub store_name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub salesman_name: Option<String>,
    pub beat_name: Option<String>,
}

/// A row from the `stores` table.
///
/// Coordinates are read back as `float8` from their `NUMERIC(9,6)` columns.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StoreRow {
    pub id: i64,
    pub shop: Option<String>,
    pub store_name: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub salesman_name: Option<String>,
    pub beat_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl StoreRow {
    /// `shop`, falling back to `store_name`, falling back to empty.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.shop
            .as_deref()
            .filter(|s| !s.is_empty())
            .or(self.store_name.as_deref())
            .unwrap_or_default()
    }
}

/// Optional filters for store listings.
#[derive(Debug, Clone, Default)]
pub struct StoreFilter {
    /// Case-insensitive substring match on either name column.
    pub q: Option<String>,
    /// Exact match on `beat_name`.
    pub beat: Option<String>,
    /// Exact match on `salesman_name`.
    pub salesman: Option<String>,
}
