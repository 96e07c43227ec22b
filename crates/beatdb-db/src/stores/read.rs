//! Read operations for the `stores` table.

use beatdb_core::round_coordinate;
use sqlx::PgPool;

use super::types::{StoreFilter, StoreRow};

/// List stores matching `filter`, ordered by `shop ASC`.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn list_stores(
    pool: &PgPool,
    filter: &StoreFilter,
    limit: i64,
    offset: i64,
) -> Result<Vec<StoreRow>, sqlx::Error> {
    sqlx::query_as::<_, StoreRow>(
        "SELECT id, shop, store_name, \
                latitude::float8 AS latitude, longitude::float8 AS longitude, \
                salesman_name, beat_name, created_at \
         FROM stores \
         WHERE ($1::TEXT IS NULL OR shop ILIKE $1 OR store_name ILIKE $1) \
           AND ($2::TEXT IS NULL OR beat_name = $2) \
           AND ($3::TEXT IS NULL OR salesman_name = $3) \
         ORDER BY shop ASC NULLS LAST, id ASC \
         LIMIT $4 OFFSET $5",
    )
    .bind(search_pattern(filter.q.as_deref()))
    .bind(filter.beat.as_deref())
    .bind(filter.salesman.as_deref())
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
}

/// Count stores matching `filter`.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn count_stores(pool: &PgPool, filter: &StoreFilter) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM stores \
         WHERE ($1::TEXT IS NULL OR shop ILIKE $1 OR store_name ILIKE $1) \
           AND ($2::TEXT IS NULL OR beat_name = $2) \
           AND ($3::TEXT IS NULL OR salesman_name = $3)",
    )
    .bind(search_pattern(filter.q.as_deref()))
    .bind(filter.beat.as_deref())
    .bind(filter.salesman.as_deref())
    .fetch_one(pool)
    .await
}

/// Find a store whose `shop` or `store_name` is one of `names` at the given
/// coordinates.
///
/// Coordinates go through [`round_coordinate`] before binding, the same
/// rounding [`super::insert_store`] applies, so a value read from a CSV
/// matches what an earlier import stored. Returns the oldest match.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn find_matching_store(
    pool: &PgPool,
    names: &[String],
    latitude: f64,
    longitude: f64,
) -> Result<Option<StoreRow>, sqlx::Error> {
    sqlx::query_as::<_, StoreRow>(
        "SELECT id, shop, store_name, \
                latitude::float8 AS latitude, longitude::float8 AS longitude, \
                salesman_name, beat_name, created_at \
         FROM stores \
         WHERE (shop = ANY($1::text[]) OR store_name = ANY($1::text[])) \
           AND latitude = $2::NUMERIC(9,6) \
           AND longitude = $3::NUMERIC(9,6) \
         ORDER BY id ASC \
         LIMIT 1",
    )
    .bind(names)
    .bind(round_coordinate(latitude))
    .bind(round_coordinate(longitude))
    .fetch_optional(pool)
    .await
}

/// Build an `ILIKE` substring pattern, escaping the wildcard characters.
fn search_pattern(q: Option<&str>) -> Option<String> {
    let q = q.map(str::trim).filter(|s| !s.is_empty())?;
    let mut pattern = String::with_capacity(q.len() + 2);
    pattern.push('%');
    for ch in q.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    Some(pattern)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_pattern_wraps_and_escapes() {
        assert_eq!(search_pattern(Some("mart")).as_deref(), Some("%mart%"));
        assert_eq!(search_pattern(Some("50%_off")).as_deref(), Some("%50\\%\\_off%"));
    }

    #[test]
    fn search_pattern_ignores_blank_queries() {
        assert_eq!(search_pattern(None), None);
        assert_eq!(search_pattern(Some("   ")), None);
    }
}
