//! Write operations for the `stores` table.

use beatdb_core::round_coordinate;
use sqlx::PgPool;

use super::types::{NewStore, StoreRow};

/// Insert a single store and return the stored row.
///
/// Coordinates go through [`round_coordinate`] before binding, the same as
/// in [`super::find_matching_store`]; the `NUMERIC(9,6)` cast then stores the
/// already-rounded value exactly.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the insert fails, including when a coordinate
/// does not fit `NUMERIC(9,6)`.
pub async fn insert_store(pool: &PgPool, store: &NewStore) -> Result<StoreRow, sqlx::Error> {
    sqlx::query_as::<_, StoreRow>(
        "INSERT INTO stores \
             (shop, store_name, latitude, longitude, salesman_name, beat_name) \
         VALUES ($1, $2, $3::NUMERIC(9,6), $4::NUMERIC(9,6), $5, $6) \
         RETURNING id, shop, store_name, \
                   latitude::float8 AS latitude, longitude::float8 AS longitude, \
                   salesman_name, beat_name, created_at",
    )
    .bind(&store.shop)
    .bind(&store.store_name)
    .bind(round_coordinate(store.latitude))
    .bind(round_coordinate(store.longitude))
    .bind(&store.salesman_name)
    .bind(&store.beat_name)
    .fetch_one(pool)
    .await
}

/// Delete one store by id. Returns `false` when no row had that id.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn delete_store(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
    let rows_affected = sqlx::query("DELETE FROM stores WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?
        .rows_affected();

    Ok(rows_affected > 0)
}

/// Delete every store. Returns the number of rows removed.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn delete_all_stores(pool: &PgPool) -> Result<u64, sqlx::Error> {
    let rows_affected = sqlx::query("DELETE FROM stores")
        .execute(pool)
        .await?
        .rows_affected();

    Ok(rows_affected)
}
