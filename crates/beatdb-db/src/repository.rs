//! Postgres-backed [`StoreRepository`] for the CSV importer.

use beatdb_core::{StoreRecord, StoreRepository};
use sqlx::PgPool;

use crate::stores::{find_matching_store, insert_store, NewStore, StoreRow};
use crate::DbError;

/// Importer persistence over the `stores` table.
///
/// Cheap to clone; holds only the pool handle.
#[derive(Debug, Clone)]
pub struct PgStoreRepository {
    pool: PgPool,
}

impl PgStoreRepository {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl StoreRepository for PgStoreRepository {
    type Error = DbError;

    async fn find_matching(
        &self,
        names: &[&str],
        latitude: f64,
        longitude: f64,
    ) -> Result<Option<StoreRecord>, DbError> {
        let names: Vec<String> = names.iter().map(|n| (*n).to_owned()).collect();
        let row = find_matching_store(&self.pool, &names, latitude, longitude).await?;
        Ok(row.map(to_record))
    }

    async fn create(&self, record: StoreRecord) -> Result<StoreRecord, DbError> {
        let new_store = NewStore {
            shop: record.display_name.clone(),
            store_name: record.display_name,
            latitude: record.latitude,
            longitude: record.longitude,
            salesman_name: Some(record.salesman_name),
            beat_name: Some(record.beat_name),
        };
        let row = insert_store(&self.pool, &new_store).await?;
        Ok(to_record(row))
    }
}

fn to_record(row: StoreRow) -> StoreRecord {
    StoreRecord {
        display_name: row.display_name().to_owned(),
        latitude: row.latitude,
        longitude: row.longitude,
        salesman_name: row.salesman_name.unwrap_or_default(),
        beat_name: row.beat_name.unwrap_or_default(),
    }
}
