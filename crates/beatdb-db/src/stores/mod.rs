//! Database operations for the `stores` table.

mod read;
mod types;
mod write;

pub use read::{count_stores, find_matching_store, list_stores};
pub use types::{NewStore, StoreFilter, StoreRow};
pub use write::{delete_all_stores, delete_store, insert_store};
