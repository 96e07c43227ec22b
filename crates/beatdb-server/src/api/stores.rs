//! Store listing, single-store creation, and deletion handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{map_db_error, normalize_limit, normalize_page, ApiError, ApiResponse, AppState};

const UNASSIGNED: &str = "Unassigned";

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(super) struct StoreListQuery {
    pub q: Option<String>,
    pub beat: Option<String>,
    pub salesman: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// A coordinate supplied either as a JSON number or a numeric string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(super) enum CoordinateInput {
    Number(f64),
    Text(String),
}

impl CoordinateInput {
    fn value(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => s.trim().parse::<f64>().ok(),
        }
        .filter(|v| v.is_finite())
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct CreateStoreRequest {
    pub shop: Option<String>,
    pub store_name: Option<String>,
    pub latitude: Option<CoordinateInput>,
    pub longitude: Option<CoordinateInput>,
    pub salesman: Option<String>,
    pub beat: Option<String>,
}

// ---------------------------------------------------------------------------
// Response bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub(super) struct StoreItem {
    pub id: i64,
    pub shop: String,
    pub latitude: f64,
    pub longitude: f64,
    pub salesman: String,
    pub beat: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub(super) struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub total_pages: i64,
}

#[derive(Debug, Serialize)]
pub(super) struct StoreList {
    pub data_visible: bool,
    pub stores: Vec<StoreItem>,
    pub pagination: Pagination,
}

#[derive(Debug, Serialize)]
pub(super) struct DeleteResult {
    pub deleted: u64,
}

impl From<beatdb_db::StoreRow> for StoreItem {
    fn from(row: beatdb_db::StoreRow) -> Self {
        Self {
            id: row.id,
            shop: row.display_name().to_owned(),
            latitude: row.latitude,
            longitude: row.longitude,
            salesman: non_empty_or_unassigned(row.salesman_name),
            beat: non_empty_or_unassigned(row.beat_name),
            created_at: row.created_at,
        }
    }
}

fn non_empty_or_unassigned(value: Option<String>) -> String {
    value
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| UNASSIGNED.to_owned())
}

impl Pagination {
    pub(super) fn new(page: i64, limit: i64, total: i64) -> Self {
        Self {
            page,
            limit,
            total,
            total_pages: (total + limit - 1) / limit,
        }
    }
}

fn filter_value(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_owned()).filter(|v| !v.is_empty())
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/stores: paginated, filterable store listing.
pub(super) async fn list_stores(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(params): Query<StoreListQuery>,
) -> Result<Json<ApiResponse<StoreList>>, ApiError> {
    let page = normalize_page(params.page);
    let limit = normalize_limit(params.limit);
    let offset = (page - 1).saturating_mul(limit);

    let filter = beatdb_db::StoreFilter {
        q: filter_value(params.q),
        beat: filter_value(params.beat),
        salesman: filter_value(params.salesman),
    };

    let visibility = beatdb_db::get_data_visibility(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &beatdb_db::DbError::from(e)))?;

    let (rows, total) = tokio::try_join!(
        beatdb_db::list_stores(&state.pool, &filter, limit, offset),
        beatdb_db::count_stores(&state.pool, &filter),
    )
    .map_err(|e| map_db_error(req_id.0.clone(), &beatdb_db::DbError::from(e)))?;

    let data = StoreList {
        data_visible: visibility.is_visible(),
        stores: rows.into_iter().map(StoreItem::from).collect(),
        pagination: Pagination::new(page, limit, total),
    };

    Ok(Json(ApiResponse::new(data, req_id.0)))
}

/// POST /api/v1/stores: create a single store.
pub(super) async fn create_store(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<CreateStoreRequest>,
) -> Result<(StatusCode, Json<ApiResponse<StoreItem>>), ApiError> {
    let rid = &req_id.0;

    let shop = filter_value(body.shop);
    let store_name = filter_value(body.store_name);
    let (shop, store_name) = match (shop, store_name) {
        (Some(shop), Some(store_name)) => (shop, store_name),
        (Some(name), None) | (None, Some(name)) => (name.clone(), name),
        (None, None) => {
            return Err(ApiError::new(
                rid,
                "validation_error",
                "shop or store_name is required",
            ))
        }
    };

    let latitude = validate_coordinate(rid, "latitude", body.latitude.as_ref(), 90.0)?;
    let longitude = validate_coordinate(rid, "longitude", body.longitude.as_ref(), 180.0)?;

    let new_store = beatdb_db::NewStore {
        shop,
        store_name,
        latitude,
        longitude,
        salesman_name: filter_value(body.salesman),
        beat_name: filter_value(body.beat),
    };

    let row = beatdb_db::insert_store(&state.pool, &new_store)
        .await
        .map_err(|e| map_db_error(rid.clone(), &beatdb_db::DbError::from(e)))?;

    tracing::info!(store_id = row.id, "created store");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(StoreItem::from(row), req_id.0)),
    ))
}

fn validate_coordinate(
    req_id: &str,
    field: &str,
    value: Option<&CoordinateInput>,
    bound: f64,
) -> Result<f64, ApiError> {
    let parsed = value.and_then(CoordinateInput::value).ok_or_else(|| {
        ApiError::new(
            req_id,
            "validation_error",
            format!("{field} must be a number"),
        )
    })?;

    if parsed.abs() > bound {
        return Err(ApiError::new(
            req_id,
            "validation_error",
            format!("{field} must be between -{bound} and {bound}"),
        ));
    }
    Ok(parsed)
}

/// DELETE /api/v1/stores/{id}: delete one store.
pub(super) async fn delete_store(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<DeleteResult>>, ApiError> {
    let rid = &req_id.0;

    // `all` is accepted for clients that address bulk delete by id.
    if id == "all" {
        return delete_everything(&state, req_id).await;
    }

    let id: i64 = id.parse().map_err(|_| {
        ApiError::new(
            rid,
            "validation_error",
            format!("store id must be an integer, got '{id}'"),
        )
    })?;

    let deleted = beatdb_db::delete_store(&state.pool, id)
        .await
        .map_err(|e| map_db_error(rid.clone(), &beatdb_db::DbError::from(e)))?;

    if !deleted {
        return Err(ApiError::new(
            rid,
            "not_found",
            format!("store {id} not found"),
        ));
    }

    tracing::info!(store_id = id, "deleted store");
    Ok(Json(ApiResponse::new(DeleteResult { deleted: 1 }, req_id.0)))
}

/// DELETE /api/v1/stores: delete every store.
pub(super) async fn delete_all_stores(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<DeleteResult>>, ApiError> {
    delete_everything(&state, req_id).await
}

async fn delete_everything(
    state: &AppState,
    req_id: RequestId,
) -> Result<Json<ApiResponse<DeleteResult>>, ApiError> {
    let deleted = beatdb_db::delete_all_stores(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &beatdb_db::DbError::from(e)))?;

    tracing::warn!(deleted, "deleted all stores");
    Ok(Json(ApiResponse::new(DeleteResult { deleted }, req_id.0)))
}
