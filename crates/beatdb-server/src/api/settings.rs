use std::collections::BTreeMap;

use axum::{extract::State, Extension, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{map_db_error, ApiError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct UpsertSettingRequest {
    pub key: Option<String>,
    pub value: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct SettingsView {
    pub settings: BTreeMap<String, String>,
    pub data_visible: bool,
}

#[derive(Debug, Serialize)]
pub(super) struct SettingItem {
    pub key: String,
    pub value: String,
    pub updated_at: DateTime<Utc>,
    pub data_visible: bool,
}

/// GET /api/v1/settings
pub(super) async fn list_settings(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<SettingsView>>, ApiError> {
    let rows = beatdb_db::list_settings(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &beatdb_db::DbError::from(e)))?;

    let visibility = beatdb_core::DataVisibility::from_setting(
        rows.iter()
            .find(|r| r.key == beatdb_core::DATA_VISIBILITY_KEY)
            .map(|r| r.value.as_str()),
    );

    let data = SettingsView {
        settings: rows.into_iter().map(|r| (r.key, r.value)).collect(),
        data_visible: visibility.is_visible(),
    };

    Ok(Json(ApiResponse::new(data, req_id.0)))
}

/// POST /api/v1/settings
pub(super) async fn upsert_setting(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<UpsertSettingRequest>,
) -> Result<Json<ApiResponse<SettingItem>>, ApiError> {
    let rid = &req_id.0;

    let key = body
        .key
        .map(|k| k.trim().to_owned())
        .filter(|k| !k.is_empty())
        .ok_or_else(|| ApiError::new(rid, "validation_error", "key is required"))?;
    let value = body
        .value
        .ok_or_else(|| ApiError::new(rid, "validation_error", "value is required"))?;

    let row = beatdb_db::upsert_setting(&state.pool, &key, &value)
        .await
        .map_err(|e| map_db_error(rid.clone(), &beatdb_db::DbError::from(e)))?;
    let visibility = beatdb_db::get_data_visibility(&state.pool)
        .await
        .map_err(|e| map_db_error(rid.clone(), &beatdb_db::DbError::from(e)))?;

    tracing::info!(key = %row.key, "updated setting");

    let data = SettingItem {
        key: row.key,
        value: row.value,
        updated_at: row.updated_at,
        data_visible: visibility.is_visible(),
    };
    Ok(Json(ApiResponse::new(data, req_id.0)))
}
