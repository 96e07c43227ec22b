//! Bulk CSV import handler.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Extension, Json,
};
use beatdb_core::{ImportError, ImportSummary, RowFailure};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct ImportRequest {
    #[serde(default, alias = "csvData")]
    pub csv_data: Option<String>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub(super) struct ImportCounts {
    pub total: usize,
    pub inserted: usize,
    pub skipped: usize,
    pub errors: usize,
}

#[derive(Debug, Serialize)]
pub(super) struct ImportReport {
    pub success: bool,
    pub summary: ImportCounts,
    pub errors: Vec<RowFailure>,
}

impl From<ImportSummary> for ImportReport {
    fn from(summary: ImportSummary) -> Self {
        Self {
            success: true,
            summary: ImportCounts {
                total: summary.total_rows,
                inserted: summary.inserted,
                skipped: summary.skipped,
                errors: summary.error_count,
            },
            errors: summary.errors,
        }
    }
}

fn map_json_rejection(request_id: &str, rejection: &JsonRejection) -> ApiError {
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return ApiError::new(
            request_id,
            "payload_too_large",
            "CSV payload exceeds the configured import limit",
        );
    }
    ApiError::new(request_id, "bad_request", rejection.body_text())
}

/// POST /api/v1/stores/import: import stores from raw CSV text.
pub(super) async fn import_stores(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    payload: Result<Json<ImportRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<ImportReport>>, ApiError> {
    let rid = &req_id.0;

    let Json(body) = payload.map_err(|rejection| map_json_rejection(rid, &rejection))?;

    let csv_data = body
        .csv_data
        .filter(|data| !data.trim().is_empty())
        .ok_or_else(|| ApiError::new(rid, "validation_error", "no CSV data provided"))?;

    let repo = beatdb_db::PgStoreRepository::new(state.pool.clone());
    let summary = beatdb_core::import_csv(&repo, &csv_data)
        .await
        .map_err(|e| match e {
            ImportError::Validation(message) => ApiError::new(rid, "validation_error", message),
        })?;

    tracing::info!(
        total = summary.total_rows,
        inserted = summary.inserted,
        skipped = summary.skipped,
        "csv import completed"
    );

    Ok(Json(ApiResponse::new(ImportReport::from(summary), req_id.0)))
}
