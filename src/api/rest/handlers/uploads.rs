use std::collections::HashMap;
use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use serde::Serialize;

use crate::api::rest::error::ApiResult;
use crate::api::rest::extractors::AcceptedUpload;
use crate::shared::models::AppState;

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub stored_name: String,
    pub original_name: String,
    pub size: u64,
    pub path: String,
    pub delete_after_ms: u64,
    pub expires_at: String,
    pub fields: HashMap<String, String>,
}

pub async fn create_upload(
    State(state): State<Arc<AppState>>,
    AcceptedUpload(upload): AcceptedUpload,
) -> ApiResult<(StatusCode, Json<UploadResponse>)> {
    let delay = state.deletions.default_delay();
    // Detached: the file is removed even though nobody awaits the handle.
    let _ = state.deletions.schedule_default(&upload.path);

    let expires_at = chrono::Duration::from_std(delay)
        .map(|d| Utc::now() + d)
        .unwrap_or_else(|_| Utc::now());

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            stored_name: upload.stored_name,
            original_name: upload.original_name,
            size: upload.size,
            path: upload.path.display().to_string(),
            delete_after_ms: u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            expires_at: expires_at.to_rfc3339(),
            fields: upload.fields,
        }),
    ))
}
