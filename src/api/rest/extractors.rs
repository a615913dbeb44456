use axum::extract::{FromRequest, Multipart, Request};
use std::sync::Arc;

use crate::api::rest::error::ApiError;
use crate::shared::models::{AppState, StoredUpload};

/// The stored `codeFile` of the request. Extracting it runs the whole upload
/// pipeline, so it must be the last extractor of a handler.
#[derive(Debug, Clone)]
pub struct AcceptedUpload(pub StoredUpload);

impl FromRequest<Arc<AppState>> for AcceptedUpload {
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &Arc<AppState>) -> Result<Self, Self::Rejection> {
        let multipart = Multipart::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;

        let upload = state.uploads.accept(multipart).await?;
        Ok(AcceptedUpload(upload))
    }
}
