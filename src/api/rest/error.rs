use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;

use crate::shared::models::UploadError;

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    PayloadTooLarge(String),
    Storage(String),
    Internal(anyhow::Error),
}

#[derive(Serialize)]
struct ErrorResponse {
    message: String,
}

pub type ApiResult<T> = Result<T, ApiError>;

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::PayloadTooLarge(msg) => (StatusCode::PAYLOAD_TOO_LARGE, msg),
            ApiError::Storage(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            ApiError::Internal(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Internal error: {}", e),
            ),
        };
        (status, Json(ErrorResponse { message })).into_response()
    }
}

impl From<UploadError> for ApiError {
    fn from(e: UploadError) -> Self {
        match e {
            UploadError::FileTooLarge { .. } => ApiError::PayloadTooLarge(e.to_string()),
            UploadError::Multipart(ref inner) => {
                if inner.status() == StatusCode::PAYLOAD_TOO_LARGE {
                    ApiError::PayloadTooLarge(inner.body_text())
                } else {
                    ApiError::BadRequest(e.to_string())
                }
            }
            // io details stay in the logs
            UploadError::StorageSetup(_) | UploadError::Write(_) => {
                ApiError::Storage(e.to_string())
            }
            UploadError::InvalidFileType { .. }
            | UploadError::TooManyFiles
            | UploadError::UnexpectedField { .. }
            | UploadError::MissingFile(_) => ApiError::BadRequest(e.to_string()),
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        ApiError::Internal(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_errors_map_to_status() {
        let cases = [
            (
                UploadError::InvalidFileType {
                    allowed: "c, py".to_string(),
                },
                StatusCode::BAD_REQUEST,
            ),
            (
                UploadError::FileTooLarge { limit: 10 },
                StatusCode::PAYLOAD_TOO_LARGE,
            ),
            (UploadError::TooManyFiles, StatusCode::BAD_REQUEST),
            (
                UploadError::MissingFile("codeFile".to_string()),
                StatusCode::BAD_REQUEST,
            ),
            (
                UploadError::StorageSetup(std::io::Error::other("disk on fire")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            let response = ApiError::from(err).into_response();
            assert_eq!(response.status(), status);
        }
    }

    #[test]
    fn test_storage_error_hides_io_details() {
        let err = UploadError::StorageSetup(std::io::Error::other("/secret/path denied"));
        match ApiError::from(err) {
            ApiError::Storage(msg) => {
                assert_eq!(msg, "Failed to set up upload storage");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
