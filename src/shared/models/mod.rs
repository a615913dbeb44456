use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::multipart::MultipartError;
use thiserror::Error;

use crate::shared::deletion::DeletionScheduler;
use crate::shared::upload::UploadHandler;

pub mod constants;

// Upload errors
#[derive(Error, Debug)]
pub enum UploadError {
    #[error("Failed to set up upload storage")]
    StorageSetup(#[source] std::io::Error),
    #[error("Invalid file type. Allowed types: {allowed}")]
    InvalidFileType { allowed: String },
    #[error("File too large. Maximum size is {limit} bytes")]
    FileTooLarge { limit: u64 },
    #[error("Too many files. Only one file may be uploaded per request")]
    TooManyFiles,
    #[error("Unexpected file field '{field}'. Files must be sent as '{expected}'")]
    UnexpectedField { field: String, expected: String },
    #[error("No file uploaded under field '{0}'")]
    MissingFile(String),
    #[error("Malformed multipart request: {0}")]
    Multipart(#[from] MultipartError),
    #[error("Failed to store uploaded file")]
    Write(#[source] std::io::Error),
}

/// A file that passed every check and now lives in the upload directory.
#[derive(Debug, Clone)]
pub struct StoredUpload {
    pub path: PathBuf,
    pub stored_name: String,
    pub original_name: String,
    pub size: u64,
    /// Non-file parts that arrived alongside the file.
    pub fields: HashMap<String, String>,
}

// Application state
#[derive(Clone)]
pub struct AppState {
    pub uploads: Arc<UploadHandler>,
    pub deletions: DeletionScheduler,
}
