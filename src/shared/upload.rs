use std::collections::HashMap;
use std::path::Path;

use axum::extract::multipart::{Field, Multipart};
use tokio::io::AsyncWriteExt;
use tracing::{error, info, warn};

use crate::shared::config::UploadConfig;
use crate::shared::models::{StoredUpload, UploadError};
use crate::shared::naming::{is_allowed_extension, stored_file_name};
use crate::shared::storage::ensure_secure_directory;

/// Accepts one code file per multipart request and writes it to the upload
/// directory under a randomized name.
#[derive(Debug, Clone)]
pub struct UploadHandler {
    config: UploadConfig,
}

impl UploadHandler {
    pub fn new(config: UploadConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &UploadConfig {
        &self.config
    }

    /// Consume the request parts. On any error the stored file, if one was
    /// already written, is removed again.
    pub async fn accept(&self, mut multipart: Multipart) -> Result<StoredUpload, UploadError> {
        let mut stored: Option<StoredUpload> = None;
        let mut fields = HashMap::new();

        if let Err(e) = self.read_parts(&mut multipart, &mut stored, &mut fields).await {
            if let Some(upload) = stored {
                discard(&upload.path).await;
            }
            warn!(error = %e, "Upload rejected");
            return Err(e);
        }

        match stored {
            Some(mut upload) => {
                upload.fields = fields;
                Ok(upload)
            }
            None => {
                warn!(field = %self.config.field_name, "Upload rejected: no file part");
                Err(UploadError::MissingFile(self.config.field_name.clone()))
            }
        }
    }

    async fn read_parts(
        &self,
        multipart: &mut Multipart,
        stored: &mut Option<StoredUpload>,
        fields: &mut HashMap<String, String>,
    ) -> Result<(), UploadError> {
        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();

            let Some(original_name) = field.file_name().map(str::to_string) else {
                let value = field.text().await?;
                fields.insert(name, value);
                continue;
            };

            if name != self.config.field_name {
                return Err(UploadError::UnexpectedField {
                    field: name,
                    expected: self.config.field_name.clone(),
                });
            }
            if stored.is_some() {
                return Err(UploadError::TooManyFiles);
            }

            *stored = Some(self.store_file(field, original_name).await?);
        }
        Ok(())
    }

    async fn store_file(
        &self,
        mut field: Field<'_>,
        original_name: String,
    ) -> Result<StoredUpload, UploadError> {
        if !is_allowed_extension(&original_name, &self.config.allowed_extensions) {
            return Err(UploadError::InvalidFileType {
                allowed: self.config.allowed_list(),
            });
        }

        ensure_secure_directory(&self.config.upload_dir, self.config.dir_mode)
            .await
            .map_err(|e| {
                error!(
                    dir = %self.config.upload_dir.display(),
                    error = %e,
                    "Failed to set up upload directory"
                );
                UploadError::StorageSetup(e)
            })?;

        let stored_name = stored_file_name(&original_name);
        let path = self.config.upload_dir.join(&stored_name);

        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(|e| {
                error!(path = %path.display(), error = %e, "Failed to create upload file");
                UploadError::Write(e)
            })?;

        let size = match self.copy_field(&mut field, &mut file).await {
            Ok(size) => size,
            Err(e) => {
                drop(file);
                discard(&path).await;
                return Err(e);
            }
        };

        info!(
            original = %original_name,
            stored = %stored_name,
            size = size,
            "Stored uploaded file"
        );

        Ok(StoredUpload {
            path,
            stored_name,
            original_name,
            size,
            fields: HashMap::new(),
        })
    }

    async fn copy_field(
        &self,
        field: &mut Field<'_>,
        file: &mut tokio::fs::File,
    ) -> Result<u64, UploadError> {
        let limit = self.config.max_file_size;
        let mut size: u64 = 0;

        while let Some(chunk) = field.chunk().await? {
            size += chunk.len() as u64;
            if size > limit {
                return Err(UploadError::FileTooLarge { limit });
            }
            file.write_all(&chunk).await.map_err(UploadError::Write)?;
        }
        file.flush().await.map_err(UploadError::Write)?;

        Ok(size)
    }
}

async fn discard(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            error!("Failed to remove rejected upload {}: {}", path.display(), e);
        }
    }
}
