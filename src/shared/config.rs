use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Result};
use clap::Parser;

use crate::shared::models::constants::{
    ALLOWED_EXTENSIONS, DEFAULT_DELETION_DELAY_MS, MAX_FILE_SIZE, MULTIPART_OVERHEAD,
    UPLOAD_DIR_MODE, UPLOAD_DIR_NAME, UPLOAD_FIELD,
};

/// Process configuration, read from flags or the environment.
#[derive(Debug, Clone, Parser)]
#[command(name = "codedrop-api", version, about = "Code file upload service")]
pub struct ServerConfig {
    #[arg(long, env = "CODEDROP_HOST", default_value = "0.0.0.0")]
    pub host: String,
    #[arg(long, env = "CODEDROP_PORT", default_value_t = 9000)]
    pub port: u16,
    #[arg(long, env = "CODEDROP_LOG_DIR", default_value = "logs")]
    pub log_dir: String,
    /// Defaults to `<working directory>/tmp`
    #[arg(long, env = "CODEDROP_UPLOAD_DIR")]
    pub upload_dir: Option<PathBuf>,
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host.trim(), self.port)
    }

    pub fn upload_config(&self) -> Result<UploadConfig> {
        let mut config = UploadConfig::in_working_dir()?;
        if let Some(dir) = &self.upload_dir {
            config.upload_dir = absolutize(dir)?;
        }
        Ok(config)
    }
}

/// Immutable settings handed to the upload handler at construction.
#[derive(Debug, Clone)]
pub struct UploadConfig {
    pub upload_dir: PathBuf,
    pub dir_mode: u32,
    pub max_file_size: u64,
    pub allowed_extensions: Vec<String>,
    pub field_name: String,
    pub deletion_delay: Duration,
}

impl UploadConfig {
    pub fn new(upload_dir: PathBuf) -> Self {
        Self {
            upload_dir,
            dir_mode: UPLOAD_DIR_MODE,
            max_file_size: MAX_FILE_SIZE,
            allowed_extensions: ALLOWED_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            field_name: UPLOAD_FIELD.to_string(),
            deletion_delay: Duration::from_millis(DEFAULT_DELETION_DELAY_MS),
        }
    }

    pub fn in_working_dir() -> Result<Self> {
        let cwd = std::env::current_dir()
            .map_err(|e| anyhow!("Failed to resolve working directory: {}", e))?;
        Ok(Self::new(cwd.join(UPLOAD_DIR_NAME)))
    }

    /// Largest request body the upload route will read.
    pub fn max_request_body(&self) -> usize {
        usize::try_from(self.max_file_size.saturating_add(MULTIPART_OVERHEAD))
            .unwrap_or(usize::MAX)
    }

    pub fn allowed_list(&self) -> String {
        self.allowed_extensions.join(", ")
    }
}

fn absolutize(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir()
        .map_err(|e| anyhow!("Failed to resolve working directory: {}", e))?;
    Ok(cwd.join(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_fixed_limits() {
        let config = UploadConfig::new(PathBuf::from("/srv/uploads"));
        assert_eq!(config.max_file_size, 50 * 1024 * 1024);
        assert_eq!(config.field_name, "codeFile");
        assert_eq!(config.deletion_delay, Duration::from_millis(300_000));
        assert_eq!(config.dir_mode, 0o750);
        assert_eq!(config.allowed_list(), "c, py, go, cpp");
    }

    #[test]
    fn test_request_body_allows_framing() {
        let config = UploadConfig::new(PathBuf::from("/srv/uploads"));
        assert!(config.max_request_body() as u64 > config.max_file_size);
    }

    #[test]
    fn test_server_config_parses_flags() {
        let config = ServerConfig::parse_from([
            "codedrop-api",
            "--host",
            "127.0.0.1",
            "--port",
            "8088",
            "--upload-dir",
            "/var/lib/codedrop",
        ]);
        assert_eq!(config.bind_addr(), "127.0.0.1:8088");
        let upload = config.upload_config().unwrap();
        assert_eq!(upload.upload_dir, PathBuf::from("/var/lib/codedrop"));
    }

    #[test]
    fn test_relative_upload_dir_is_made_absolute() {
        let config = ServerConfig::parse_from(["codedrop-api", "--upload-dir", "incoming"]);
        let upload = config.upload_config().unwrap();
        assert!(upload.upload_dir.is_absolute());
        assert!(upload.upload_dir.ends_with("incoming"));
    }
}
