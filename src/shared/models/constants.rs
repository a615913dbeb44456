// Upload limits
pub const MAX_FILE_SIZE: u64 = 50 * 1024 * 1024;
pub const ALLOWED_EXTENSIONS: [&str; 4] = ["c", "py", "go", "cpp"];
pub const UPLOAD_FIELD: &str = "codeFile";

// Multipart framing allowance on top of the per-file limit
pub const MULTIPART_OVERHEAD: u64 = 1024 * 1024;

// Upload directory, relative to the working directory
pub const UPLOAD_DIR_NAME: &str = "tmp";
pub const UPLOAD_DIR_MODE: u32 = 0o750;

// Deferred deletion
pub const DEFAULT_DELETION_DELAY_MS: u64 = 5 * 60 * 1000;
