use std::io;
use std::path::Path;

use tracing::{debug, warn};

/// Create `path` (and parents) with `mode` if missing, and tighten it back to
/// `mode` when an existing directory grants anything to "others".
///
/// Safe to call from concurrent requests: a recursive create tolerates the
/// directory appearing underneath it, and a racing reset only repeats the
/// same `chmod`.
pub async fn ensure_secure_directory(path: &Path, mode: u32) -> io::Result<()> {
    let mut builder = tokio::fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    builder.mode(mode);
    builder.create(path).await?;

    let metadata = tokio::fs::metadata(path).await?;
    if !metadata.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("{} exists and is not a directory", path.display()),
        ));
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;

        let current = metadata.permissions().mode() & 0o777;
        if current & 0o007 != 0 {
            warn!(
                path = %path.display(),
                mode = %format!("{current:o}"),
                "Upload directory is accessible to others, resetting permissions"
            );
            tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(mode)).await?;
        } else {
            debug!(path = %path.display(), "Upload directory ready");
        }
    }
    #[cfg(not(unix))]
    let _ = mode;

    Ok(())
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    fn mode_of(path: &Path) -> u32 {
        std::fs::metadata(path).unwrap().permissions().mode() & 0o777
    }

    #[tokio::test]
    async fn test_creates_missing_directory_tree() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("a").join("b").join("tmp");

        ensure_secure_directory(&dir, 0o750).await.unwrap();

        assert!(dir.is_dir());
        assert_eq!(mode_of(&dir) & 0o007, 0);
    }

    #[tokio::test]
    async fn test_tightens_world_accessible_directory() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("tmp");
        std::fs::create_dir(&dir).unwrap();
        std::fs::set_permissions(&dir, std::fs::Permissions::from_mode(0o777)).unwrap();

        ensure_secure_directory(&dir, 0o750).await.unwrap();

        assert_eq!(mode_of(&dir), 0o750);
    }

    #[tokio::test]
    async fn test_leaves_private_directory_alone() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("tmp");
        std::fs::create_dir(&dir).unwrap();
        std::fs::set_permissions(&dir, std::fs::Permissions::from_mode(0o700)).unwrap();

        ensure_secure_directory(&dir, 0o750).await.unwrap();

        assert_eq!(mode_of(&dir), 0o700);
    }

    #[tokio::test]
    async fn test_concurrent_calls_all_succeed() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("shared").join("tmp");

        let mut handles = Vec::new();
        for _ in 0..16 {
            let dir = dir.clone();
            handles.push(tokio::spawn(async move {
                ensure_secure_directory(&dir, 0o750).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }
        assert!(dir.is_dir());
    }

    #[tokio::test]
    async fn test_rejects_regular_file_in_place() {
        let root = tempfile::tempdir().unwrap();
        let path = root.path().join("tmp");
        std::fs::write(&path, b"not a dir").unwrap();

        assert!(ensure_secure_directory(&path, 0o750).await.is_err());
    }
}
