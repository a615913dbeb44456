use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

/// Source of delays for scheduled deletions.
#[async_trait]
pub trait Timer: Send + Sync {
    async fn sleep(&self, delay: Duration);
}

/// Wall-clock timer backed by the tokio runtime.
#[derive(Debug, Default, Clone)]
pub struct TokioTimer;

#[async_trait]
impl Timer for TokioTimer {
    async fn sleep(&self, delay: Duration) {
        tokio::time::sleep(delay).await;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeletionOutcome {
    Removed,
    /// Nothing at the path when the timer fired.
    Missing,
    Failed(io::ErrorKind),
    /// The task was torn down before it could run, e.g. runtime shutdown.
    Interrupted,
}

/// A pending one-shot deletion. Dropping it leaves the deletion armed.
#[derive(Debug)]
pub struct ScheduledDeletion {
    handle: JoinHandle<DeletionOutcome>,
}

impl ScheduledDeletion {
    pub async fn finished(self) -> DeletionOutcome {
        self.handle.await.unwrap_or(DeletionOutcome::Interrupted)
    }
}

#[derive(Clone)]
pub struct DeletionScheduler {
    timer: Arc<dyn Timer>,
    default_delay: Duration,
}

impl DeletionScheduler {
    pub fn new(timer: Arc<dyn Timer>, default_delay: Duration) -> Self {
        Self {
            timer,
            default_delay,
        }
    }

    pub fn with_tokio_timer(default_delay: Duration) -> Self {
        Self::new(Arc::new(TokioTimer), default_delay)
    }

    pub fn default_delay(&self) -> Duration {
        self.default_delay
    }

    pub fn schedule_default(&self, path: impl Into<PathBuf>) -> ScheduledDeletion {
        self.schedule(path, self.default_delay)
    }

    /// Arm a one-shot timer that removes `path` once `delay` has elapsed.
    /// Failures are logged and never retried.
    pub fn schedule(&self, path: impl Into<PathBuf>, delay: Duration) -> ScheduledDeletion {
        let path = path.into();
        let timer = self.timer.clone();

        debug!(
            path = %path.display(),
            delay_ms = %delay.as_millis(),
            "Scheduled file deletion"
        );

        let handle = tokio::spawn(async move {
            timer.sleep(delay).await;
            remove_if_present(&path).await
        });

        ScheduledDeletion { handle }
    }
}

async fn remove_if_present(path: &Path) -> DeletionOutcome {
    match tokio::fs::remove_file(path).await {
        Ok(()) => {
            info!("File deleted: {}", path.display());
            DeletionOutcome::Removed
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!("File already gone: {}", path.display());
            DeletionOutcome::Missing
        }
        Err(e) => {
            error!("Error deleting file {}: {}", path.display(), e);
            DeletionOutcome::Failed(e.kind())
        }
    }
}
