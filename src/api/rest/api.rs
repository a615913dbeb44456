use anyhow::Result;
use std::process;
use std::sync::Arc;
use tracing::{info, warn};

use crate::api::rest::create_router;
use crate::shared::config::ServerConfig;
use crate::shared::deletion::DeletionScheduler;
use crate::shared::models::AppState;
use crate::shared::upload::UploadHandler;

pub fn build_state(config: &ServerConfig) -> Result<Arc<AppState>> {
    let upload_config = config.upload_config()?;
    let deletions = DeletionScheduler::with_tokio_timer(upload_config.deletion_delay);

    Ok(Arc::new(AppState {
        uploads: Arc::new(UploadHandler::new(upload_config)),
        deletions,
    }))
}

pub async fn run_rest_server(config: ServerConfig) -> Result<()> {
    info!(
        r#"
              _          _
  ___ ___   __| | ___  __| |_ __ ___  _ __
 / __/ _ \ / _` |/ _ \/ _` | '__/ _ \| '_ \
| (_| (_) | (_| |  __/ (_| | | | (_) | |_) |
 \___\___/ \__,_|\___|\__,_|_|  \___/| .__/
                                     |_|
Starting codedrop upload API...
PID: {}
"#,
        process::id()
    );

    let app_state = build_state(&config)?;
    let uploads = app_state.uploads.config();
    info!(
        upload_dir = %uploads.upload_dir.display(),
        max_file_size = uploads.max_file_size,
        allowed = %uploads.allowed_list(),
        deletion_delay_ms = %uploads.deletion_delay.as_millis(),
        "Upload storage configured"
    );

    info!("Building REST API routes...");
    let app = create_router(app_state);

    let bind_addr = config.bind_addr();
    info!("Binding to: {}", bind_addr);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

    info!("API started successfully!");
    info!("REST API Endpoint: http://{}/api/v0", bind_addr);
    info!("Ready to accept requests...");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Pending deletions are in-memory only and die with the process
    warn!("codedrop API stopped; pending file deletions were dropped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutting down codedrop API...");
}
