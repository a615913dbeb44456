use std::path::Path;
use std::sync::OnceLock;

use tracing::info;
use tracing_appender::non_blocking;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

// Writer guards must outlive every log call, so they live for the process.
static GUARDS: OnceLock<Vec<WorkerGuard>> = OnceLock::new();

/// Console logging, plus `<log_dir>/<service>.log` when the directory is
/// writable. The previous run's file is moved aside first. Filter with `RUST_LOG` (default `info`).
pub fn init_service_logging(log_dir: &str, service_name: &str) -> Result<(), anyhow::Error> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let (console_writer, console_guard) = non_blocking(std::io::stdout());
    let console_layer = fmt::layer()
        .with_writer(console_writer)
        .with_ansi(true)
        .with_target(false);

    if !log_dir_writable(log_dir) {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(console_layer)
            .try_init()?;
        let _ = GUARDS.set(vec![console_guard]);

        info!("Logging initialized - console only, {log_dir} is not writable");
        return Ok(());
    }

    if let Err(e) = rotate_logs_on_startup(log_dir, service_name) {
        eprintln!("Could not rotate previous log file: {e}");
    }

    let file_appender = tracing_appender::rolling::never(log_dir, format!("{service_name}.log"));
    let (file_writer, file_guard) = non_blocking(file_appender);
    let file_layer = fmt::layer()
        .with_writer(file_writer)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()?;
    let _ = GUARDS.set(vec![file_guard, console_guard]);

    info!("Logging initialized - writing to {log_dir}/{service_name}.log");
    Ok(())
}

fn log_dir_writable(log_dir: &str) -> bool {
    let probe = Path::new(log_dir).join(".write_probe");
    std::fs::create_dir_all(log_dir)
        .and_then(|_| std::fs::File::create(&probe))
        .and_then(|_| std::fs::remove_file(&probe))
        .is_ok()
}

/// Move an existing `<service>.log` aside as `<service>.<timestamp>.log`.
pub fn rotate_logs_on_startup(log_dir: &str, service_name: &str) -> Result<(), anyhow::Error> {
    let current = Path::new(log_dir).join(format!("{service_name}.log"));
    if !current.exists() {
        return Ok(());
    }

    let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S");
    let backup = Path::new(log_dir).join(format!("{service_name}.{timestamp}.log"));
    std::fs::rename(&current, &backup)?;
    Ok(())
}
