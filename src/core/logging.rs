use std::sync::OnceLock;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::core::config::AppPaths;

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Installs the global subscriber. Later calls are ignored.
pub fn init(paths: &AppPaths) {
    let log_dir = &paths.log_dir;
    let _ = std::fs::create_dir_all(log_dir);

    let file_appender = tracing_appender::rolling::daily(log_dir, "knowledge.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    if LOG_GUARD.set(guard).is_err() {
        return;
    }

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    // stdout carries tool output for the host shim
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);
    let file_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_ansi(false)
        .with_writer(non_blocking);

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init();
}
