//! Shared `tracing` initialization: stdout (env-filter controlled) plus an optional
//! rolling file appender under `$XDG_STATE_HOME/<app>/logs`.
//!
//! Every binary in the workspace (serve, scheduler) calls [`init_tracing`] once at
//! startup so log shape and the `RUST_LOG` contract are consistent.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Guard returned by [`init_tracing`]; drop it at the very end of `main` to flush
/// the non-blocking file writer.
pub struct TracingGuard {
    _file_guard: Option<tracing_appender::non_blocking::WorkerGuard>,
}

/// Initializes a global `tracing` subscriber: stdout layer filtered by `RUST_LOG`
/// (default `info`), plus a daily-rolling file layer under
/// `$XDG_STATE_HOME/<app_name>/logs/<app_name>.log` when `with_file` is true.
pub fn init_tracing(app_name: &str, with_file: bool) -> TracingGuard {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let stdout_layer = fmt::layer().with_target(true);

    if with_file {
        if let Ok(base) = cross_xdg::BaseDirs::new() {
            let log_dir = base.state_home().join(app_name).join("logs");
            if std::fs::create_dir_all(&log_dir).is_ok() {
                let file_appender = tracing_appender::rolling::daily(&log_dir, app_name);
                let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
                let file_layer = fmt::layer().with_ansi(false).with_writer(non_blocking);

                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(stdout_layer)
                    .with(file_layer)
                    .init();

                return TracingGuard {
                    _file_guard: Some(guard),
                };
            }
        }
    }

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .init();

    TracingGuard { _file_guard: None }
}
