// Logging module
// Console and optional file logging built on the tracing crate
//
// Console output goes to stderr so it never mixes with the converter's
// stdout progress messages. When a log directory is configured, a daily
// rolling file receives the same events with targets included.

use std::io::IsTerminal;

use anyhow::Context;
pub use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Log file name inside the configured logs directory
pub const LOG_FILE_NAME: &str = "wmx2obj.log";

/// Map a numeric log level (0=Error, 1=Warn, 2=Info, 3=Debug, 4=Trace)
/// to an `EnvFilter` directive. Out of range values clamp to the nearest level.
pub fn map_log_level(level: i32) -> &'static str {
    match level {
        i32::MIN..=0 => "error",
        1 => "warn",
        2 => "info",
        3 => "debug",
        _ => "trace",
    }
}

/// Initialize the logging system
///
/// `RUST_LOG` takes precedence over `log_level` when set. When `log_dir` is
/// given, the returned guard must be held until exit; dropping it flushes the
/// file writer.
pub fn initialize_logging(
    log_dir: Option<&str>,
    log_level: &str,
) -> anyhow::Result<Option<WorkerGuard>> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level));

    let console = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .with_thread_ids(false);

    let Some(dir) = log_dir else {
        let _ = tracing_subscriber::registry()
            .with(env_filter)
            .with(console)
            .try_init();
        return Ok(None);
    };

    std::fs::create_dir_all(dir)
        .with_context(|| format!("Cannot create log directory {}", dir))?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_NAME)
        .build(dir)
        .with_context(|| format!("Cannot open {} in {}", LOG_FILE_NAME, dir))?;
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(console)
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true),
        )
        .try_init();

    Ok(Some(guard))
}
