//! Tracing setup for the traffic light simulator.
//!
//! Development runs print human readable events on the terminal, production-like runs write
//! JSON events to daily rotated files so they can be shipped to a log aggregator.

use std::backtrace::{Backtrace, BacktraceStatus};
use std::panic::PanicHookInfo;
use std::sync::Once;
use thiserror::Error;
use tracing::subscriber::{SetGlobalDefaultError, set_global_default};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{self, InitError};
use tracing_log::{LogTracer, log_tracer::SetLoggerError};
use tracing_subscriber::{EnvFilter, FmtSubscriber, Registry, fmt, layer::SubscriberExt};
use traffic_light_config::{Environment, UnknownEnvironment};

/// Directory, relative to the working directory, receiving log files in production.
const LOG_DIR: &str = "logs";

/// Suffix of the rotated log files.
const LOG_FILE_SUFFIX: &str = "log";

/// Number of rotated log files kept on disk.
const MAX_LOG_FILES: usize = 5;

/// Filter used when `RUST_LOG` is not set.
const DEFAULT_FILTER: &str = "info";

/// Errors that can occur during tracing initialization.
#[derive(Debug, Error)]
pub enum TracingError {
    #[error("failed to build rolling file appender: {0}")]
    InitAppender(#[from] InitError),

    #[error("failed to init log tracer: {0}")]
    InitLogTracer(#[from] SetLoggerError),

    #[error("failed to set global default subscriber: {0}")]
    SetGlobalDefault(#[from] SetGlobalDefaultError),

    #[error("failed to determine the environment: {0}")]
    Environment(#[from] UnknownEnvironment),
}

/// Keeps buffered log events alive until they are written.
///
/// Must be held until the application exits, dropping it flushes pending file writes.
#[must_use]
pub enum LogFlusher {
    /// Guard of the background writer used for log files.
    Flusher(WorkerGuard),
    /// Console output is written synchronously and needs no flushing.
    NullFlusher,
}

/// Where log events end up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    /// Pretty, colored events on the terminal.
    Console,
    /// JSON events in daily rotated files named after the application.
    RollingFiles { dir: String, prefix: String },
}

impl LogTarget {
    /// Picks the log target matching `environment`.
    pub fn for_environment(environment: &Environment, app_name: &str) -> LogTarget {
        if environment.is_prod() {
            LogTarget::RollingFiles {
                dir: LOG_DIR.to_owned(),
                prefix: app_name.to_owned(),
            }
        } else {
            LogTarget::Console
        }
    }
}

static INIT_TEST_TRACING: Once = Once::new();

/// Initializes tracing for tests.
///
/// Tracing output stays silent unless the `ENABLE_TRACING` environment variable is set:
/// ```bash
/// ENABLE_TRACING=1 cargo test test_name
/// ```
pub fn init_test_tracing() {
    INIT_TEST_TRACING.call_once(|| {
        if std::env::var("ENABLE_TRACING").is_ok() {
            // Tests log to the terminal whatever `APP_ENVIRONMENT` says.
            let _log_flusher = init_tracing_for_environment("test", &Environment::Dev)
                .expect("Failed to initialize tracing for tests");
        }
    });
}

/// Initializes tracing for the application.
///
/// The environment is read from `APP_ENVIRONMENT`, see [`init_tracing_for_environment`].
pub fn init_tracing(app_name: &str) -> Result<LogFlusher, TracingError> {
    let environment = Environment::load()?;

    init_tracing_for_environment(app_name, &environment)
}

/// Initializes tracing with the log target of `environment`.
///
/// The filter comes from `RUST_LOG` (defaulting to `info`). Events emitted through the `log`
/// crate are forwarded to `tracing` and panics are logged before the default panic hook runs.
pub fn init_tracing_for_environment(
    app_name: &str,
    environment: &Environment,
) -> Result<LogFlusher, TracingError> {
    LogTracer::init()?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into());

    let log_flusher = match LogTarget::for_environment(environment, app_name) {
        LogTarget::Console => configure_console_tracing(filter)?,
        LogTarget::RollingFiles { dir, prefix } => {
            configure_file_tracing(filter, &dir, &prefix)?
        }
    };

    set_tracing_panic_hook();

    Ok(log_flusher)
}

fn configure_file_tracing(
    filter: EnvFilter,
    dir: &str,
    prefix: &str,
) -> Result<LogFlusher, TracingError> {
    let file_appender = rolling::Builder::new()
        .filename_prefix(prefix)
        .filename_suffix(LOG_FILE_SUFFIX)
        .rotation(rolling::Rotation::DAILY)
        .max_log_files(MAX_LOG_FILES)
        .build(dir)?;

    // Writes happen on a dedicated thread so the phase cycle worker never blocks on disk I/O.
    let (file_appender, guard) = tracing_appender::non_blocking(file_appender);

    let format = fmt::format()
        .with_level(true)
        .with_ansi(false)
        .with_target(false)
        .with_thread_names(true);

    let subscriber = Registry::default().with(filter).with(
        fmt::layer()
            .event_format(format)
            .with_writer(file_appender)
            .json()
            .with_current_span(true)
            .with_span_list(true),
    );

    set_global_default(subscriber)?;

    Ok(LogFlusher::Flusher(guard))
}

fn configure_console_tracing(filter: EnvFilter) -> Result<LogFlusher, TracingError> {
    let format = fmt::format()
        .with_level(true)
        .with_ansi(true)
        .pretty()
        .with_line_number(false)
        .with_file(false)
        .with_target(true)
        .with_thread_names(true);

    let subscriber = FmtSubscriber::builder()
        .event_format(format)
        .with_env_filter(filter)
        .finish();

    set_global_default(subscriber)?;

    Ok(LogFlusher::NullFlusher)
}

/// Chains a hook logging panics through `tracing` in front of the current panic hook.
fn set_tracing_panic_hook() {
    let prev_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        panic_hook(info);
        prev_hook(info);
    }));
}

fn panic_hook(panic_info: &PanicHookInfo) {
    let backtrace = Backtrace::capture();
    let (backtrace, note) = match backtrace.status() {
        BacktraceStatus::Captured => (Some(backtrace), None),
        BacktraceStatus::Disabled => (
            None,
            Some("run with RUST_BACKTRACE=1 to display backtraces"),
        ),
        BacktraceStatus::Unsupported => {
            (None, Some("backtraces are not supported on this platform"))
        }
        _ => (None, Some("backtrace status is unknown")),
    };

    let payload = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
        s
    } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
        s
    } else {
        "unknown panic payload"
    };

    let location = panic_info.location().map(|location| location.to_string());
    let thread = std::thread::current();

    tracing::error!(
        panic.payload = payload,
        panic.location = location,
        panic.thread = thread.name(),
        panic.backtrace = backtrace.map(tracing::field::display),
        panic.note = note,
        "a panic occurred",
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dev_logs_to_console() {
        assert_eq!(
            LogTarget::for_environment(&Environment::Dev, "traffic-light-sim"),
            LogTarget::Console
        );
    }

    #[test]
    fn test_prod_like_environments_log_to_files() {
        for environment in [Environment::Prod, Environment::Staging] {
            assert_eq!(
                LogTarget::for_environment(&environment, "traffic-light-sim"),
                LogTarget::RollingFiles {
                    dir: "logs".to_owned(),
                    prefix: "traffic-light-sim".to_owned(),
                }
            );
        }
    }
}
