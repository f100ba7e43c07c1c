use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{fmt, prelude::*, EnvFilter, Layer};

use crate::config::LogSettings;

/// Global crash log directory, set by [`install_crash_hook`].
static CRASH_LOG_DIR: OnceLock<PathBuf> = OnceLock::new();

const DEFAULT_FILTER: &str = "info,spinner_lib=debug,standup_spinner=debug";
const LOG_FILE_PREFIX: &str = "standup-spinner.log";

/// Initialize tracing with console, optional rolling file, and Sentry layers.
///
/// - Console: compact, with target and source location
/// - File: daily rotation under `LOG_DIR`, one JSON object per line, written off-thread
/// - Sentry: captures ERROR events as issues, WARN as breadcrumbs
/// - Default level: INFO, override via RUST_LOG env
///
/// The returned guard flushes the file writer on drop; hold it for the life
/// of the process.
pub fn init(settings: &LogSettings) -> Option<WorkerGuard> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let stdout_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .compact();

    let (file_layer, guard) = match settings.log_dir.as_deref() {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(json_file_layer(writer)), Some(guard))
        }
        None => (None, None),
    };

    // No-op when Sentry DSN is not configured.
    let sentry_layer = sentry_tracing::layer().event_filter(|meta| match *meta.level() {
        tracing::Level::ERROR => sentry_tracing::EventFilter::Event,
        tracing::Level::WARN => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .with(sentry_layer)
        .init();

    if let Some(dir) = &settings.log_dir {
        tracing::debug!(dir = %dir.display(), "Tracing initialized with file output");
    } else {
        tracing::debug!("Tracing initialized");
    }
    guard
}

/// Structured layer for log files, so they can be shipped and queried.
fn json_file_layer<S, W>(writer: W) -> impl Layer<S>
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    fmt::layer()
        .json()
        .with_current_span(true)
        .with_target(true)
        .with_writer(writer)
}

/// Install a panic hook that writes crash details to `dir` before chaining
/// to the previous hook.
pub fn install_crash_hook(dir: &Path) {
    if std::env::var("RUST_BACKTRACE").is_err() {
        std::env::set_var("RUST_BACKTRACE", "full");
    }

    if let Err(e) = std::fs::create_dir_all(dir) {
        tracing::warn!(dir = %dir.display(), error = %e, "Crash log directory unavailable; crash hook not installed");
        return;
    }
    CRASH_LOG_DIR.set(dir.to_path_buf()).ok();

    let prev_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        if let Some(dir) = CRASH_LOG_DIR.get() {
            let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
            let path = dir.join(format!("crash_{}.log", timestamp));
            let _ = std::fs::write(&path, crash_report(info));
            eprintln!("[CRASH] Report written to: {}", path.display());
        }
        prev_hook(info);
    }));

    tracing::info!(dir = %dir.display(), "Crash hook installed");
}

fn crash_report(info: &std::panic::PanicHookInfo<'_>) -> String {
    let mut report = format!(
        "=== STANDUP SPINNER CRASH REPORT ===\n\
         Time: {}\n\
         Version: {}\n\n",
        chrono::Local::now().to_rfc3339(),
        env!("CARGO_PKG_VERSION"),
    );

    if let Some(msg) = info.payload().downcast_ref::<&str>() {
        report.push_str(&format!("Panic: {}\n", msg));
    } else if let Some(msg) = info.payload().downcast_ref::<String>() {
        report.push_str(&format!("Panic: {}\n", msg));
    } else {
        report.push_str("Panic: <unknown payload>\n");
    }

    if let Some(loc) = info.location() {
        report.push_str(&format!("Location: {}:{}:{}\n", loc.file(), loc.line(), loc.column()));
    }

    report.push_str(&format!("\nBacktrace:\n{}\n", std::backtrace::Backtrace::force_capture()));

    let thread = std::thread::current();
    report.push_str(&format!("\nThread: {:?} (id: {:?})\n", thread.name(), thread.id()));
    report
}
