use chrono::Local;
use std::path::{Path, PathBuf};
use tracing::Subscriber;
use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::fmt::{self, format::Writer, time::FormatTime};
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Prefixes every line with the tool name and a local timestamp.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalTimestamp;

impl FormatTime for LocalTimestamp {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}: {}:",
            env!("CARGO_PKG_NAME"),
            Local::now().format(TIMESTAMP_FORMAT)
        )
    }
}

fn filter(debug: bool) -> EnvFilter {
    // Without debug logging we force `info` regardless of `RUST_LOG` so a
    // stray variable in the user's environment cannot flood stderr.
    if debug {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::new("info")
    }
}

/// Open `path` for appending without rotation.
pub fn file_appender(path: &Path) -> Result<RollingFileAppender, InitError> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| format!("{}.log", env!("CARGO_PKG_NAME")));
    RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(name)
        .build(dir)
}

/// Diagnostic subscriber: stderr always, plus `file` when given.
pub fn subscriber(
    debug: bool,
    file: Option<RollingFileAppender>,
) -> impl Subscriber + Send + Sync + 'static {
    let stderr = fmt::layer()
        .with_writer(std::io::stderr)
        .with_timer(LocalTimestamp)
        .with_target(false)
        .with_ansi(false);
    let file = file.map(|appender| {
        fmt::layer()
            .with_writer(appender)
            .with_timer(LocalTimestamp)
            .with_target(false)
            .with_ansi(false)
    });

    tracing_subscriber::registry()
        .with(filter(debug))
        .with(stderr)
        .with(file)
}

/// Initialise logging. Default level is `info`; with `debug` enabled it is
/// `debug` and `RUST_LOG` may override it.
pub fn init(debug: bool, log_file: Option<PathBuf>) {
    let (file, file_err) = match log_file.as_deref().map(file_appender) {
        Some(Ok(appender)) => (Some(appender), None),
        Some(Err(e)) => (None, Some(e)),
        None => (None, None),
    };

    let _ = subscriber(debug, file).try_init();

    if let (Some(path), Some(err)) = (log_file, file_err) {
        tracing::warn!(path = %path.display(), error = %err, "could not open log file");
    }
}
