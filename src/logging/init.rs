use std::{fmt, io::Write as _, path::Path};

use anyhow::{Context, Result};
use tracing::{Event, Level, Subscriber};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    EnvFilter,
    fmt::{FmtContext, FormatEvent, FormatFields, format::Writer},
    prelude::*,
    registry::LookupSpan,
};

use crate::core::clock;

/// Name of the append-only log file inside the configured log directory.
pub const LOG_FILE_NAME: &str = "git-airgap.log";

/// `[YYYY-MM-DD HH:MM:SS] message field=value`, with `ERROR: ` in front of
/// error-level messages.
struct LineFormat;

impl<S, N> FormatEvent<S, N> for LineFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        write!(writer, "[{}] ", clock::log_timestamp(clock::now()))?;
        if *event.metadata().level() == Level::ERROR {
            writer.write_str("ERROR: ")?;
        }
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Print a fatal error to stdout in the log line format, bypassing the
/// subscriber. Used before tracing is up or when filters silence errors.
pub fn print_fatal(message: impl fmt::Display) {
    let stamp = clock::log_timestamp(clock::now());
    let _ = writeln!(std::io::stdout(), "[{stamp}] ERROR: {message}");
}

/// Initialize tracing. RUST_LOG (if set) takes precedence.
/// Otherwise, -v/-vv map to "debug"/"trace".
///
/// Events are echoed to stdout and, when `log_dir` already exists, appended
/// to `<log_dir>/git-airgap.log`. The directory is never created here.
///
/// # Errors
/// Returns an error if the filter is invalid or the log file cannot be opened.
pub fn init_tracing(verbosity: u8, log_dir: Option<&Path>) -> Result<()> {
    let base = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| base.to_string());
    let filter_layer = EnvFilter::try_new(filter).context("invalid RUST_LOG / filter")?;

    let file_layer = match log_dir.filter(|dir| dir.is_dir()) {
        Some(dir) => {
            let appender = RollingFileAppender::builder()
                .rotation(Rotation::NEVER)
                .filename_prefix(LOG_FILE_NAME)
                .build(dir)
                .with_context(|| format!("failed to open log file in {}", dir.display()))?;
            Some(
                tracing_subscriber::fmt::layer()
                    .event_format(LineFormat)
                    .with_ansi(false)
                    .with_writer(appender),
            )
        }
        None => None,
    };

    let console_layer = tracing_subscriber::fmt::layer()
        .event_format(LineFormat)
        .with_ansi(false)
        .with_writer(std::io::stdout);

    // Allow re-init to be a no-op in tests
    let _ = tracing_subscriber::registry()
        .with(filter_layer)
        .with(file_layer)
        .with(console_layer)
        .try_init();

    Ok(())
}
