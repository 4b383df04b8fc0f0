//! Console and file logging
//!
//! Two sinks share one subscriber. The console always shows INFO and above
//! with a colored marker per severity. The log file in the user's home
//! directory keeps whatever threshold `--log` selects, ERROR by default, so
//! a support request can ask for `--log debug` and the file.

use chrono::Local;
use clap::ValueEnum;
use colored::Colorize;
use std::fmt;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::subscriber::DefaultGuard;
use tracing::{Event, Level, Metadata, Subscriber};
use tracing_subscriber::filter::filter_fn;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;

/// Target of ERROR events that abort the run unexpectedly
pub const CRITICAL_TARGET: &str = "critical";

/// Only events from this workspace reach either sink
const OWN_TARGET_PREFIX: &str = "csctcloud";

/// The log file is moved aside once it grows past this size
const ROTATE_BYTES: u64 = 1024 * 1024;

/// Log an ERROR event on the critical target
macro_rules! critical {
    ($($arg:tt)+) => {
        tracing::error!(target: $crate::logging::CRITICAL_TARGET, $($arg)+)
    };
}
pub(crate) use critical;

/// Severity names accepted by `--log`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl LogLevel {
    /// Whether an event with `metadata` passes this threshold
    fn allows(self, metadata: &Metadata<'_>) -> bool {
        Severity::of(metadata) >= Severity::from(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Severity {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl Severity {
    fn of(metadata: &Metadata<'_>) -> Self {
        match *metadata.level() {
            Level::ERROR if metadata.target() == CRITICAL_TARGET => Self::Critical,
            Level::ERROR => Self::Error,
            Level::WARN => Self::Warning,
            Level::INFO => Self::Info,
            _ => Self::Debug,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
            Self::Critical => "CRITICAL",
        }
    }

    fn marker(self) -> colored::ColoredString {
        match self {
            Self::Debug => "*".bright_blue().bold(),
            Self::Info => "*".bright_green().bold(),
            Self::Warning => "!".bright_yellow().bold(),
            Self::Error => "!".bright_red().bold(),
            Self::Critical => "!".bright_magenta().bold(),
        }
    }
}

impl From<LogLevel> for Severity {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Debug => Self::Debug,
            LogLevel::Info => Self::Info,
            LogLevel::Warning => Self::Warning,
            LogLevel::Error => Self::Error,
            LogLevel::Critical => Self::Critical,
        }
    }
}

fn is_own(metadata: &Metadata<'_>) -> bool {
    metadata.target() == CRITICAL_TARGET || metadata.target().starts_with(OWN_TARGET_PREFIX)
}

/// `[*] message` with a colored marker
struct ConsoleFormat;

impl<S, N> FormatEvent<S, N> for ConsoleFormat
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
        write!(writer, "[{}] ", Severity::of(event.metadata()).marker())?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// `2026-10-18 14:02:11,123:WARNING:message`
struct FileFormat;

impl<S, N> FormatEvent<S, N> for FileFormat
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
        write!(
            writer,
            "{}:{}:",
            Local::now().format("%Y-%m-%d %H:%M:%S,%3f"),
            Severity::of(event.metadata()).name()
        )?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Keeps the logging subscriber installed for as long as it lives
pub struct LogGuard {
    _default: DefaultGuard,
    path: PathBuf,
}

impl LogGuard {
    /// Path of the log file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Install console and file logging for the current thread
pub fn init(log_path: &Path, file_level: LogLevel) -> std::io::Result<LogGuard> {
    rotate_if_large(log_path)?;

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)?;

    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stdout)
        .event_format(ConsoleFormat)
        .with_filter(filter_fn(|metadata| {
            is_own(metadata) && LogLevel::Info.allows(metadata)
        }));

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .event_format(FileFormat)
        .with_filter(filter_fn(move |metadata| {
            is_own(metadata) && file_level.allows(metadata)
        }));

    let subscriber = tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer);

    Ok(LogGuard {
        _default: tracing::subscriber::set_default(subscriber),
        path: log_path.to_path_buf(),
    })
}

/// Move an oversized log file to `<name>.1`, replacing any older copy
fn rotate_if_large(log_path: &Path) -> std::io::Result<()> {
    match fs::metadata(log_path) {
        Ok(metadata) if metadata.len() > ROTATE_BYTES => {
            let mut rotated = log_path.as_os_str().to_owned();
            rotated.push(".1");
            fs::rename(log_path, PathBuf::from(rotated))
        }
        Ok(_) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}
