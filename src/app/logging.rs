//! Tracing subscriber setup, custom formatters, dynamic log level reload.

use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::prelude::*;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{reload, EnvFilter};

// Global reload handle for dynamic log level changes
pub type ReloadHandle = reload::Handle<EnvFilter, tracing_subscriber::Registry>;
pub static RELOAD_HANDLE: std::sync::OnceLock<ReloadHandle> = std::sync::OnceLock::new();

/// Map a user-facing level name to an `EnvFilter` directive.
/// CRITICAL is an alias for ERROR. Unknown names yield `None`.
pub fn level_filter(level: &str) -> Option<&'static str> {
    match level.trim().to_lowercase().as_str() {
        "critical" | "error" => Some("error"),
        "trace" => Some("trace"),
        "debug" => Some("debug"),
        "info" => Some("info"),
        "warn" | "warning" => Some("warn"),
        _ => None,
    }
}

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// `[LEVEL]` tag for one log line, colored when the writer takes ANSI escapes.
pub fn level_tag(level: &Level, ansi: bool) -> String {
    if !ansi {
        return format!("[{}]", level);
    }
    let color = match *level {
        Level::TRACE => "\x1b[2m",
        Level::DEBUG => "\x1b[34m",
        Level::INFO => "\x1b[32m",
        Level::WARN => "\x1b[33m",
        Level::ERROR => "\x1b[31m",
    };
    format!("{}[{}]\x1b[0m", color, level)
}

/// Controller log line: `YYYY-MM-DD HH:MM:SS [LEVEL] message`, local time.
/// Multi-line status snapshots keep their own line breaks.
pub struct ControllerLineFormat;

impl<S, N> FormatEvent<S, N> for ControllerLineFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let stamp = chrono::Local::now().format(TIMESTAMP_FORMAT);
        let tag = level_tag(event.metadata().level(), writer.has_ansi_escapes());
        write!(writer, "{} {} ", stamp, tag)?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Install the global subscriber. The filter stays swappable through
/// `reload_level` for the lifetime of the process.
pub fn init_tracing(filter: &str) {
    let (filter_layer, handle) = reload::Layer::new(EnvFilter::new(filter));

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(tracing_subscriber::fmt::layer().event_format(ControllerLineFormat))
        .init();

    let _ = RELOAD_HANDLE.set(handle);
}

/// Swap the active filter, e.g. after the config file named a different level.
pub fn reload_level(filter: &str) -> Result<(), reload::Error> {
    match RELOAD_HANDLE.get() {
        Some(handle) => handle.reload(EnvFilter::new(filter)),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn critical_maps_to_error() {
        assert_eq!(level_filter("CRITICAL"), Some("error"));
        assert_eq!(level_filter("error"), Some("error"));
    }

    #[test]
    fn level_names_are_case_insensitive() {
        assert_eq!(level_filter("Debug"), Some("debug"));
        assert_eq!(level_filter(" INFO "), Some("info"));
        assert_eq!(level_filter("warning"), Some("warn"));
    }

    #[test]
    fn plain_level_tag_has_no_escapes() {
        assert_eq!(level_tag(&Level::WARN, false), "[WARN]");
        assert_eq!(level_tag(&Level::ERROR, false), "[ERROR]");
    }

    #[test]
    fn colored_level_tag_resets_after_the_bracket() {
        let tag = level_tag(&Level::INFO, true);
        assert!(tag.starts_with("\x1b[32m[INFO]"));
        assert!(tag.ends_with("\x1b[0m"));
    }

    #[test]
    fn timestamp_layout_is_date_then_time() {
        let stamp = chrono::NaiveDate::from_ymd_opt(2024, 3, 7)
            .and_then(|d| d.and_hms_opt(9, 5, 1))
            .unwrap()
            .format(TIMESTAMP_FORMAT)
            .to_string();
        assert_eq!(stamp, "2024-03-07 09:05:01");
    }

    #[test]
    fn reload_without_subscriber_is_a_no_op() {
        assert!(reload_level("debug").is_ok());
    }

    #[test]
    fn unknown_level_is_rejected() {
        assert_eq!(level_filter("loud"), None);
    }
}
