//! Logging setup.
//!
//! - One-line JSON records in a daily rolling file (always)
//! - Coloured human-readable output on stdout (debug builds only)
//! - `log` records are forwarded into `tracing`
//!
//! JSON records carry: timestamp (ISO 8601, millisecond precision, local
//! offset), level, target, pid, tid, file, line, message, the event's
//! structured fields and the crate version.

use log::LevelFilter;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{Event, Level, Subscriber};
use tracing_appender::{non_blocking::WorkerGuard, rolling};
use tracing_log::LogTracer;
use tracing_subscriber::fmt::{format::Writer, FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter, Layer, Registry};

const LOG_FILE_PREFIX: &str = "musiccabinet.log";

static LOG_DIR: OnceLock<PathBuf> = OnceLock::new();
static FILE_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Install the global subscriber. Later calls are no-ops.
///
/// `level` is the default directive for this application's crates
/// (`trace`..`error`); `RUST_LOG` overrides it entirely.
pub fn init_logger(log_dir: &Path, level: &str) -> anyhow::Result<()> {
    if LOG_DIR.get().is_some() {
        return Ok(());
    }

    std::fs::create_dir_all(log_dir)?;

    let _ = LogTracer::builder()
        .with_max_level(LevelFilter::Trace)
        .init();

    let file_appender = rolling::daily(log_dir, LOG_FILE_PREFIX);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let json_layer = fmt::layer()
        .with_writer(non_blocking)
        .event_format(JsonFormatter::new())
        .with_filter(build_filter(level));

    let stdout_layer = if cfg!(debug_assertions) {
        Some(
            fmt::layer()
                .with_ansi(true)
                .event_format(HumanReadableFormatter::new())
                .with_filter(build_filter(level)),
        )
    } else {
        None
    };

    let subscriber = Registry::default().with(json_layer).with(stdout_layer);
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to set global subscriber: {}", e))?;

    let _ = FILE_GUARD.set(guard);
    let _ = LOG_DIR.set(log_dir.to_path_buf());

    tracing::info!(
        target: "musiccabinet::logging",
        log_dir = %log_dir.display(),
        level,
        version = env!("CARGO_PKG_VERSION"),
        profile = if cfg!(debug_assertions) { "debug" } else { "release" },
        "Logger initialized"
    );

    Ok(())
}

/// Directory passed to [`init_logger`], once it succeeded
pub fn log_dir() -> Option<PathBuf> {
    LOG_DIR.get().cloned()
}

fn default_directives(level: &str) -> String {
    format!(
        "warn,musiccabinet={level},musiccabinet_app={level},musiccabinet_infrastructure={level},musiccabinet_domain={level}"
    )
}

fn build_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directives(level)))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

fn level_label(level: &Level) -> &'static str {
    match *level {
        Level::ERROR => "ERROR",
        Level::WARN => "WARN",
        Level::INFO => "INFO",
        Level::DEBUG => "DEBUG",
        Level::TRACE => "TRACE",
    }
}

/// One JSON object per line
struct JsonFormatter {
    pid: u32,
}

impl JsonFormatter {
    fn new() -> Self {
        Self {
            pid: std::process::id(),
        }
    }
}

impl<S, N> FormatEvent<S, N> for JsonFormatter
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
        let metadata = event.metadata();

        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);
        let message = visitor.fields.remove("message");

        let mut record = serde_json::json!({
            "timestamp": chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z").to_string(),
            "level": level_label(metadata.level()),
            "target": metadata.target(),
            "pid": self.pid,
            "tid": format!("{:?}", std::thread::current().id()),
            "version": env!("CARGO_PKG_VERSION"),
        });

        if let Some(file) = metadata.file() {
            record["file"] = serde_json::json!(file);
        }
        if let Some(line) = metadata.line() {
            record["line"] = serde_json::json!(line);
        }
        if let Some(message) = message {
            record["message"] = message;
        }
        if let Some(span) = ctx.lookup_current() {
            record["span"] = serde_json::json!(span.name());
        }
        if !visitor.fields.is_empty() {
            record["fields"] = serde_json::Value::Object(visitor.fields);
        }

        writeln!(
            writer,
            "{}",
            serde_json::to_string(&record).unwrap_or_default()
        )
    }
}

/// `2025-01-31 10:32:15.123 INFO  (target) key=value message`
struct HumanReadableFormatter;

impl HumanReadableFormatter {
    fn new() -> Self {
        Self
    }
}

impl<S, N> FormatEvent<S, N> for HumanReadableFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let metadata = event.metadata();

        let colour = match *metadata.level() {
            Level::ERROR => "\x1b[31m",
            Level::WARN => "\x1b[33m",
            Level::INFO => "\x1b[32m",
            Level::DEBUG => "\x1b[36m",
            Level::TRACE => "\x1b[35m",
        };

        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);
        let message = visitor
            .fields
            .remove("message")
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_default();

        let fields: String = visitor
            .fields
            .iter()
            .map(|(key, value)| match value.as_str() {
                Some(text) => format!(" {}={}", key, text),
                None => format!(" {}={}", key, value),
            })
            .collect();

        writeln!(
            writer,
            "{} {}{:<5}\x1b[0m ({}){} {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
            colour,
            level_label(metadata.level()),
            metadata.target(),
            fields,
            message
        )
    }
}

#[derive(Default)]
struct FieldVisitor {
    fields: serde_json::Map<String, serde_json::Value>,
}

impl tracing::field::Visit for FieldVisitor {
    fn record_f64(&mut self, field: &tracing::field::Field, value: f64) {
        self.fields
            .insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_i64(&mut self, field: &tracing::field::Field, value: i64) {
        self.fields
            .insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.fields
            .insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_bool(&mut self, field: &tracing::field::Field, value: bool) {
        self.fields
            .insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.fields
            .insert(field.name().to_string(), serde_json::json!(value));
    }

    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.fields.insert(
            field.name().to_string(),
            serde_json::json!(format!("{:?}", value)),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directives_cover_workspace_crates() {
        let directives = default_directives("debug");
        assert!(directives.starts_with("warn,"));
        assert!(directives.contains("musiccabinet_app=debug"));
        assert!(directives.contains("musiccabinet_infrastructure=debug"));
        assert!(EnvFilter::try_new(directives).is_ok());
    }

    #[test]
    fn test_level_labels() {
        assert_eq!(level_label(&Level::WARN), "WARN");
        assert_eq!(level_label(&Level::TRACE), "TRACE");
    }
}
