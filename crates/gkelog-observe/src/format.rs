//! GKE structured-logging event formatter.
//!
//! Shapes every tracing event into one Cloud Logging `LogEntry` JSON line,
//! merging labels from three sources, later ones winning:
//!
//!   1. default labels configured on the formatter,
//!   2. contextual labels from the calling task's scope,
//!   3. the event's own fields.

use std::fmt;

use time::OffsetDateTime;
use tracing::{
    Event, Level, Subscriber,
    field::{Field, Visit},
};
use tracing_subscriber::{
    fmt::{FmtContext, FormatEvent, FormatFields, format::Writer},
    registry::LookupSpan,
};

use gkelog_model::{Labels, LogEntry, LogSeverity, SourceLocation};

/// Event formatter producing the Cloud Logging "special payload fields"
/// JSON shape, enriched from the task context at emission time.
///
/// Install via [`crate::init_logger`] with [`crate::LoggerFormat::Gke`],
/// or hand it to a `tracing_subscriber::fmt` layer directly:
///
/// ```no_run
/// use gkelog_observe::GkeFormat;
/// use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
///
/// tracing_subscriber::registry()
///     .with(tracing_subscriber::fmt::layer().event_format(GkeFormat::new()))
///     .init();
/// ```
#[derive(Debug, Clone, Default)]
pub struct GkeFormat {
    default_labels: Labels,
}

impl GkeFormat {
    pub fn new() -> Self {
        Self::default()
    }

    /// Static labels baked into every entry, overridden by contextual and
    /// per-event labels on key collision.
    pub fn with_default_labels(mut self, labels: impl Into<Labels>) -> Self {
        self.default_labels = labels.into();
        self
    }
}

impl<S, N> FormatEvent<S, N> for GkeFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let mut fields = EventFields::default();
        event.record(&mut fields);

        let mut labels = self.default_labels.clone();
        labels.merge(gkelog_context::get_labels());
        labels.merge(fields.labels);

        let meta = event.metadata();
        let entry = LogEntry {
            time: OffsetDateTime::now_utc(),
            severity: severity_for(meta.level()),
            message: fields.message,
            http_request: gkelog_context::get_http_request(),
            span_id: gkelog_context::get_span_id(),
            source_location: source_location_for(meta.file(), meta.line(), meta.target()),
            labels,
        };

        let line = serde_json::to_string(&entry).map_err(|_| fmt::Error)?;
        writeln!(writer, "{line}")
    }
}

/// Maps a tracing level onto the Cloud Logging severity set.
///
/// TRACE has no counterpart and folds into DEBUG.
fn severity_for(level: &Level) -> LogSeverity {
    if *level == Level::ERROR {
        LogSeverity::Error
    } else if *level == Level::WARN {
        LogSeverity::Warning
    } else if *level == Level::INFO {
        LogSeverity::Info
    } else {
        LogSeverity::Debug
    }
}

/// Source location from event metadata.
///
/// `function` carries the event target (module path): Rust has no runtime
/// function-name reflection to mirror the field exactly.
fn source_location_for(
    file: Option<&str>,
    line: Option<u32>,
    target: &str,
) -> Option<SourceLocation> {
    match (file, line) {
        (Some(file), Some(line)) => Some(SourceLocation {
            file: file.to_string(),
            line: line.to_string(),
            function: target.to_string(),
        }),
        _ => None,
    }
}

/// Field visitor splitting the event into its message and label pairs.
///
/// Every non-message field becomes a label, stringified, since entry
/// labels are `map<string, string>` on the wire.
#[derive(Default)]
struct EventFields {
    message: String,
    labels: Labels,
}

impl EventFields {
    fn record(&mut self, field: &Field, value: String) {
        if field.name() == "message" {
            self.message = value;
        } else {
            self.labels.insert(field.name(), value);
        }
    }
}

impl Visit for EventFields {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.record(field, value.to_string());
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.record(field, value.to_string());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.record(field, value.to_string());
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.record(field, value.to_string());
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.record(field, value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.record(field, format!("{value:?}"));
    }
}

#[cfg(test)]
mod tests {
    use tracing::Level;

    use super::{severity_for, source_location_for};
    use gkelog_model::LogSeverity;

    #[test]
    fn severity_mapping_covers_all_levels() {
        assert_eq!(severity_for(&Level::TRACE), LogSeverity::Debug);
        assert_eq!(severity_for(&Level::DEBUG), LogSeverity::Debug);
        assert_eq!(severity_for(&Level::INFO), LogSeverity::Info);
        assert_eq!(severity_for(&Level::WARN), LogSeverity::Warning);
        assert_eq!(severity_for(&Level::ERROR), LogSeverity::Error);
    }

    #[test]
    fn source_location_requires_file_and_line() {
        let loc = source_location_for(Some("src/job.rs"), Some(42), "job::run");
        let loc = loc.expect("complete metadata yields a location");
        assert_eq!(loc.file, "src/job.rs");
        assert_eq!(loc.line, "42");
        assert_eq!(loc.function, "job::run");

        assert!(source_location_for(None, Some(42), "job::run").is_none());
        assert!(source_location_for(Some("src/job.rs"), None, "job::run").is_none());
    }
}
