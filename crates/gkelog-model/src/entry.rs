use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{HttpRequest, Labels, LogSeverity};

/// Where in the source a log entry was emitted.
///
/// `line` is carried as a string: that is how the structured-logging agent
/// expects `LogEntrySourceLocation` on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    pub file: String,
    pub line: String,
    pub function: String,
}

/// One structured log record in the Cloud Logging "special payload fields"
/// shape. Serialized as a single JSON object per line; the GKE logging
/// agent lifts the `logging.googleapis.com/*` keys into LogEntry proper.
///
/// See <https://cloud.google.com/logging/docs/structured-logging#special-payload-fields>
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    #[serde(with = "time::serde::rfc3339")]
    pub time: OffsetDateTime,
    pub severity: LogSeverity,
    pub message: String,
    #[serde(
        rename = "httpRequest",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub http_request: Option<HttpRequest>,
    #[serde(
        rename = "logging.googleapis.com/spanId",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub span_id: Option<String>,
    #[serde(
        rename = "logging.googleapis.com/sourceLocation",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub source_location: Option<SourceLocation>,
    #[serde(
        rename = "logging.googleapis.com/labels",
        default,
        skip_serializing_if = "Labels::is_empty"
    )]
    pub labels: Labels,
}
