use std::fmt;

use time::{OffsetDateTime, format_description::well_known::Rfc3339};
use tracing_subscriber::fmt::{format::Writer, time::FormatTime};

/// RFC3339 UTC timestamp formatter for the text logger.
///
/// Cloud Logging expects UTC; local-offset output would only mislead when
/// comparing dev logs against what the backend shows.
#[derive(Debug, Clone, Copy)]
pub struct UtcRfc3339;

impl FormatTime for UtcRfc3339 {
    fn format_time(&self, w: &mut Writer<'_>) -> fmt::Result {
        match OffsetDateTime::now_utc().format(&Rfc3339) {
            Ok(ts) => {
                write!(w, "{} ", ts)
            }
            Err(_) => {
                write!(w, "<invalid-time> ")
            }
        }
    }
}
