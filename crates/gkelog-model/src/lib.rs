mod labels;
pub use labels::Labels;

mod severity;
pub use severity::LogSeverity;

mod http;
pub use http::HttpRequest;

mod entry;
pub use entry::{LogEntry, SourceLocation};

mod error;
pub use error::ModelError;
