//! Access logging middleware for axum services.
//!
//! Wraps each request in a fresh logging-context scope, stores a Cloud
//! Logging `HttpRequest` descriptor for the formatter to pick up, and
//! emits one combined-format access line when the response is ready.

mod middleware;
pub use middleware::access_log;

mod request;
pub use request::describe_request;
