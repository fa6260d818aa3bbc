mod config;
mod error;
mod log;
mod object;

pub use config::LoggerConfig;
pub use error::LoggerError;
pub use object::LoggerFormat;
pub use object::LoggerLevel;
pub use object::UtcRfc3339;

/// Initializes the global tracing subscriber with the given configuration.
///
/// Once initialized, all `tracing` macros (`info!`, `warn!`, etc.) emit
/// through this configuration. With [`LoggerFormat::Gke`] every record is
/// one structured-logging JSON line on stdout, enriched with the calling
/// task's contextual labels; [`LoggerFormat::Text`] is the human-readable
/// development output.
///
/// # Examples
/// ```rust
/// use gkelog_observe::{LoggerConfig, init_logger};
///
/// fn main() {
///     let config = LoggerConfig::default();
///     init_logger(&config).expect("failed to initialize logger");
///
///     tracing::info!("logger initialized");
/// }
/// ```
pub fn init_logger(cfg: &LoggerConfig) -> Result<(), LoggerError> {
    match cfg.format {
        LoggerFormat::Gke => log::logger_gke(cfg),
        LoggerFormat::Text => log::logger_text(cfg),
    }
}
