use std::io::IsTerminal;

use serde::{Deserialize, Serialize};

use gkelog_model::Labels;

use crate::logger::object::{LoggerFormat, LoggerLevel};

/// Logger configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// Output format.
    pub format: LoggerFormat,
    /// Log level filter expression (e.g., "info", "my_crate=debug,info").
    pub level: LoggerLevel,
    /// Static labels baked into every entry, under whatever the task
    /// context sets. App identifiers, versions, environments go here.
    pub default_labels: Labels,
    /// Whether to include module/target names in text output.
    pub with_targets: bool,
    /// Whether to use colored text output.
    pub use_color: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            format: LoggerFormat::default(),
            level: LoggerLevel::default(),
            default_labels: Labels::new(),
            with_targets: true,
            use_color: true,
        }
    }
}

impl LoggerConfig {
    /// Determines whether colored output should be used.
    ///
    /// Color is enabled only if `use_color` is `true` AND stdout is a
    /// terminal (not redirected to a file/pipe). Only the text format
    /// consults this; structured output is never colored.
    pub fn should_use_color(&self) -> bool {
        self.use_color && std::io::stdout().is_terminal()
    }
}
