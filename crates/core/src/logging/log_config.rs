use crate::logging::log_level::LogLevel;

/// Logging configuration
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct LogConfig {
    /// Minimum log level to display
    pub level: LogLevel,
    /// Output format for logs
    pub format: OutputFormat,
}

/// Output format for log entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum OutputFormat {
    /// JSON format
    Json,
    /// Plain text format
    Text,
    /// Multi-line human readable format
    Pretty,
}

impl std::str::FromStr for OutputFormat {
    type Err = crate::errors::ControlError;

    fn from_str(format: &str) -> Result<Self, Self::Err> {
        match format.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "text" => Ok(OutputFormat::Text),
            "pretty" => Ok(OutputFormat::Pretty),
            _ => Err(crate::errors::ControlError::Configuration(format!(
                "Invalid log format: {format}"
            ))),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: OutputFormat::Pretty,
        }
    }
}

impl LogConfig {
    /// Apply `LOG_LEVEL` / `LOG_FORMAT` on top of the current settings; unparsable values are ignored
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(level) = std::env::var("LOG_LEVEL").ok().and_then(|s| s.parse().ok()) {
            self.level = level;
        }
        if let Some(format) = std::env::var("LOG_FORMAT").ok().and_then(|s| s.parse().ok()) {
            self.format = format;
        }
        self
    }

    /// Build from the observability section of the application config
    pub fn from_settings(level: &str, format: &str) -> Result<Self, crate::errors::ControlError> {
        Ok(Self {
            level: level.parse()?,
            format: format.parse()?,
        })
    }

    pub fn with_level(level: LogLevel) -> Self {
        Self {
            level,
            ..Self::default()
        }
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }
}
