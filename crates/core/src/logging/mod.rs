pub mod log_config;
pub mod log_level;

pub use log_config::{LogConfig, OutputFormat};
pub use log_level::LogLevel;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::errors::ControlError;

/// 初始化全局 tracing subscriber
///
/// `RUST_LOG` 存在时优先于配置中的日志级别。重复初始化返回错误。
pub fn init_tracing(config: &LogConfig) -> Result<(), ControlError> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.as_filter()));

    let registry = tracing_subscriber::registry().with(env_filter);

    let result = match config.format {
        OutputFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init(),
        OutputFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().pretty())
            .try_init(),
        OutputFormat::Text => registry
            .with(tracing_subscriber::fmt::layer().compact())
            .try_init(),
    };

    result.map_err(|e| ControlError::config_error(format!("初始化日志系统失败: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_parsing() {
        assert_eq!("WARNING".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert_eq!("debug".parse::<LogLevel>().unwrap(), LogLevel::Debug);
        assert!("loud".parse::<LogLevel>().is_err());
        assert!(LogLevel::Trace < LogLevel::Error);
    }

    #[test]
    fn test_log_config_from_settings() {
        let config = LogConfig::from_settings("warn", "json").unwrap();
        assert_eq!(config.level, LogLevel::Warn);
        assert_eq!(config.format, OutputFormat::Json);

        assert!(LogConfig::from_settings("info", "xml").is_err());
    }

    #[test]
    fn test_log_config_builders() {
        let config = LogConfig::with_level(LogLevel::Error).with_format(OutputFormat::Text);
        assert_eq!(config.level, LogLevel::Error);
        assert_eq!(config.format, OutputFormat::Text);
    }
}
