pub mod config;
pub mod errors;
pub mod logging;

pub use self::config::*;
pub use self::errors::*;
pub use self::logging::{init_tracing, LogConfig, LogLevel, OutputFormat};

/// 统一的Result类型
pub type ControlResult<T> = std::result::Result<T, ControlError>;
