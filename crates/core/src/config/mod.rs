//! 配置管理
//!
//! 配置按以下顺序合并：
//! 1. 内置默认值
//! 2. TOML 配置文件
//! 3. 环境变量（前缀 `FLEETCTL_`，层级分隔符 `__`）

pub mod models;


pub use models::{
    ApiConfig, AppConfig, ApplicationConfig, GraphStoreConfig, HandoverConfig, LiveViewConfig,
    ObservabilityConfig, RefreshConfig, TransportConfig,
};
