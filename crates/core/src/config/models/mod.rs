pub mod api_observability;
pub mod app_config;
pub mod dispatch;

pub use api_observability::{ApiConfig, ObservabilityConfig};
pub use app_config::AppConfig;
pub use dispatch::{
    ApplicationConfig, GraphStoreConfig, HandoverConfig, LiveViewConfig, RefreshConfig,
    TransportConfig,
};
