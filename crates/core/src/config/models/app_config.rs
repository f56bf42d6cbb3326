use anyhow::{Context, Result};
use ::config::{Config as ConfigBuilder, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::{
    api_observability::{ApiConfig, ObservabilityConfig},
    dispatch::{
        ApplicationConfig, GraphStoreConfig, HandoverConfig, LiveViewConfig, RefreshConfig,
        TransportConfig,
    },
};

/// System configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub application: ApplicationConfig,
    pub graph_store: GraphStoreConfig,
    pub transport: TransportConfig,
    pub handover: HandoverConfig,
    pub refresh: RefreshConfig,
    pub live_view: LiveViewConfig,
    pub api: ApiConfig,
    pub observability: ObservabilityConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            application: ApplicationConfig {
                name: "DeviceInventory".to_string(),
                default_user: "fleetctl".to_string(),
            },
            graph_store: GraphStoreConfig::default(),
            transport: TransportConfig {
                scheme: "http".to_string(),
                request_timeout_seconds: None,
            },
            handover: HandoverConfig {
                broadcast_node:
                    "PromptForBequeathingDataCausesRequestForBroadcastingInfoAboutServerReplacement"
                        .to_string(),
                deregister_node: "PromptForBequeathingDataCausesRequestForDeregisteringOfOldRelease"
                    .to_string(),
            },
            refresh: RefreshConfig {
                enabled: true,
                node: "CyclicOperationCausesDeviceListToBeRefreshed".to_string(),
                profile_suffix: "integer-p-000".to_string(),
                fallback_interval_minutes: None,
            },
            live_view: LiveViewConfig {
                air_interface_node: "RequestForLiveAirInterfaceDataCausesReadingFromDevice"
                    .to_string(),
                vlan_node: "RequestForLiveVlanDataCausesReadingFromDevice".to_string(),
                inventory_node: "RequestForLiveInventoryDataCausesReadingFromDevice".to_string(),
                alarms_node: "RequestForLiveAlarmsCausesReadingFromDevice".to_string(),
            },
            api: ApiConfig {
                bind_address: "0.0.0.0:8080".to_string(),
                cors_enabled: true,
            },
            observability: ObservabilityConfig {
                log_level: "info".to_string(),
                log_format: "pretty".to_string(),
                metrics_enabled: true,
            },
        }
    }
}

impl AppConfig {
    /// Load configuration from config file and environment variables
    ///
    /// Load order:
    /// 1. Default configuration
    /// 2. Config file (TOML format)
    /// 3. Environment variable overrides (prefix: FLEETCTL_, nesting: `__`)
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let defaults =
            ConfigBuilder::try_from(&AppConfig::default()).context("构建默认配置失败")?;
        let mut builder = ConfigBuilder::builder().add_source(defaults);

        if let Some(path) = config_path {
            if Path::new(path).exists() {
                builder = builder.add_source(File::new(path, FileFormat::Toml));
            } else {
                return Err(anyhow::anyhow!("配置文件不存在: {}", path));
            }
        } else {
            let default_paths = ["config/fleetctl.toml", "fleetctl.toml", "/etc/fleetctl/config.toml"];
            if let Some(path) = default_paths.iter().find(|p| Path::new(p).exists()) {
                builder = builder.add_source(File::new(path, FileFormat::Toml));
            }
        }

        builder = builder.add_source(
            Environment::with_prefix("FLEETCTL")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: AppConfig = builder
            .build()
            .context("构建配置失败")?
            .try_deserialize()
            .context("反序列化配置失败")?;

        config.validate()?;

        Ok(config)
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(toml_str).context("解析TOML配置失败")?;

        config.validate()?;
        Ok(config)
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("序列化配置为TOML失败")
    }

    pub fn validate(&self) -> Result<()> {
        self.application.validate().context("应用配置验证失败")?;
        self.transport.validate().context("传输配置验证失败")?;
        self.handover.validate().context("交接流程配置验证失败")?;
        self.refresh.validate().context("周期刷新配置验证失败")?;
        self.live_view.validate().context("实时视图配置验证失败")?;
        self.api.validate().context("API配置验证失败")?;
        self.observability
            .validate()
            .context("可观测性配置验证失败")?;

        Ok(())
    }
}
