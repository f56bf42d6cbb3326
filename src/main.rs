use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Arg, Command};
use fleetctl_core::{init_tracing, AppConfig, LogConfig};
use tokio::signal;
use tracing::{error, info, warn};

mod app;
mod shutdown;

use app::Application;
use shutdown::ShutdownManager;

const DEFAULT_CONFIG_PATH: &str = "config/fleetctl.toml";

#[tokio::main]
async fn main() -> Result<()> {
    let matches = Command::new("fleetctl")
        .version(env!("CARGO_PKG_VERSION"))
        .about("网络管理应用集群的控制面组件")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("配置文件路径")
                .default_value(DEFAULT_CONFIG_PATH),
        )
        .arg(
            Arg::new("log-level")
                .short('l')
                .long("log-level")
                .value_name("LEVEL")
                .help("日志级别，覆盖配置文件")
                .value_parser(["trace", "debug", "info", "warn", "error"]),
        )
        .arg(
            Arg::new("log-format")
                .long("log-format")
                .value_name("FORMAT")
                .help("日志格式，覆盖配置文件")
                .value_parser(["json", "pretty", "text"]),
        )
        .get_matches();

    let config_path = matches
        .get_one::<String>("config")
        .map(String::as_str)
        .unwrap_or(DEFAULT_CONFIG_PATH);

    // 默认路径不存在时只使用内置默认值和环境变量
    let explicit = config_path != DEFAULT_CONFIG_PATH || Path::new(config_path).exists();
    let config = AppConfig::load(explicit.then_some(config_path))
        .with_context(|| format!("加载配置文件失败: {config_path}"))?;

    // 优先级：配置文件 < 环境变量 < 命令行
    let mut log_config = LogConfig::from_settings(
        &config.observability.log_level,
        &config.observability.log_format,
    )?
    .with_env_overrides();
    if let Some(level) = matches.get_one::<String>("log-level") {
        log_config.level = level.parse()?;
    }
    if let Some(format) = matches.get_one::<String>("log-format") {
        log_config.format = format.parse()?;
    }
    init_tracing(&log_config)?;

    info!("启动 fleetctl {}", env!("CARGO_PKG_VERSION"));
    if explicit {
        info!("配置文件: {config_path}");
    }

    let app = Arc::new(Application::new(config).await?);
    let shutdown_manager = ShutdownManager::new();

    let app_handle = {
        let shutdown_rx = shutdown_manager.subscribe().await;
        let app = Arc::clone(&app);
        tokio::spawn(async move {
            if let Err(e) = app.run(shutdown_rx).await {
                error!("应用运行失败: {e:#}");
            }
        })
    };

    wait_for_shutdown_signal().await;

    info!("收到关闭信号，开始优雅关闭...");
    shutdown_manager.shutdown().await;

    match tokio::time::timeout(Duration::from_secs(30), app_handle).await {
        Ok(Ok(())) => info!("应用已优雅关闭"),
        Ok(Err(e)) => error!("应用关闭时发生错误: {e}"),
        Err(_) => warn!("应用关闭超时，强制退出"),
    }

    info!("fleetctl 已退出");
    Ok(())
}

/// 等待关闭信号
async fn wait_for_shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("安装Ctrl+C信号处理器失败: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("安装SIGTERM信号处理器失败: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("收到Ctrl+C信号");
        },
        _ = terminate => {
            info!("收到SIGTERM信号");
        },
    }
}
