use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use fleetctl_api::{create_app, AppState};
use fleetctl_core::AppConfig;
use fleetctl_dispatcher::{
    CorrelatedDispatcher, ForwardingGraphResolver, GraphBackedCollector, LiveNetViewAggregator,
    RefreshController, ReleaseHandover,
};
use fleetctl_domain::{key_paths, FleetInventory, GraphStore, TraceContext};
use fleetctl_infrastructure::{
    install_prometheus_recorder, GraphSeed, HttpOperationTransport, InMemoryGraphStore,
};
use serde_json::Value;
use tokio::{net::TcpListener, sync::broadcast};
use tracing::{error, info, warn};

/// 主应用程序，持有组装好的各个组件
pub struct Application {
    config: AppConfig,
    state: AppState,
}

impl Application {
    pub async fn new(config: AppConfig) -> Result<Self> {
        info!("初始化应用程序: {}", config.application.name);

        let store = create_graph_store(&config).await?;
        seed_own_release(&store, &config).await?;
        let store: Arc<dyn GraphStore> = Arc::new(store);

        let transport = HttpOperationTransport::new(
            config
                .transport
                .request_timeout_seconds
                .map(Duration::from_secs),
        )
        .context("创建HTTP传输失败")?;

        let resolver = ForwardingGraphResolver::new(store);
        let dispatcher =
            CorrelatedDispatcher::new(Arc::new(transport), config.transport.scheme.clone());

        let handover = ReleaseHandover::new(
            resolver.clone(),
            dispatcher.clone(),
            config.handover.clone(),
        );

        let inventory = FleetInventory::new();
        let refresh = RefreshController::new(
            resolver.clone(),
            dispatcher.clone(),
            config.refresh.clone(),
            inventory.clone(),
        );

        let collector = GraphBackedCollector::new(resolver, dispatcher, config.live_view.clone());
        let live_view = LiveNetViewAggregator::new(Arc::new(collector));

        let metrics = if config.observability.metrics_enabled {
            Some(install_prometheus_recorder()?)
        } else {
            None
        };

        let state = AppState {
            application: Arc::new(config.application.clone()),
            handover: Arc::new(handover),
            refresh,
            inventory,
            live_view,
            metrics,
        };

        Ok(Self { config, state })
    }

    /// 运行API服务器与周期刷新，直到收到关闭信号
    pub async fn run(&self, mut shutdown_rx: broadcast::Receiver<()>) -> Result<()> {
        if self.config.refresh.enabled {
            let seed = TraceContext::new(
                self.config.application.default_user.clone(),
                self.config.application.name.clone(),
            );
            // 刷新失败不影响API服务
            if let Err(e) = self.state.refresh.start(&seed).await {
                error!("启动周期刷新失败: {e}");
            }
        } else {
            info!("周期刷新已禁用");
        }

        let addr: SocketAddr = self
            .config
            .api
            .bind_address
            .parse()
            .with_context(|| format!("无效的绑定地址: {}", self.config.api.bind_address))?;
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("绑定地址失败: {addr}"))?;

        info!("API服务器监听地址: {addr}");

        let app = create_app(self.state.clone(), self.config.api.cors_enabled);
        let served = axum::serve(listener, app.into_make_service())
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.recv().await;
                info!("API服务器收到关闭信号");
            })
            .await;

        self.state.refresh.stop().await;

        served.context("API服务器运行失败")?;
        info!("API服务器已停止");
        Ok(())
    }
}

async fn create_graph_store(config: &AppConfig) -> Result<InMemoryGraphStore> {
    match &config.graph_store.seed_file {
        Some(path) => {
            info!("从种子文件加载转发图: {path}");
            let seed = GraphSeed::from_file(path)
                .await
                .with_context(|| format!("加载转发图种子文件失败: {path}"))?;
            Ok(InMemoryGraphStore::from_seed(seed))
        }
        None => {
            warn!("未配置转发图种子文件，以空图启动");
            Ok(InMemoryGraphStore::new())
        }
    }
}

/// 交接流程从图存储读取自身身份，缺失时用配置中的名称和当前版本补齐
async fn seed_own_release(store: &InMemoryGraphStore, config: &AppConfig) -> Result<()> {
    let defaults = [
        (
            key_paths::APPLICATION_NAME,
            config.application.name.as_str(),
        ),
        (key_paths::RELEASE_NUMBER, env!("CARGO_PKG_VERSION")),
    ];

    for (key, fallback) in defaults {
        if store.value(key).await?.is_none() {
            store
                .set_value(key, Value::String(fallback.to_string()))
                .await?;
        }
    }
    Ok(())
}
