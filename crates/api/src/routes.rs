use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use fleetctl_core::ApplicationConfig;
use fleetctl_dispatcher::{LiveNetViewAggregator, RefreshController, ReleaseHandover};
use fleetctl_domain::FleetInventory;
use metrics_exporter_prometheus::PrometheusHandle;

use crate::handlers::{
    devices::check_registered_availability_of_device,
    health::health_check,
    lifecycle::bequeath_your_data_and_die,
    live_net_view::{
        provide_acceptance_data_of_link_endpoint, provide_equipment_info_for_live_net_view,
        provide_status_for_live_net_view,
    },
    metrics::render_metrics,
};

/// API应用状态
#[derive(Clone)]
pub struct AppState {
    pub application: Arc<ApplicationConfig>,
    pub handover: Arc<ReleaseHandover>,
    pub refresh: RefreshController,
    pub inventory: FleetInventory,
    pub live_view: LiveNetViewAggregator,
    /// 未启用指标时为空
    pub metrics: Option<PrometheusHandle>,
}

/// 创建API路由
pub fn create_routes(state: AppState) -> Router {
    Router::new()
        // 健康检查与指标
        .route("/health", get(health_check))
        .route("/metrics", get(render_metrics))
        // 生命周期
        .route("/v1/bequeath-your-data-and-die", post(bequeath_your_data_and_die))
        // 设备清单
        .route(
            "/v1/check-registered-availability-of-device",
            post(check_registered_availability_of_device),
        )
        // 实时网络视图
        .route(
            "/v1/provide-acceptance-data-of-link-endpoint",
            post(provide_acceptance_data_of_link_endpoint),
        )
        .route(
            "/v1/provide-equipment-info-for-live-net-view",
            post(provide_equipment_info_for_live_net_view),
        )
        .route(
            "/v1/provide-status-for-live-net-view",
            post(provide_status_for_live_net_view),
        )
        .with_state(state)
}
