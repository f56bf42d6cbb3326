//! # Fleetctl API
//!
//! 控制面的入站 HTTP 接口，基于 Axum 构建。
//!
//! ## API 端点
//!
//! - `POST /v1/bequeath-your-data-and-die` - 触发后台版本交接，立即返回 204
//! - `POST /v1/check-registered-availability-of-device` - 查询设备是否在最近的设备清单中
//! - `POST /v1/provide-acceptance-data-of-link-endpoint` - 空口、VLAN、库存、告警数据
//! - `POST /v1/provide-equipment-info-for-live-net-view` - 库存数据
//! - `POST /v1/provide-status-for-live-net-view` - 空口与告警数据
//! - `GET /health` - 健康检查
//! - `GET /metrics` - Prometheus 指标
//!
//! ## 错误响应
//!
//! ```json
//! {
//!   "error": {
//!     "message": "转发图无法解析: ...",
//!     "type": "ROUTE_NOT_RESOLVABLE",
//!     "code": 500,
//!     "suggestions": ["..."],
//!     "timestamp": "2024-01-01T00:00:00Z"
//!   }
//! }
//! ```

pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod types;

use axum::Router;
use tower::ServiceBuilder;

use middleware::{cors_layer, request_logging, trace_layer};
pub use routes::{create_routes, AppState};

/// 创建完整的API应用
pub fn create_app(state: AppState, cors_enabled: bool) -> Router {
    let router = create_routes(state).layer(
        ServiceBuilder::new()
            .layer(trace_layer())
            .layer(axum::middleware::from_fn(request_logging)),
    );

    if cors_enabled {
        router.layer(cors_layer())
    } else {
        router
    }
}
