use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde_json::{json, Value};
use tracing::debug;

use crate::{error::ApiResult, extract::InboundTrace, routes::AppState, types::MountNameRequest};

/// 根据最近一次刷新得到的设备清单回答设备是否已注册
pub async fn check_registered_availability_of_device(
    State(state): State<AppState>,
    InboundTrace(trace): InboundTrace,
    body: Result<Json<MountNameRequest>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(request) = body?;
    let request = request.into_collection()?;

    let availability = state.inventory.availability_of(&request.mount_name).await;
    debug!(
        x_correlator = %trace.x_correlator,
        mount_name = %availability.mount_name,
        registered = availability.is_registered,
        "查询设备注册状态"
    );

    Ok(Json(json!({ "device-availability": availability })))
}
