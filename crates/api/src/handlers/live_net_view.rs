use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde_json::Value;

use crate::{
    error::ApiResult,
    extract::InboundTrace,
    routes::AppState,
    types::{LinkEndpointRequest, MountNameRequest},
};

pub async fn provide_acceptance_data_of_link_endpoint(
    State(state): State<AppState>,
    InboundTrace(trace): InboundTrace,
    body: Result<Json<LinkEndpointRequest>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(request) = body?;
    let request = request.into_collection()?;
    Ok(Json(state.live_view.acceptance_data(&request, &trace).await?))
}

pub async fn provide_equipment_info_for_live_net_view(
    State(state): State<AppState>,
    InboundTrace(trace): InboundTrace,
    body: Result<Json<MountNameRequest>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(request) = body?;
    let request = request.into_collection()?;
    Ok(Json(state.live_view.equipment_info(&request, &trace).await?))
}

pub async fn provide_status_for_live_net_view(
    State(state): State<AppState>,
    InboundTrace(trace): InboundTrace,
    body: Result<Json<LinkEndpointRequest>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(request) = body?;
    let request = request.into_collection()?;
    Ok(Json(state.live_view.status(&request, &trace).await?))
}
