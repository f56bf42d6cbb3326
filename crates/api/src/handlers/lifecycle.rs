use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use fleetctl_dispatcher::HandoverOutcome;
use tracing::{error, info};

use crate::{
    error::ApiResult, extract::InboundTrace, routes::AppState, types::BequeathYourDataAndDie,
};

/// 立即返回 204，版本交接作为独立的后台任务执行
///
/// 交接的成败只体现在日志中，不会影响已经发出的响应。
pub async fn bequeath_your_data_and_die(
    State(state): State<AppState>,
    InboundTrace(trace): InboundTrace,
    body: Result<Json<BequeathYourDataAndDie>, JsonRejection>,
) -> ApiResult<StatusCode> {
    let Json(request) = body?;
    let successor = request.into_successor()?;

    let handover = state.handover.clone();
    tokio::spawn(async move {
        match handover.execute(&successor, &trace).await {
            Ok(HandoverOutcome::AlreadyCurrent) => {
                info!(x_correlator = %trace.x_correlator, "版本已是最新，无需交接");
            }
            Ok(HandoverOutcome::Completed { deregistered }) => {
                info!(
                    x_correlator = %trace.x_correlator,
                    deregistered,
                    "版本交接结束: 新版本 {}",
                    successor.release_number
                );
            }
            Err(e) => {
                error!(x_correlator = %trace.x_correlator, "后台版本交接失败: {}", e);
            }
        }
    });

    Ok(StatusCode::NO_CONTENT)
}
