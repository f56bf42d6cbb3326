use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};

use crate::{
    error::{ApiError, ApiResult},
    routes::AppState,
};

/// Prometheus 文本格式的指标
pub async fn render_metrics(State(state): State<AppState>) -> ApiResult<Response> {
    let handle = state.metrics.as_ref().ok_or(ApiError::NotFound)?;
    Ok((
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        handle.render(),
    )
        .into_response())
}
