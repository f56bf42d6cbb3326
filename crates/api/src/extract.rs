//! 入站追踪头解析

use std::convert::Infallible;

use axum::{extract::FromRequestParts, http::request::Parts};
use fleetctl_domain::TraceContext;

use crate::routes::AppState;

/// 从 `user`、`originator`、`x-correlator`、`trace-indicator`、`customer-journey`
/// 请求头得到的追踪上下文；缺失字段使用默认值
#[derive(Debug, Clone)]
pub struct InboundTrace(pub TraceContext);

impl FromRequestParts<AppState> for InboundTrace {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = |name: &str| {
            parts
                .headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        };

        let mut trace = TraceContext::new(
            header("user").unwrap_or_else(|| state.application.default_user.clone()),
            header("originator").unwrap_or_else(|| state.application.name.clone()),
        );
        if let Some(correlator) = header("x-correlator") {
            trace = trace.with_correlator(correlator);
        }
        if let Some(indicator) = header("trace-indicator") {
            trace = trace.with_trace_indicator(indicator);
        }
        if let Some(journey) = header("customer-journey") {
            trace = trace.with_customer_journey(journey);
        }

        Ok(InboundTrace(trace))
    }
}
