use axum::{
    extract::Request,
    http::{HeaderMap, Method},
    middleware::Next,
    response::Response,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, info_span, Instrument};

/// 入站请求携带的追踪字段，缺失时记为 `-`
fn trace_fields(headers: &HeaderMap) -> (String, String) {
    let field = |name: &str| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("-")
            .to_string()
    };
    (field("x-correlator"), field("trace-indicator"))
}

pub async fn request_logging(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let (correlator, trace_indicator) = trace_fields(request.headers());
    let span = info_span!(
        "inbound",
        x_correlator = %correlator,
        trace_indicator = %trace_indicator
    );

    async move {
        let start = std::time::Instant::now();
        info!("开始处理请求: {} {}", method, uri);

        let response = next.run(request).await;

        info!(
            "完成请求处理: {} {} - 状态: {} - 耗时: {:?}",
            method,
            uri,
            response.status(),
            start.elapsed()
        );
        response
    }
    .instrument(span)
    .await
}

pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any)
}

pub fn trace_layer(
) -> TraceLayer<tower_http::classify::SharedClassifier<tower_http::classify::ServerErrorsAsFailures>>
{
    TraceLayer::new_for_http()
}
