use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use fleetctl_core::ControlError;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("控制面错误: {0}")]
    Control(#[from] ControlError),

    #[error("请求参数错误: {0}")]
    BadRequest(String),

    #[error("未找到资源")]
    NotFound,

    #[error("内部服务器错误: {0}")]
    Internal(String),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl ApiError {
    pub fn bad_request<S: Into<String>>(msg: S) -> Self {
        ApiError::BadRequest(msg.into())
    }

    fn classify(&self) -> (StatusCode, String, &'static str, Vec<String>) {
        match self {
            ApiError::Control(ControlError::InvalidRequest(msg)) | ApiError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                format!("请求参数错误: {msg}"),
                "BAD_REQUEST",
                vec![
                    "请检查请求体字段是否完整".to_string(),
                    "字段名使用连字符形式，例如 mount-name".to_string(),
                ],
            ),
            // 路由不可解析是部署侧的转发图问题，不是调用方的错误
            ApiError::Control(ControlError::GraphResolution(failure)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("转发图无法解析: {failure}"),
                "ROUTE_NOT_RESOLVABLE",
                vec![
                    format!("请检查转发节点 {} 的配置", failure.node()),
                    "每个转发节点必须恰好有一条输出边".to_string(),
                ],
            ),
            ApiError::Control(
                err @ (ControlError::Dispatch { .. } | ControlError::DispatchRejected { .. }),
            ) => (
                StatusCode::BAD_GATEWAY,
                err.to_string(),
                "UPSTREAM_DISPATCH_FAILED",
                vec!["下游应用不可用或拒绝了请求，请稍后重试".to_string()],
            ),
            ApiError::NotFound => (
                StatusCode::NOT_FOUND,
                "请求的资源不存在".to_string(),
                "NOT_FOUND",
                vec!["请检查请求URL是否正确".to_string()],
            ),
            ApiError::Control(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "系统内部错误".to_string(),
                "INTERNAL_ERROR",
                vec![format!("错误详情: {err}")],
            ),
            ApiError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "系统内部错误".to_string(),
                "INTERNAL_ERROR",
                vec![format!("错误详情: {msg}")],
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, error_type, suggestions) = self.classify();
        if status.is_server_error() {
            tracing::error!("请求处理失败: {}", self);
        }

        let body = Json(json!({
            "error": {
                "message": message,
                "type": error_type,
                "code": status.as_u16(),
                "suggestions": suggestions,
                "timestamp": chrono::Utc::now().to_rfc3339(),
            }
        }));

        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use fleetctl_core::ResolutionFailure;

    #[test]
    fn test_invalid_request_is_bad_request() {
        let response =
            ApiError::from(ControlError::invalid_request("mount-name 缺失")).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_unresolvable_route_is_server_error() {
        let error: ApiError = ControlError::from(ResolutionFailure::AmbiguousOutput {
            node: "RequestForLiveVlanDataCausesReadingFromDevice".to_string(),
            count: 0,
        })
        .into();
        let (status, _, error_type, suggestions) = error.classify();

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(error_type, "ROUTE_NOT_RESOLVABLE");
        assert!(suggestions[0].contains("RequestForLiveVlanDataCausesReadingFromDevice"));
    }

    #[test]
    fn test_dispatch_failures_are_bad_gateway() {
        let response = ApiError::from(ControlError::DispatchRejected {
            operation: "/v1/read".to_string(),
            status: 503,
        })
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

        let response =
            ApiError::from(ControlError::dispatch("/v1/read", "timed out")).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_other_errors_are_internal() {
        let response = ApiError::from(ControlError::store("boom")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(ApiError::NotFound.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_api_error_display() {
        assert_eq!(format!("{}", ApiError::NotFound), "未找到资源");
    }
}
