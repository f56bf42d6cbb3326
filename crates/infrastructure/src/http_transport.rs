use std::time::Duration;

use async_trait::async_trait;
use fleetctl_core::{ControlError, ControlResult};
use fleetctl_domain::{OperationTransport, OutboundRequest, OutboundResponse};
use serde_json::Value;
use tracing::{debug, warn};

/// 基于 reqwest 的出站传输，所有请求都以 JSON POST 发出
#[derive(Debug, Clone)]
pub struct HttpOperationTransport {
    http_client: reqwest::Client,
}

impl HttpOperationTransport {
    pub fn new(request_timeout: Option<Duration>) -> ControlResult<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = request_timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder
            .build()
            .map_err(|e| ControlError::config_error(format!("创建HTTP客户端失败: {e}")))?;
        Ok(Self { http_client })
    }

    pub fn with_client(http_client: reqwest::Client) -> Self {
        Self { http_client }
    }
}

#[async_trait]
impl OperationTransport for HttpOperationTransport {
    async fn send(&self, request: OutboundRequest) -> ControlResult<OutboundResponse> {
        let mut builder = self.http_client.post(&request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        let body = serde_json::to_vec(&request.body)?;

        match builder.body(body).send().await {
            Ok(response) => {
                let status = response.status().as_u16();
                let bytes = response.bytes().await.map_err(|e| {
                    ControlError::dispatch(&request.url, format!("读取响应体失败: {e}"))
                })?;
                // 空响应体或非 JSON 响应体视为无响应体
                let body = if bytes.is_empty() {
                    None
                } else {
                    serde_json::from_slice::<Value>(&bytes).ok()
                };
                debug!("POST {} 返回 HTTP {}", request.url, status);
                Ok(OutboundResponse { status, body })
            }
            Err(e) => {
                warn!("请求 {} 失败: {}", request.url, e);
                Err(ControlError::dispatch(&request.url, e.to_string()))
            }
        }
    }
}
