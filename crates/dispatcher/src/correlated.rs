//! 关联调用器
//!
//! 为每次出站调用构造请求头（调用者身份、关联标识、追踪路径、旅程标识、操作密钥），
//! 调用本身不重试、不退避，也不设超时。

use std::sync::Arc;

use fleetctl_core::{ControlError, ControlResult, ResolutionFailure};
use fleetctl_domain::{
    OperationDescriptor, OperationTransport, OutboundRequest, TraceContext, TraceSequence,
    TransportTarget,
};
use fleetctl_infrastructure::MetricsCollector;
use serde_json::Value;
use tracing::{debug, warn};

/// 一次已完成调用的结果
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchOutcome {
    pub status: u16,
    pub body: Option<Value>,
    /// 远端在响应体中给出的布尔结果；没有时取状态码是否为 2xx
    pub success: bool,
}

impl DispatchOutcome {
    fn from_response(status: u16, body: Option<Value>) -> Self {
        let reported = match &body {
            Some(Value::Bool(flag)) => Some(*flag),
            Some(Value::Object(map)) => map.get("success").and_then(Value::as_bool),
            _ => None,
        };
        Self {
            status,
            success: reported.unwrap_or((200..300).contains(&status)),
            body,
        }
    }

    pub fn is_2xx(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// 非 2xx 响应转换为 [`ControlError::DispatchRejected`]
    pub fn accepted(self, operation: &str) -> ControlResult<Self> {
        if self.is_2xx() {
            Ok(self)
        } else {
            Err(ControlError::DispatchRejected {
                operation: operation.to_string(),
                status: self.status,
            })
        }
    }
}

#[derive(Clone)]
pub struct CorrelatedDispatcher {
    transport: Arc<dyn OperationTransport>,
    scheme: String,
    metrics: MetricsCollector,
}

impl CorrelatedDispatcher {
    pub fn new<S: Into<String>>(transport: Arc<dyn OperationTransport>, scheme: S) -> Self {
        Self {
            transport,
            scheme: scheme.into(),
            metrics: MetricsCollector::new(),
        }
    }

    /// 使用调用点的步进计数器发出调用
    ///
    /// 只有在收到响应（任意状态码）后计数器才前进；未绑定的操作在发送前被拒绝。
    pub async fn dispatch(
        &self,
        operation: &OperationDescriptor,
        target: &TransportTarget,
        payload: Value,
        sequence: &mut TraceSequence,
    ) -> ControlResult<DispatchOutcome> {
        let context = sequence.next_context();
        let outcome = self
            .dispatch_with_context(operation, target, payload, &context)
            .await?;
        sequence.advance();
        Ok(outcome)
    }

    /// 使用给定的上下文原样发出调用，不做追踪路径扩展
    pub async fn dispatch_with_context(
        &self,
        operation: &OperationDescriptor,
        target: &TransportTarget,
        payload: Value,
        context: &TraceContext,
    ) -> ControlResult<DispatchOutcome> {
        let Some(operation_name) = operation.operation_name.as_deref() else {
            return Err(ResolutionFailure::OperationBindingMissing {
                node: target.to_string(),
            }
            .into());
        };

        let request = self.build_request(operation_name, operation, target, payload, context);
        debug!(
            operation = operation_name,
            trace_indicator = %context.trace_indicator,
            x_correlator = %context.x_correlator,
            "发起出站调用: {}",
            request.url
        );

        match self.transport.send(request).await {
            Ok(response) => {
                let outcome = DispatchOutcome::from_response(response.status, response.body);
                let label = if outcome.success { "success" } else { "failure" };
                self.metrics.record_dispatch(operation_name, label);
                if !outcome.success {
                    warn!(
                        operation = operation_name,
                        status = outcome.status,
                        trace_indicator = %context.trace_indicator,
                        "远端报告操作失败"
                    );
                }
                Ok(outcome)
            }
            Err(e) => {
                self.metrics.record_dispatch(operation_name, "error");
                warn!(
                    operation = operation_name,
                    trace_indicator = %context.trace_indicator,
                    "出站调用失败: {}",
                    e
                );
                Err(e)
            }
        }
    }

    fn build_request(
        &self,
        operation_name: &str,
        operation: &OperationDescriptor,
        target: &TransportTarget,
        payload: Value,
        context: &TraceContext,
    ) -> OutboundRequest {
        let headers = [
            ("content-type", "application/json"),
            ("user", context.user.as_str()),
            ("originator", context.originator.as_str()),
            ("x-correlator", context.x_correlator.as_str()),
            ("trace-indicator", context.trace_indicator.as_str()),
            ("customer-journey", context.customer_journey.as_str()),
            ("operation-key", operation.security_key.as_deref().unwrap_or_default()),
        ]
        .into_iter()
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect();

        OutboundRequest {
            url: format!(
                "{}://{}:{}{}",
                self.scheme, target.address, target.port, operation_name
            ),
            headers,
            body: payload,
        }
    }
}
