//! 版本交接流程
//!
//! 两个步骤严格顺序执行，不回滚：先广播服务替换，再在旧版本仍未被替换时注销旧版本。
//! 广播成功而注销失败是合法的终止状态，需要外部对账。

use std::sync::Arc;

use fleetctl_core::{ControlError, ControlResult, HandoverConfig};
use fleetctl_domain::{
    key_paths, ApplicationRelease, GraphStore, SuccessorRelease, TraceContext, TraceSequence,
    TransportKind,
};
use fleetctl_infrastructure::MetricsCollector;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{error, info, warn};

use crate::correlated::CorrelatedDispatcher;
use crate::resolver::ForwardingGraphResolver;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandoverOutcome {
    /// 声明的新版本与当前版本相同，没有发出任何调用
    AlreadyCurrent,
    Completed { deregistered: bool },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct BroadcastReplacement {
    pub current_application_name: String,
    pub current_release_number: String,
    pub future_application_name: String,
    pub future_release_number: String,
    pub future_protocol: String,
    pub future_address: String,
    pub future_port: u16,
}

impl BroadcastReplacement {
    pub fn new(current: &ApplicationRelease, successor: &SuccessorRelease) -> Self {
        Self {
            current_application_name: current.application_name.clone(),
            current_release_number: current.release_number.clone(),
            future_application_name: successor.application_name.clone(),
            future_release_number: successor.release_number.clone(),
            future_protocol: successor.protocol.clone(),
            future_address: successor.address.clone(),
            future_port: successor.port,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DeregisterRelease {
    pub application_name: String,
    pub release_number: String,
}

#[derive(Clone)]
pub struct ReleaseHandover {
    store: Arc<dyn GraphStore>,
    resolver: ForwardingGraphResolver,
    dispatcher: CorrelatedDispatcher,
    config: HandoverConfig,
    metrics: MetricsCollector,
}

impl ReleaseHandover {
    pub fn new(
        resolver: ForwardingGraphResolver,
        dispatcher: CorrelatedDispatcher,
        config: HandoverConfig,
    ) -> Self {
        Self {
            store: resolver.store().clone(),
            resolver,
            dispatcher,
            config,
            metrics: MetricsCollector::new(),
        }
    }

    pub async fn execute(
        &self,
        successor: &SuccessorRelease,
        trace: &TraceContext,
    ) -> ControlResult<HandoverOutcome> {
        let result = self.run(successor, trace).await;
        let label = match &result {
            Ok(HandoverOutcome::AlreadyCurrent) => "already_current",
            Ok(HandoverOutcome::Completed { deregistered: true }) => "completed",
            Ok(HandoverOutcome::Completed { deregistered: false }) => "broadcast_only",
            Err(_) => "failed",
        };
        self.metrics.record_handover(label);
        result
    }

    async fn run(
        &self,
        successor: &SuccessorRelease,
        trace: &TraceContext,
    ) -> ControlResult<HandoverOutcome> {
        let current = self.current_release().await?;
        if !successor.supersedes(&current) {
            info!(
                release = %current.release_number,
                "新版本与当前版本相同，跳过交接"
            );
            return Ok(HandoverOutcome::AlreadyCurrent);
        }

        info!(
            x_correlator = %trace.x_correlator,
            "开始版本交接: {} {} -> {} {}",
            current.application_name,
            current.release_number,
            successor.application_name,
            successor.release_number
        );
        self.record_successor(successor).await?;

        // 两个步骤共用同一个计数器
        let mut sequence = trace.sequence();

        self.broadcast_replacement(&current, successor, &mut sequence)
            .await
            .map_err(|e| {
                error!("广播服务替换失败，交接中止: {}", e);
                ControlError::internal(format!("广播服务替换失败: {e}"))
            })?;

        let still_old = self
            .release_number()
            .await?
            .map(|number| number != successor.release_number)
            .unwrap_or(true);
        if !still_old {
            info!("当前版本已被替换，跳过注销旧版本");
            return Ok(HandoverOutcome::Completed {
                deregistered: false,
            });
        }

        self.deregister_old_release(&current, &mut sequence)
            .await
            .map_err(|e| {
                error!("注销旧版本失败，广播已生效: {}", e);
                ControlError::internal(format!("注销旧版本失败: {e}"))
            })?;

        info!("版本交接完成");
        Ok(HandoverOutcome::Completed { deregistered: true })
    }

    async fn broadcast_replacement(
        &self,
        current: &ApplicationRelease,
        successor: &SuccessorRelease,
        sequence: &mut TraceSequence,
    ) -> ControlResult<()> {
        let payload = serde_json::to_value(BroadcastReplacement::new(current, successor))?;
        self.dispatch_step(&self.config.broadcast_node, payload, sequence)
            .await
    }

    async fn deregister_old_release(
        &self,
        current: &ApplicationRelease,
        sequence: &mut TraceSequence,
    ) -> ControlResult<()> {
        let payload = serde_json::to_value(DeregisterRelease {
            application_name: current.application_name.clone(),
            release_number: current.release_number.clone(),
        })?;
        self.dispatch_step(&self.config.deregister_node, payload, sequence)
            .await
    }

    async fn dispatch_step(
        &self,
        node: &str,
        payload: Value,
        sequence: &mut TraceSequence,
    ) -> ControlResult<()> {
        let route = self.resolver.resolve_route(node, TransportKind::Http).await?;
        let outcome = self
            .dispatcher
            .dispatch(&route.operation, &route.target, payload, sequence)
            .await?;

        if outcome.success {
            Ok(())
        } else {
            warn!(node, status = outcome.status, "交接步骤被远端拒绝");
            Err(ControlError::DispatchRejected {
                operation: route.operation.operation_name.unwrap_or_default(),
                status: outcome.status,
            })
        }
    }

    async fn current_release(&self) -> ControlResult<ApplicationRelease> {
        let application_name = self
            .store
            .value(key_paths::APPLICATION_NAME)
            .await?
            .and_then(|v| text_of(&v))
            .ok_or_else(|| ControlError::store("当前应用名称缺失"))?;
        let release_number = self
            .release_number()
            .await?
            .ok_or_else(|| ControlError::store("当前版本号缺失"))?;

        Ok(ApplicationRelease {
            application_name,
            release_number,
        })
    }

    async fn release_number(&self) -> ControlResult<Option<String>> {
        Ok(self
            .store
            .value(key_paths::RELEASE_NUMBER)
            .await?
            .and_then(|v| text_of(&v)))
    }

    async fn record_successor(&self, successor: &SuccessorRelease) -> ControlResult<()> {
        let entries = [
            (
                key_paths::NEW_RELEASE_APPLICATION_NAME,
                json!(successor.application_name),
            ),
            (
                key_paths::NEW_RELEASE_RELEASE_NUMBER,
                json!(successor.release_number),
            ),
            (key_paths::NEW_RELEASE_PROTOCOL, json!(successor.protocol)),
            (key_paths::NEW_RELEASE_ADDRESS, json!(successor.address)),
            (key_paths::NEW_RELEASE_PORT, json!(successor.port)),
        ];
        for (key, value) in entries {
            self.store.set_value(key, value).await?;
        }
        Ok(())
    }
}

/// 字符串原样返回，数字转为文本
fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
