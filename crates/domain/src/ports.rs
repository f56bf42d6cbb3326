//! 外部协作方抽象
//!
//! 核心只依赖这些接口：图存储、出站传输、遥测数据读取。

use async_trait::async_trait;
use fleetctl_core::ControlResult;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::graph::{ForwardingNode, TerminationPoint};
use crate::trace::TraceContext;

/// 图存储适配器，按名称/标识/键路径读写
#[async_trait]
pub trait GraphStore: Send + Sync {
    async fn forwarding_node(&self, name: &str) -> ControlResult<Option<ForwardingNode>>;

    async fn termination_point(&self, uuid: &str) -> ControlResult<Option<TerminationPoint>>;

    /// 所有在 client 引用中列出 `client_uuid` 的终结点
    async fn termination_points_serving(
        &self,
        client_uuid: &str,
    ) -> ControlResult<Vec<TerminationPoint>>;

    async fn value(&self, key_path: &str) -> ControlResult<Option<Value>>;

    async fn set_value(&self, key_path: &str, value: Value) -> ControlResult<()>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutboundRequest {
    pub url: String,
    /// 有序的请求头，名称均为小写连字符形式
    pub headers: Vec<(String, String)>,
    pub body: Value,
}

impl OutboundRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutboundResponse {
    pub status: u16,
    /// 空响应体或非 JSON 响应体时为 None
    pub body: Option<Value>,
}

impl OutboundResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// 出站传输
///
/// 返回 `Ok` 表示请求已经发出并收到了响应（无论状态码）。
#[async_trait]
pub trait OperationTransport: Send + Sync {
    async fn send(&self, request: OutboundRequest) -> ControlResult<OutboundResponse>;
}

/// 实时视图的数据段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TelemetrySection {
    AirInterface,
    Vlan,
    Inventory,
    Alarms,
}

impl TelemetrySection {
    pub fn as_str(&self) -> &'static str {
        match self {
            TelemetrySection::AirInterface => "air-interface",
            TelemetrySection::Vlan => "vlan",
            TelemetrySection::Inventory => "inventory",
            TelemetrySection::Alarms => "alarms",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CollectionRequest {
    pub mount_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_id: Option<String>,
}

/// 设备遥测数据的读取方，结果对核心是不透明的 JSON
#[async_trait]
pub trait DataCollector: Send + Sync {
    async fn collect(
        &self,
        section: TelemetrySection,
        request: &CollectionRequest,
        trace: &TraceContext,
    ) -> ControlResult<Value>;
}
