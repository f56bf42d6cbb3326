//! 转发图模型
//!
//! 转发节点通过唯一名称标识，每个节点拥有一组有序的边；边引用一个终结点，
//! 终结点之间通过 server/client 引用分层连接（操作层 → 传输层）。

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PortDirection {
    Input,
    Output,
}

/// 转发节点的一条边，只属于一个节点
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Edge {
    pub direction: PortDirection,
    pub termination_point_ref: String,
}

impl Edge {
    pub fn input<S: Into<String>>(termination_point_ref: S) -> Self {
        Self {
            direction: PortDirection::Input,
            termination_point_ref: termination_point_ref.into(),
        }
    }
    pub fn output<S: Into<String>>(termination_point_ref: S) -> Self {
        Self {
            direction: PortDirection::Output,
            termination_point_ref: termination_point_ref.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ForwardingNode {
    pub name: String,
    /// 节点标识，其前缀用于推导 profile 标识
    pub uuid: String,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

impl ForwardingNode {
    pub fn output_edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges
            .iter()
            .filter(|edge| edge.direction == PortDirection::Output)
    }

    /// 节点标识中 `-op-fc-` 之前的部分；不含该标记时返回完整标识
    pub fn identifier_prefix(&self) -> &str {
        match self.uuid.find("-op-fc-") {
            Some(index) => &self.uuid[..index],
            None => &self.uuid,
        }
    }
}

/// 终结点的分层协议描述
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum LayerProtocol {
    #[serde(rename_all = "kebab-case")]
    TransportClient {
        remote_address: String,
        remote_port: u16,
    },
    #[serde(rename_all = "kebab-case")]
    TransportServer {
        local_address: String,
        local_port: u16,
    },
    #[serde(rename_all = "kebab-case")]
    OperationClient {
        #[serde(default)]
        operation_name: Option<String>,
        #[serde(default)]
        operation_key: Option<String>,
    },
    #[serde(rename_all = "kebab-case")]
    EventStreamClient {
        #[serde(default)]
        authorization: Option<String>,
        #[serde(default)]
        index_alias: Option<String>,
    },
}

impl LayerProtocol {
    pub fn kind(&self) -> &'static str {
        match self {
            LayerProtocol::TransportClient { .. } => "transport-client",
            LayerProtocol::TransportServer { .. } => "transport-server",
            LayerProtocol::OperationClient { .. } => "operation-client",
            LayerProtocol::EventStreamClient { .. } => "event-stream-client",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TerminationPoint {
    pub uuid: String,
    pub layer: LayerProtocol,
    /// 下层（服务方）终结点
    #[serde(default)]
    pub server_refs: Vec<String>,
    /// 上层（客户方）终结点
    #[serde(default)]
    pub client_refs: Vec<String>,
}

impl TerminationPoint {
    pub fn new<S: Into<String>>(uuid: S, layer: LayerProtocol) -> Self {
        Self {
            uuid: uuid.into(),
            layer,
            server_refs: Vec::new(),
            client_refs: Vec::new(),
        }
    }
    pub fn with_server<S: Into<String>>(mut self, server: S) -> Self {
        self.server_refs.push(server.into());
        self
    }
    pub fn with_client<S: Into<String>>(mut self, client: S) -> Self {
        self.client_refs.push(client.into());
        self
    }
    pub fn is_transport_client(&self) -> bool {
        matches!(self.layer, LayerProtocol::TransportClient { .. })
    }
}

/// 传输目标的解析方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransportKind {
    /// 操作层下一跳即为传输客户端
    #[default]
    Http,
    /// 传输绑定挂在兄弟节点上，需要经过服务方引用反查
    Tcp,
}

/// 从边引用的终结点开始，沿 server 引用向下得到的有序终结点序列
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TerminationPointChain {
    layers: Vec<TerminationPoint>,
}

impl TerminationPointChain {
    pub fn new(layers: Vec<TerminationPoint>) -> Self {
        Self { layers }
    }
    pub fn layers(&self) -> &[TerminationPoint] {
        &self.layers
    }
    pub fn len(&self) -> usize {
        self.layers.len()
    }
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
    pub fn head(&self) -> Option<&TerminationPoint> {
        self.layers.first()
    }

    /// 第一个操作层绑定（操作客户端或事件流客户端），先匹配者胜出
    pub fn first_operation_layer(&self) -> Option<&TerminationPoint> {
        self.layers.iter().find(|tp| {
            matches!(
                tp.layer,
                LayerProtocol::OperationClient { .. } | LayerProtocol::EventStreamClient { .. }
            )
        })
    }

    pub fn first_transport_client(&self) -> Option<&TerminationPoint> {
        self.layers.iter().find(|tp| tp.is_transport_client())
    }
}
