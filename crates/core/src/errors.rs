use thiserror::Error;

/// 转发图解析失败的具体原因
///
/// 解析失败属于配置层面的问题，调用方不会自动重试。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionFailure {
    #[error("转发节点不存在: {node}")]
    NodeMissing { node: String },

    #[error("转发节点 {node} 的输出边数量为 {count}，必须恰好为 1")]
    AmbiguousOutput { node: String, count: usize },

    #[error("转发节点 {node} 引用的终结点不存在: {uuid}")]
    TerminationPointMissing { node: String, uuid: String },

    #[error("转发节点 {node} 缺少传输层绑定")]
    TransportBindingMissing { node: String },

    #[error("转发节点 {node} 缺少操作层绑定")]
    OperationBindingMissing { node: String },
}

impl ResolutionFailure {
    pub fn node(&self) -> &str {
        match self {
            Self::NodeMissing { node }
            | Self::AmbiguousOutput { node, .. }
            | Self::TerminationPointMissing { node, .. }
            | Self::TransportBindingMissing { node }
            | Self::OperationBindingMissing { node } => node,
        }
    }
}

/// 控制面错误类型定义
#[derive(Debug, Clone, Error)]
pub enum ControlError {
    #[error("转发图解析失败: {0}")]
    GraphResolution(#[from] ResolutionFailure),

    #[error("调用操作 {operation} 失败: {message}")]
    Dispatch { operation: String, message: String },

    #[error("操作 {operation} 被远端拒绝: HTTP {status}")]
    DispatchRejected { operation: String, status: u16 },

    #[error("图存储错误: {0}")]
    Store(String),

    #[error("配置错误: {0}")]
    Configuration(String),

    #[error("序列化错误: {0}")]
    Serialization(String),

    #[error("无效的请求: {0}")]
    InvalidRequest(String),

    #[error("内部错误: {0}")]
    Internal(String),
}

impl ControlError {
    pub fn dispatch<O: Into<String>, M: Into<String>>(operation: O, message: M) -> Self {
        Self::Dispatch {
            operation: operation.into(),
            message: message.into(),
        }
    }
    pub fn store<S: Into<String>>(msg: S) -> Self {
        Self::Store(msg.into())
    }
    pub fn config_error<S: Into<String>>(msg: S) -> Self {
        Self::Configuration(msg.into())
    }
    pub fn invalid_request<S: Into<String>>(msg: S) -> Self {
        Self::InvalidRequest(msg.into())
    }
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Self::Internal(msg.into())
    }
    pub fn is_resolution_error(&self) -> bool {
        matches!(self, Self::GraphResolution(_))
    }
    /// 调用类错误：对周期刷新来说下一个周期就是重试
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Dispatch { .. } | Self::DispatchRejected { .. })
    }
}

impl From<serde_json::Error> for ControlError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
