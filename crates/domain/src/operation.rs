use serde::{Deserialize, Serialize};

/// 从操作层终结点解析出的操作描述
///
/// `operation_name` 为空表示链上没有匹配的操作层，调用前必须检查。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct OperationDescriptor {
    pub operation_name: Option<String>,
    pub security_key: Option<String>,
}

impl OperationDescriptor {
    pub fn new<N: Into<String>, K: Into<String>>(operation_name: N, security_key: K) -> Self {
        Self {
            operation_name: Some(operation_name.into()),
            security_key: Some(security_key.into()),
        }
    }
    pub fn unbound() -> Self {
        Self::default()
    }
    pub fn is_bound(&self) -> bool {
        self.operation_name.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TransportTarget {
    pub address: String,
    pub port: u16,
}

impl TransportTarget {
    pub fn new<S: Into<String>>(address: S, port: u16) -> Self {
        Self {
            address: address.into(),
            port,
        }
    }
}

impl std::fmt::Display for TransportTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.address, self.port)
    }
}
