use std::collections::BTreeMap;
use std::path::Path;

use fleetctl_core::{ControlError, ControlResult};
use fleetctl_domain::{ForwardingNode, TerminationPoint};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 图存储的初始内容
///
/// ```json
/// {
///   "forwarding-nodes": [{"name": "...", "uuid": "...", "edges": [...]}],
///   "termination-points": [{"uuid": "...", "layer": {"kind": "transport-client", ...}}],
///   "values": {"http-server/release-number": "1.0.0"}
/// }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct GraphSeed {
    #[serde(default)]
    pub forwarding_nodes: Vec<ForwardingNode>,
    #[serde(default)]
    pub termination_points: Vec<TerminationPoint>,
    #[serde(default)]
    pub values: BTreeMap<String, Value>,
}

impl GraphSeed {
    pub fn from_json(json: &str) -> ControlResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub async fn from_file<P: AsRef<Path>>(path: P) -> ControlResult<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            ControlError::store(format!("读取图种子文件 {} 失败: {e}", path.display()))
        })?;
        Self::from_json(&content)
    }
}
