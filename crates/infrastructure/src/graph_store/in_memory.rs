use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use fleetctl_core::ControlResult;
use fleetctl_domain::{ForwardingNode, GraphStore, TerminationPoint};
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, info};

use super::seed::GraphSeed;

/// 内存图存储实现
///
/// 读写针对单个键，不提供快照隔离；写入后立即可读。
#[derive(Debug, Clone, Default)]
pub struct InMemoryGraphStore {
    forwarding_nodes: Arc<RwLock<HashMap<String, ForwardingNode>>>,
    termination_points: Arc<RwLock<HashMap<String, TerminationPoint>>>,
    values: Arc<RwLock<HashMap<String, Value>>>,
}

impl InMemoryGraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_seed(seed: GraphSeed) -> Self {
        info!(
            "加载转发图: {} 个转发节点, {} 个终结点, {} 个键值",
            seed.forwarding_nodes.len(),
            seed.termination_points.len(),
            seed.values.len()
        );

        let forwarding_nodes = seed
            .forwarding_nodes
            .into_iter()
            .map(|node| (node.name.clone(), node))
            .collect();
        let termination_points = seed
            .termination_points
            .into_iter()
            .map(|tp| (tp.uuid.clone(), tp))
            .collect();

        Self {
            forwarding_nodes: Arc::new(RwLock::new(forwarding_nodes)),
            termination_points: Arc::new(RwLock::new(termination_points)),
            values: Arc::new(RwLock::new(seed.values.into_iter().collect())),
        }
    }

    pub async fn put_forwarding_node(&self, node: ForwardingNode) {
        self.forwarding_nodes
            .write()
            .await
            .insert(node.name.clone(), node);
    }

    pub async fn put_termination_point(&self, tp: TerminationPoint) {
        self.termination_points
            .write()
            .await
            .insert(tp.uuid.clone(), tp);
    }
}

#[async_trait]
impl GraphStore for InMemoryGraphStore {
    async fn forwarding_node(&self, name: &str) -> ControlResult<Option<ForwardingNode>> {
        Ok(self.forwarding_nodes.read().await.get(name).cloned())
    }

    async fn termination_point(&self, uuid: &str) -> ControlResult<Option<TerminationPoint>> {
        Ok(self.termination_points.read().await.get(uuid).cloned())
    }

    async fn termination_points_serving(
        &self,
        client_uuid: &str,
    ) -> ControlResult<Vec<TerminationPoint>> {
        let tps = self.termination_points.read().await;
        let mut serving: Vec<TerminationPoint> = tps
            .values()
            .filter(|tp| tp.client_refs.iter().any(|c| c == client_uuid))
            .cloned()
            .collect();
        // HashMap 无序，按标识排序保证结果稳定
        serving.sort_by(|a, b| a.uuid.cmp(&b.uuid));
        Ok(serving)
    }

    async fn value(&self, key_path: &str) -> ControlResult<Option<Value>> {
        Ok(self.values.read().await.get(key_path).cloned())
    }

    async fn set_value(&self, key_path: &str, value: Value) -> ControlResult<()> {
        debug!("写入图存储: {} = {}", key_path, value);
        self.values.write().await.insert(key_path.to_string(), value);
        Ok(())
    }
}
