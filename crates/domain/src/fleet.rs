use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::RwLock;

/// 进程内共享的最近一次设备清单快照，后写覆盖前写，不保留历史
#[derive(Debug, Clone, Default)]
pub struct FleetInventory {
    snapshot: Arc<RwLock<Option<Value>>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DeviceAvailability {
    pub mount_name: String,
    pub is_registered: bool,
    pub connection_status: Option<String>,
}

impl FleetInventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn replace(&self, fleet: Value) {
        *self.snapshot.write().await = Some(fleet);
    }

    pub async fn snapshot(&self) -> Option<Value> {
        self.snapshot.read().await.clone()
    }

    pub async fn device_count(&self) -> usize {
        self.snapshot
            .read()
            .await
            .as_ref()
            .map(|fleet| devices(fleet).len())
            .unwrap_or(0)
    }

    pub async fn availability_of(&self, mount_name: &str) -> DeviceAvailability {
        let guard = self.snapshot.read().await;
        let device = guard
            .as_ref()
            .and_then(|fleet| devices(fleet).into_iter().find(|d| device_id(d) == Some(mount_name)));

        DeviceAvailability {
            mount_name: mount_name.to_string(),
            is_registered: device.is_some(),
            connection_status: device
                .and_then(|d| d.get("connection-status"))
                .and_then(Value::as_str)
                .map(str::to_string),
        }
    }
}

/// 设备清单可以是数组，也可以是包裹着一个数组字段的对象
fn devices(fleet: &Value) -> Vec<&Value> {
    match fleet {
        Value::Array(items) => items.iter().collect(),
        Value::Object(map) => map
            .values()
            .find_map(Value::as_array)
            .map(|items| items.iter().collect())
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

fn device_id(device: &Value) -> Option<&str> {
    match device {
        Value::String(id) => Some(id),
        Value::Object(map) => map
            .get("node-id")
            .or_else(|| map.get("mount-name"))
            .and_then(Value::as_str),
        _ => None,
    }
}
