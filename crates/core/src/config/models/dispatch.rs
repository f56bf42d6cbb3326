use serde::{Deserialize, Serialize};

/// 本应用自身的身份信息
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// 出站请求中的 originator
    pub name: String,
    /// 入站请求未携带 user 时使用的默认值
    pub default_user: String,
}

impl ApplicationConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.name.trim().is_empty() {
            return Err(anyhow::anyhow!("应用名称不能为空"));
        }
        if self.default_user.trim().is_empty() {
            return Err(anyhow::anyhow!("默认用户不能为空"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphStoreConfig {
    /// 转发图种子文件（JSON），为空时以空图启动
    pub seed_file: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportConfig {
    pub scheme: String,
    /// 传输层超时；调用器本身不设超时
    pub request_timeout_seconds: Option<u64>,
}

impl TransportConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        let valid_schemes = ["http", "https"];
        if !valid_schemes.contains(&self.scheme.as_str()) {
            return Err(anyhow::anyhow!(
                "无效的传输协议: {}，支持的协议: {:?}",
                self.scheme,
                valid_schemes
            ));
        }
        if self.request_timeout_seconds == Some(0) {
            return Err(anyhow::anyhow!("请求超时时间必须大于0"));
        }
        Ok(())
    }
}

/// 版本交接流程使用的转发节点
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HandoverConfig {
    pub broadcast_node: String,
    pub deregister_node: String,
}

impl HandoverConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.broadcast_node.is_empty() || self.deregister_node.is_empty() {
            return Err(anyhow::anyhow!("交接流程的转发节点名称不能为空"));
        }
        if self.broadcast_node == self.deregister_node {
            return Err(anyhow::anyhow!("广播节点与注销节点不能相同"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshConfig {
    pub enabled: bool,
    pub node: String,
    /// 与节点标识前缀拼接得到刷新间隔的 profile 标识
    pub profile_suffix: String,
    /// profile 缺失时使用的刷新间隔（分钟）
    pub fallback_interval_minutes: Option<u64>,
}

impl RefreshConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.node.is_empty() {
            return Err(anyhow::anyhow!("刷新节点名称不能为空"));
        }
        if self.profile_suffix.is_empty() {
            return Err(anyhow::anyhow!("profile 后缀不能为空"));
        }
        if self.fallback_interval_minutes == Some(0) {
            return Err(anyhow::anyhow!("刷新间隔必须大于0"));
        }
        Ok(())
    }
}

/// 实时网络视图各数据段对应的转发节点
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiveViewConfig {
    pub air_interface_node: String,
    pub vlan_node: String,
    pub inventory_node: String,
    pub alarms_node: String,
}

impl LiveViewConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        for node in [
            &self.air_interface_node,
            &self.vlan_node,
            &self.inventory_node,
            &self.alarms_node,
        ] {
            if node.is_empty() {
                return Err(anyhow::anyhow!("实时视图的转发节点名称不能为空"));
            }
        }
        Ok(())
    }
}
