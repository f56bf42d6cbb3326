use serde::{Deserialize, Serialize};

/// 正在运行（即将退役）的版本身份
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ApplicationRelease {
    pub application_name: String,
    pub release_number: String,
}

/// 接替当前实例的新版本
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SuccessorRelease {
    pub application_name: String,
    pub release_number: String,
    pub protocol: String,
    pub address: String,
    pub port: u16,
}

impl SuccessorRelease {
    pub fn supersedes(&self, current: &ApplicationRelease) -> bool {
        self.release_number != current.release_number
    }
}
