//! 入站请求体
//!
//! 字段名均为连字符形式。

use fleetctl_domain::{CollectionRequest, SuccessorRelease};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct BequeathYourDataAndDie {
    pub new_application_name: String,
    pub new_application_release: String,
    pub new_application_protocol: String,
    pub new_application_address: String,
    pub new_application_port: u16,
}

impl BequeathYourDataAndDie {
    pub fn into_successor(self) -> Result<SuccessorRelease, ApiError> {
        require("new-application-name", &self.new_application_name)?;
        require("new-application-release", &self.new_application_release)?;
        require("new-application-address", &self.new_application_address)?;

        let protocol = self.new_application_protocol.trim().to_uppercase();
        if protocol != "HTTP" && protocol != "HTTPS" {
            return Err(ApiError::bad_request(format!(
                "new-application-protocol 只支持 HTTP 或 HTTPS: {}",
                self.new_application_protocol
            )));
        }
        if self.new_application_port == 0 {
            return Err(ApiError::bad_request("new-application-port 必须大于0"));
        }

        Ok(SuccessorRelease {
            application_name: self.new_application_name,
            release_number: self.new_application_release,
            protocol,
            address: self.new_application_address,
            port: self.new_application_port,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct MountNameRequest {
    pub mount_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct LinkEndpointRequest {
    pub mount_name: String,
    #[serde(default)]
    pub link_id: Option<String>,
}

impl MountNameRequest {
    pub fn into_collection(self) -> Result<CollectionRequest, ApiError> {
        require("mount-name", &self.mount_name)?;
        Ok(CollectionRequest {
            mount_name: self.mount_name,
            link_id: None,
        })
    }
}

impl LinkEndpointRequest {
    /// link-id 必须提供且非空
    pub fn into_collection(self) -> Result<CollectionRequest, ApiError> {
        require("mount-name", &self.mount_name)?;
        let link_id = self.link_id.unwrap_or_default();
        require("link-id", &link_id)?;
        Ok(CollectionRequest {
            mount_name: self.mount_name,
            link_id: Some(link_id),
        })
    }
}

fn require(field: &str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::bad_request(format!("{field} 不能为空")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bequeath() -> BequeathYourDataAndDie {
        serde_json::from_value(serde_json::json!({
            "new-application-name": "DeviceInventory",
            "new-application-release": "2.0.0",
            "new-application-protocol": "http",
            "new-application-address": "10.0.0.20",
            "new-application-port": 3012
        }))
        .unwrap()
    }

    #[test]
    fn test_bequeath_normalises_protocol() {
        let successor = bequeath().into_successor().unwrap();
        assert_eq!(successor.protocol, "HTTP");
        assert_eq!(successor.release_number, "2.0.0");
    }

    #[test]
    fn test_bequeath_rejects_invalid_fields() {
        let mut body = bequeath();
        body.new_application_protocol = "ftp".to_string();
        assert!(body.into_successor().is_err());

        let mut body = bequeath();
        body.new_application_release = " ".to_string();
        assert!(body.into_successor().is_err());

        let mut body = bequeath();
        body.new_application_port = 0;
        assert!(body.into_successor().is_err());
    }

    #[test]
    fn test_link_endpoint_requires_link_id() {
        let request = LinkEndpointRequest {
            mount_name: "513250009".to_string(),
            link_id: None,
        };
        assert!(request.into_collection().is_err());
    }
}
