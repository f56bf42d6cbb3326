//! 图存储中约定的键路径

pub const APPLICATION_NAME: &str = "http-server/application-name";
pub const RELEASE_NUMBER: &str = "http-server/release-number";

pub const NEW_RELEASE_APPLICATION_NAME: &str = "http-client/new-release/application-name";
pub const NEW_RELEASE_RELEASE_NUMBER: &str = "http-client/new-release/release-number";
pub const NEW_RELEASE_PROTOCOL: &str = "http-client/new-release/protocol";
pub const NEW_RELEASE_ADDRESS: &str = "http-client/new-release/address";
pub const NEW_RELEASE_PORT: &str = "http-client/new-release/port";

pub fn profile_integer_value(profile_id: &str) -> String {
    format!("profile/{profile_id}/integer-value")
}

/// 节点标识前缀与固定后缀拼接成 profile 标识
pub fn profile_id(identifier_prefix: &str, suffix: &str) -> String {
    format!("{identifier_prefix}-{suffix}")
}
