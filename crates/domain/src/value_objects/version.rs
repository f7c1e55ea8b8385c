use serde::{Deserialize, Serialize};

/// Deployment the current factory and pool versions come from.
pub const REBALANCED_LINEAR_POOL_DEPLOYMENT: &str = "20221113-euler-rebalanced-linear-pool";

/// Version metadata a factory or pool reports through `version()`.
///
/// Serialized as `{"name":...,"version":...,"deployment":...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionInfo {
    pub name: String,
    pub version: u32,
    pub deployment: String,
}

impl VersionInfo {
    pub fn new(name: impl Into<String>, version: u32, deployment: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version,
            deployment: deployment.into(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Factory tag for the rebalanced linear pool deployment.
    pub fn euler_factory() -> Self {
        Self::new("EulerLinearPoolFactory", 1, REBALANCED_LINEAR_POOL_DEPLOYMENT)
    }

    /// Pool tag for the rebalanced linear pool deployment.
    pub fn euler_pool() -> Self {
        Self::new("EulerLinearPool", 1, REBALANCED_LINEAR_POOL_DEPLOYMENT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_version_json() {
        assert_eq!(
            VersionInfo::euler_factory().to_json().unwrap(),
            r#"{"name":"EulerLinearPoolFactory","version":1,"deployment":"20221113-euler-rebalanced-linear-pool"}"#
        );
    }

    #[test]
    fn test_parse_version() {
        let json = r#"{"name":"EulerLinearPool","version":1,"deployment":"20221113-euler-rebalanced-linear-pool"}"#;
        assert_eq!(VersionInfo::from_json(json).unwrap(), VersionInfo::euler_pool());
    }
}
