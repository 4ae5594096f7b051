//! Entra ID connection configuration.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::{EntraError, EntraResult};

/// Microsoft cloud the tenant lives in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntraCloudEnvironment {
    /// Global Azure (graph.microsoft.com).
    #[default]
    Global,
    /// Azure US Government (L4).
    UsGov,
    /// Azure China (21Vianet).
    China,
    /// Explicit endpoints, used for sovereign clouds and tests.
    Custom {
        graph_endpoint: String,
        login_endpoint: String,
    },
}

impl EntraCloudEnvironment {
    /// Parses a cloud name as accepted in configuration.
    pub fn parse(value: &str) -> EntraResult<Self> {
        match value.trim().to_lowercase().as_str() {
            "global" | "commercial" | "public" => Ok(Self::Global),
            "us_gov" | "usgov" | "us_government" => Ok(Self::UsGov),
            "china" => Ok(Self::China),
            other => Err(EntraError::Config(format!(
                "unknown Entra cloud '{other}' (expected global, us_gov or china)"
            ))),
        }
    }

    /// Base URL of Microsoft Graph for this cloud (no trailing slash).
    #[must_use]
    pub fn graph_endpoint(&self) -> &str {
        match self {
            Self::Global => "https://graph.microsoft.com",
            Self::UsGov => "https://graph.microsoft.us",
            Self::China => "https://microsoftgraph.chinacloudapi.cn",
            Self::Custom { graph_endpoint, .. } => graph_endpoint.trim_end_matches('/'),
        }
    }

    /// Base URL of the identity platform login endpoint (no trailing slash).
    #[must_use]
    pub fn login_endpoint(&self) -> &str {
        match self {
            Self::Global => "https://login.microsoftonline.com",
            Self::UsGov => "https://login.microsoftonline.us",
            Self::China => "https://login.chinacloudapi.cn",
            Self::Custom { login_endpoint, .. } => login_endpoint.trim_end_matches('/'),
        }
    }
}

/// App registration credentials for the client credentials flow.
#[derive(Debug, Clone)]
pub struct EntraCredentials {
    pub client_id: String,
    pub client_secret: SecretString,
}

/// Immutable configuration for the Entra directory client.
#[derive(Debug, Clone)]
pub struct EntraConfig {
    /// Directory (tenant) ID.
    pub tenant_id: String,
    /// Cloud the tenant lives in.
    pub cloud_environment: EntraCloudEnvironment,
    /// Graph API version segment (default: `v1.0`).
    pub api_version: String,
    /// HTTP request timeout in seconds.
    pub timeout_secs: u64,
    /// Fail when a group name matches more than one group instead of
    /// picking the first one.
    pub strict_group_names: bool,
}

impl EntraConfig {
    /// Starts building a configuration.
    #[must_use]
    pub fn builder() -> EntraConfigBuilder {
        EntraConfigBuilder::default()
    }
}

/// Builder for [`EntraConfig`].
#[derive(Debug, Default)]
pub struct EntraConfigBuilder {
    tenant_id: Option<String>,
    cloud_environment: Option<EntraCloudEnvironment>,
    api_version: Option<String>,
    timeout_secs: Option<u64>,
    strict_group_names: bool,
}

impl EntraConfigBuilder {
    #[must_use]
    pub fn tenant_id(mut self, tenant_id: impl Into<String>) -> Self {
        self.tenant_id = Some(tenant_id.into());
        self
    }

    #[must_use]
    pub fn cloud_environment(mut self, cloud: EntraCloudEnvironment) -> Self {
        self.cloud_environment = Some(cloud);
        self
    }

    #[must_use]
    pub fn api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = Some(version.into());
        self
    }

    #[must_use]
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    #[must_use]
    pub fn strict_group_names(mut self, strict: bool) -> Self {
        self.strict_group_names = strict;
        self
    }

    /// Validates and builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`EntraError::Config`] if the tenant ID is missing or blank.
    pub fn build(self) -> EntraResult<EntraConfig> {
        let tenant_id = self
            .tenant_id
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| EntraError::Config("tenant_id is required".into()))?;

        let timeout_secs = self.timeout_secs.unwrap_or(30);
        if timeout_secs == 0 {
            return Err(EntraError::Config("timeout_secs must be > 0".into()));
        }

        Ok(EntraConfig {
            tenant_id,
            cloud_environment: self.cloud_environment.unwrap_or_default(),
            api_version: self.api_version.unwrap_or_else(|| "v1.0".to_string()),
            timeout_secs,
            strict_group_names: self.strict_group_names,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let config = EntraConfig::builder().tenant_id("tenant-1").build().unwrap();
        assert_eq!(config.tenant_id, "tenant-1");
        assert_eq!(config.cloud_environment, EntraCloudEnvironment::Global);
        assert_eq!(config.api_version, "v1.0");
        assert_eq!(config.timeout_secs, 30);
        assert!(!config.strict_group_names);
    }

    #[test]
    fn test_builder_requires_tenant() {
        assert!(EntraConfig::builder().build().is_err());
        assert!(EntraConfig::builder().tenant_id("  ").build().is_err());
    }

    #[test]
    fn test_cloud_endpoints() {
        let cloud = EntraCloudEnvironment::parse("us_gov").unwrap();
        assert_eq!(cloud.graph_endpoint(), "https://graph.microsoft.us");
        assert_eq!(cloud.login_endpoint(), "https://login.microsoftonline.us");

        let custom = EntraCloudEnvironment::Custom {
            graph_endpoint: "http://127.0.0.1:9000/".into(),
            login_endpoint: "http://127.0.0.1:9001".into(),
        };
        assert_eq!(custom.graph_endpoint(), "http://127.0.0.1:9000");
        assert_eq!(custom.login_endpoint(), "http://127.0.0.1:9001");
    }

    #[test]
    fn test_unknown_cloud() {
        assert!(EntraCloudEnvironment::parse("mars").is_err());
    }
}
