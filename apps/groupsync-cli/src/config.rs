//! Runtime configuration from the environment (and `.env`), with command
//! line overrides for the group names and log format.

use groupsync_entra::{EntraCloudEnvironment, EntraConfig, EntraCredentials};
use groupsync_reconcile::GroupPair;
use groupsync_scim::{ScimConfig, ScimCredentials, DEFAULT_PAGE_SIZE};
use secrecy::SecretString;

use crate::logging::LogFormat;

/// Values given on the command line; they take precedence over the environment.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub entra_group: Option<String>,
    pub netskope_group: Option<String>,
    pub log_format: Option<LogFormat>,
}

/// Entra ID app registration and group.
#[derive(Debug, Clone)]
pub struct EntraSettings {
    pub tenant_id: String,
    pub client_id: String,
    pub client_secret: SecretString,
    pub group_name: String,
    pub cloud: EntraCloudEnvironment,
}

/// Netskope SCIM endpoint and group.
#[derive(Debug, Clone)]
pub struct NetskopeSettings {
    pub scim_url: String,
    pub api_token: SecretString,
    pub group_name: String,
    pub page_size: i64,
    pub tls_verify: bool,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub entra: EntraSettings,
    pub netskope: NetskopeSettings,
    pub http_timeout_secs: u64,
    pub max_retries: u32,
    pub strict_group_names: bool,
    pub log_format: LogFormat,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env(overrides: &Overrides) -> Result<Self, ConfigError> {
        Self::from_reader(|key| std::env::var(key), overrides)
    }

    /// Load configuration from a custom variable reader.
    pub fn from_reader<F>(reader: F, overrides: &Overrides) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Result<String, std::env::VarError>,
    {
        let optional = |key: &str| {
            reader(key)
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let required =
            |key: &str| optional(key).ok_or_else(|| ConfigError::MissingVar(key.to_string()));

        let entra_group = overrides
            .entra_group
            .clone()
            .or_else(|| optional("ENTRA_GROUP_NAME"))
            .ok_or_else(|| ConfigError::MissingVar("ENTRA_GROUP_NAME (or --entra-group)".into()))?;
        let netskope_group = overrides
            .netskope_group
            .clone()
            .or_else(|| optional("NETSKOPE_GROUP_NAME"))
            .ok_or_else(|| {
                ConfigError::MissingVar("NETSKOPE_GROUP_NAME (or --netskope-group)".into())
            })?;

        let cloud = match (optional("ENTRA_GRAPH_ENDPOINT"), optional("ENTRA_LOGIN_ENDPOINT")) {
            (Some(graph_endpoint), Some(login_endpoint)) => EntraCloudEnvironment::Custom {
                graph_endpoint,
                login_endpoint,
            },
            (None, None) => match optional("ENTRA_CLOUD") {
                Some(name) => EntraCloudEnvironment::parse(&name)
                    .map_err(|e| ConfigError::InvalidValue("ENTRA_CLOUD".into(), e.to_string()))?,
                None => EntraCloudEnvironment::default(),
            },
            _ => {
                return Err(ConfigError::InvalidValue(
                    "ENTRA_GRAPH_ENDPOINT".into(),
                    "ENTRA_GRAPH_ENDPOINT and ENTRA_LOGIN_ENDPOINT must be set together".into(),
                ))
            }
        };

        let scim_url = match (optional("NETSKOPE_SCIM_URL"), optional("NETSKOPE_TENANT")) {
            (Some(url), _) => url.trim_end_matches('/').to_string(),
            (None, Some(tenant)) => ScimConfig::netskope_base_url(&tenant),
            (None, None) => {
                return Err(ConfigError::MissingVar(
                    "NETSKOPE_TENANT (or NETSKOPE_SCIM_URL)".into(),
                ))
            }
        };

        let page_size = parse_or(&optional, "NETSKOPE_PAGE_SIZE", DEFAULT_PAGE_SIZE)?;
        if page_size < 1 {
            return Err(ConfigError::InvalidValue(
                "NETSKOPE_PAGE_SIZE".into(),
                "must be at least 1".into(),
            ));
        }

        let http_timeout_secs = parse_or(&optional, "HTTP_TIMEOUT_SECS", 30u64)?;
        if http_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "HTTP_TIMEOUT_SECS".into(),
                "must be greater than zero".into(),
            ));
        }

        let log_format = match overrides.log_format {
            Some(format) => format,
            None => match optional("LOG_FORMAT") {
                Some(raw) => raw
                    .parse()
                    .map_err(|e: String| ConfigError::InvalidValue("LOG_FORMAT".into(), e))?,
                None => LogFormat::default(),
            },
        };

        Ok(Self {
            entra: EntraSettings {
                tenant_id: required("ENTRA_TENANT_ID")?,
                client_id: required("ENTRA_CLIENT_ID")?,
                client_secret: SecretString::from(required("ENTRA_CLIENT_SECRET")?),
                group_name: entra_group,
                cloud,
            },
            netskope: NetskopeSettings {
                scim_url,
                api_token: SecretString::from(required("NETSKOPE_API_TOKEN")?),
                group_name: netskope_group,
                page_size,
                tls_verify: parse_bool_or(&optional, "NETSKOPE_TLS_VERIFY", true)?,
            },
            http_timeout_secs,
            max_retries: parse_or(&optional, "MAX_RETRIES", 5u32)?,
            strict_group_names: parse_bool_or(&optional, "STRICT_GROUP_NAMES", false)?,
            log_format,
        })
    }

    pub fn groups(&self) -> GroupPair {
        GroupPair {
            source_group: self.entra.group_name.clone(),
            target_group: self.netskope.group_name.clone(),
        }
    }

    pub fn entra_config(&self) -> Result<EntraConfig, ConfigError> {
        EntraConfig::builder()
            .tenant_id(self.entra.tenant_id.clone())
            .cloud_environment(self.entra.cloud.clone())
            .timeout_secs(self.http_timeout_secs)
            .strict_group_names(self.strict_group_names)
            .build()
            .map_err(|e| ConfigError::InvalidValue("ENTRA_TENANT_ID".into(), e.to_string()))
    }

    pub fn entra_credentials(&self) -> EntraCredentials {
        EntraCredentials {
            client_id: self.entra.client_id.clone(),
            client_secret: self.entra.client_secret.clone(),
        }
    }

    pub fn scim_config(&self) -> ScimConfig {
        ScimConfig::new(
            self.netskope.scim_url.clone(),
            ScimCredentials::netskope(self.netskope.api_token.clone()),
        )
        .with_page_size(self.netskope.page_size)
        .with_timeout_secs(self.http_timeout_secs)
        .with_tls_verify(self.netskope.tls_verify)
        .with_max_retries(self.max_retries)
    }
}

fn parse_or<T, F>(optional: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match optional(key) {
        Some(raw) => raw
            .parse()
            .map_err(|e: T::Err| ConfigError::InvalidValue(key.to_string(), e.to_string())),
        None => Ok(default),
    }
}

fn parse_bool_or<F>(optional: &F, key: &str, default: bool) -> Result<bool, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match optional(key).map(|v| v.to_lowercase()) {
        None => Ok(default),
        Some(v) => match v.as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::InvalidValue(
                key.to_string(),
                format!("'{v}' is not a boolean"),
            )),
        },
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingVar(String),

    #[error("invalid value for {0}: {1}")]
    InvalidValue(String, String),
}
