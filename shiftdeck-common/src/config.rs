//! Console configuration

use serde::{Deserialize, Serialize};

use crate::sandbox::SandboxCluster;
use crate::{Error, Result};

/// Element id of the optional JSON config block in the host page
pub const CONFIG_ELEMENT_ID: &str = "shiftdeck-config";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    /// Cluster API base URL. `None` runs the console against the sandbox.
    pub api_base: Option<String>,
    /// Local storage key holding the bearer token
    pub token_key: String,
    /// Local storage key holding the last-used namespace
    pub namespace_key: String,
    pub default_namespace: String,
    pub toast_timeout_ms: u32,
    pub log_level: String,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            api_base: None,
            token_key: "openshift-token".to_string(),
            namespace_key: "openshift-namespace".to_string(),
            default_namespace: "default".to_string(),
            toast_timeout_ms: 5000,
            log_level: "info".to_string(),
        }
    }
}

impl ConsoleConfig {
    /// Defaults overridden by `SHIFTDECK_API_BASE` / `SHIFTDECK_LOG` at build time
    pub fn from_build_env() -> Self {
        let mut config = Self::default();

        if let Some(base) = option_env!("SHIFTDECK_API_BASE") {
            config.api_base = Some(base.to_string());
        }
        if let Some(level) = option_env!("SHIFTDECK_LOG") {
            config.log_level = level.to_string();
        }

        config
    }

    /// Parse the JSON document embedded in the host page
    pub fn from_json(raw: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(base) = &self.api_base {
            if !(base.starts_with("http://") || base.starts_with("https://")) {
                return Err(Error::InvalidConfig(format!(
                    "api_base must be an http(s) URL, got {}",
                    base
                )));
            }
        }

        if self.token_key.is_empty() || self.namespace_key.is_empty() {
            return Err(Error::InvalidConfig("storage keys must not be empty".to_string()));
        }

        if self.default_namespace.is_empty() {
            return Err(Error::InvalidConfig("default_namespace must not be empty".to_string()));
        }

        Ok(())
    }

    pub fn is_sandbox(&self) -> bool {
        self.api_base.is_none()
    }

    /// Base URL requests are issued against, without a trailing slash
    pub fn base_url(&self) -> String {
        match &self.api_base {
            Some(base) => base.trim_end_matches('/').to_string(),
            None => SandboxCluster::BASE_URL.to_string(),
        }
    }
}
