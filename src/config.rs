//! SDK configuration.
//!
//! `SdkConfig` is what a host passes to `WaveCx::initialize`. It is plain data
//! and deserializes from the camelCase JSON host apps already use, e.g.
//!
//! ```json
//! { "organizationCode": "demo-org", "debugMode": true,
//!   "mock": { "enabled": true, "networkDelayMs": 500 } }
//! ```

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::source::{ContentSource, MockContent, MockContentSource, NetworkContentSource};

/// Content service used when no base URL is configured.
pub const DEFAULT_API_BASE_URL: &str = "https://api.wavecx.com/v1";

/// Mock mode settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MockModeConfig {
    /// Use the mock provider instead of the network.
    pub enabled: bool,
    /// Simulated latency before the mock catalog arrives.
    pub network_delay_ms: u64,
    /// Catalog to serve instead of the synthesized defaults.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_content: Option<Vec<MockContent>>,
}

impl Default for MockModeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            network_delay_ms: 0,
            custom_content: None,
        }
    }
}

impl MockModeConfig {
    /// Enabled mock mode with the given latency.
    #[must_use]
    pub fn with_delay(network_delay_ms: u64) -> Self {
        Self {
            network_delay_ms,
            ..Self::default()
        }
    }

    /// Serves `content` instead of the synthesized defaults.
    #[must_use]
    pub fn with_custom_content(mut self, content: Vec<MockContent>) -> Self {
        self.custom_content = Some(content);
        self
    }

    #[must_use]
    pub const fn network_delay(&self) -> Duration {
        Duration::from_millis(self.network_delay_ms)
    }

    fn build_source(&self) -> MockContentSource {
        match &self.custom_content {
            Some(content) => MockContentSource::new(content.clone(), self.network_delay()),
            None => MockContentSource::with_defaults(self.network_delay()),
        }
    }
}

/// Configuration for one SDK instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SdkConfig {
    /// Organization the host app belongs to.
    pub organization_code: String,
    /// Verbose diagnostics: log every query and delivered event.
    #[serde(default)]
    pub debug_mode: bool,
    /// Mock mode; absent or disabled means the network provider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mock: Option<MockModeConfig>,
    /// Content service base URL for the network provider.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

impl Default for SdkConfig {
    fn default() -> Self {
        Self {
            organization_code: String::new(),
            debug_mode: false,
            mock: None,
            api_base_url: default_api_base_url(),
        }
    }
}

impl SdkConfig {
    /// Network configuration for an organization.
    #[must_use]
    pub fn new(organization_code: impl Into<String>) -> Self {
        Self {
            organization_code: organization_code.into(),
            ..Self::default()
        }
    }

    /// Parses a JSON configuration document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Malformed {
            message: e.to_string(),
        })
    }

    #[must_use]
    pub const fn with_debug_mode(mut self, debug_mode: bool) -> Self {
        self.debug_mode = debug_mode;
        self
    }

    #[must_use]
    pub fn with_mock(mut self, mock: MockModeConfig) -> Self {
        self.mock = Some(mock);
        self
    }

    #[must_use]
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// True if the mock provider will be used.
    #[must_use]
    pub fn uses_mock(&self) -> bool {
        self.mock.as_ref().is_some_and(|m| m.enabled)
    }

    /// Checks the configuration without building anything.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.organization_code.trim().is_empty() {
            return Err(ConfigError::EmptyOrganizationCode);
        }
        if !self.uses_mock() {
            NetworkContentSource::new(&self.api_base_url)?;
        }
        Ok(())
    }

    /// Builds the content source this configuration selects.
    pub fn build_source(&self) -> Result<Arc<dyn ContentSource>, ConfigError> {
        match &self.mock {
            Some(mock) if mock.enabled => Ok(Arc::new(mock.build_source())),
            _ => Ok(Arc::new(NetworkContentSource::new(&self.api_base_url)?)),
        }
    }
}
