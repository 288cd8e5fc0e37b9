//! # Configuration Module
//!
//! Runtime configuration for the bridge. The configuration is built once at
//! startup (defaults plus `RUNBRIDGE_*` environment overrides), validated,
//! and injected into the server state; nothing reads configuration through
//! ambient globals after that.

use crate::core::error::{BridgeError, BridgeResult};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Bridge configuration
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Local address the Kubernetes-compatible surface binds to
    pub bind_addr: SocketAddr,

    /// Upstream URL template; `{region}` is substituted per request
    pub upstream_url_template: String,

    /// Region-less endpoint used for listing available regions at startup
    pub regions_endpoint: String,

    /// Product string sent as the `user-agent` header on proxied calls
    pub user_agent: String,

    /// Timeout applied to each outbound upstream call
    pub request_timeout: Duration,

    /// Maximum inbound request body size in bytes
    pub max_body_size: usize,

    /// Where the generated kubeconfig is written at startup
    pub kubeconfig_path: PathBuf,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:5555".parse().expect("valid default bind address"),
            upstream_url_template: "https://{region}-run.googleapis.com".to_string(),
            regions_endpoint: "https://run.googleapis.com".to_string(),
            user_agent: concat!("runbridge/", env!("CARGO_PKG_VERSION")).to_string(),
            request_timeout: Duration::from_secs(30),
            max_body_size: 16 * 1024 * 1024, // 16MB
            kubeconfig_path: default_kubeconfig_path(),
        }
    }
}

/// Default kubeconfig location: `$HOME/.kube/config.cloudrun`
fn default_kubeconfig_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".kube").join("config.cloudrun")
}

impl BridgeConfig {
    /// Load configuration from defaults plus environment overrides
    ///
    /// Recognized variables: `RUNBRIDGE_BIND_ADDR`,
    /// `RUNBRIDGE_UPSTREAM_URL_TEMPLATE`, `RUNBRIDGE_REGIONS_ENDPOINT`,
    /// `RUNBRIDGE_REQUEST_TIMEOUT_SECS`, `RUNBRIDGE_KUBECONFIG`.
    pub fn from_env() -> BridgeResult<Self> {
        let mut config = Self::default();

        if let Ok(addr) = std::env::var("RUNBRIDGE_BIND_ADDR") {
            config.bind_addr = addr
                .parse()
                .map_err(|e| BridgeError::config(format!("invalid RUNBRIDGE_BIND_ADDR: {e}")))?;
        }
        if let Ok(template) = std::env::var("RUNBRIDGE_UPSTREAM_URL_TEMPLATE") {
            config.upstream_url_template = template;
        }
        if let Ok(endpoint) = std::env::var("RUNBRIDGE_REGIONS_ENDPOINT") {
            config.regions_endpoint = endpoint;
        }
        if let Ok(secs) = std::env::var("RUNBRIDGE_REQUEST_TIMEOUT_SECS") {
            let secs: u64 = secs.parse().map_err(|e| {
                BridgeError::config(format!("invalid RUNBRIDGE_REQUEST_TIMEOUT_SECS: {e}"))
            })?;
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Ok(path) = std::env::var("RUNBRIDGE_KUBECONFIG") {
            config.kubeconfig_path = PathBuf::from(path);
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> BridgeResult<()> {
        if !self.upstream_url_template.contains("{region}") {
            return Err(BridgeError::config(
                "upstream URL template must contain a {region} placeholder",
            ));
        }
        if self.upstream_url_template.ends_with('/') {
            return Err(BridgeError::config(
                "upstream URL template must not end with a slash",
            ));
        }
        Ok(())
    }

    /// Resolve the upstream base URL for a region
    ///
    /// The legacy region-less route substitutes an empty region, matching the
    /// historical behavior of the bridge.
    pub fn upstream_base_for(&self, region: &str) -> String {
        self.upstream_url_template.replace("{region}", region)
    }
}
