//! # Credential Providers
//!
//! This module contains the credential provider abstraction consulted by the
//! request rewriter on every proxied call, plus its implementations. The
//! gcloud-backed provider serializes its own token refresh internally, so the
//! rest of the bridge can read tokens concurrently without coordination.

use crate::core::error::{BridgeError, BridgeResult};
use async_trait::async_trait;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tokio::sync::Mutex;
use tracing::debug;

/// Supplies a bearer token for the upstream API on demand
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    async fn access_token(&self) -> BridgeResult<String>;
}

/// How long a fetched token is reused before asking gcloud again
const TOKEN_TTL: Duration = Duration::from_secs(5 * 60);

struct CachedToken {
    token: String,
    fetched_at: Instant,
}

/// Credential provider backed by the local gcloud CLI's application-default
/// credentials
pub struct GcloudCredentialProvider {
    cached: Mutex<Option<CachedToken>>,
}

impl GcloudCredentialProvider {
    /// Create a provider with an empty token cache
    pub fn new() -> Self {
        Self {
            cached: Mutex::new(None),
        }
    }

    async fn fetch_token(&self) -> BridgeResult<String> {
        let output = Command::new("gcloud")
            .args(["auth", "application-default", "print-access-token", "-q"])
            .output()
            .await
            .map_err(|e| BridgeError::credential(format!("failed to run gcloud: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(BridgeError::credential(format!(
                "gcloud returned {}: {} (run \"gcloud auth application-default login\" first)",
                output.status,
                stderr.trim()
            )));
        }

        let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if token.is_empty() {
            return Err(BridgeError::credential(
                "gcloud printed an empty access token",
            ));
        }
        Ok(token)
    }
}

impl Default for GcloudCredentialProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CredentialProvider for GcloudCredentialProvider {
    async fn access_token(&self) -> BridgeResult<String> {
        // The mutex is held across the refresh so concurrent requests never
        // spawn more than one gcloud invocation.
        let mut cached = self.cached.lock().await;
        if let Some(entry) = cached.as_ref() {
            if entry.fetched_at.elapsed() < TOKEN_TTL {
                return Ok(entry.token.clone());
            }
        }

        debug!("refreshing access token via gcloud");
        let token = self.fetch_token().await?;
        *cached = Some(CachedToken {
            token: token.clone(),
            fetched_at: Instant::now(),
        });
        Ok(token)
    }
}

/// Credential provider that always returns a fixed token
///
/// Used by tests and by deployments that manage credentials externally.
pub struct StaticCredentialProvider {
    token: String,
}

impl StaticCredentialProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl CredentialProvider for StaticCredentialProvider {
    async fn access_token(&self) -> BridgeResult<String> {
        Ok(self.token.clone())
    }
}
