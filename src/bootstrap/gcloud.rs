//! Thin wrapper over the local gcloud CLI for project configuration.

use crate::core::error::{BridgeError, BridgeResult};
use tokio::process::Command;

/// Read the default GCP project id from gcloud configuration
pub async fn default_project() -> BridgeResult<String> {
    let output = Command::new("gcloud")
        .args(["config", "get-value", "core/project", "-q"])
        .output()
        .await
        .map_err(|e| BridgeError::bootstrap(format!("failed to run gcloud: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(BridgeError::bootstrap(format!(
            "gcloud returned {}: {}",
            output.status,
            stderr.trim()
        )));
    }

    let project = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if project.is_empty() || project == "(unset)" {
        return Err(BridgeError::bootstrap(
            "default GCP project not set (use \"gcloud config set core/project PROJECT_ID\")",
        ));
    }
    Ok(project)
}
