//! Renders the client-side kubeconfig pointing kubectl at the bridge.
//!
//! One cluster per region, each with its server URL carrying the region as a
//! path prefix; contexts default their namespace to the project id because
//! Cloud Run scopes resources by project.

use crate::core::error::{BridgeError, BridgeResult};
use serde::Serialize;
use std::net::SocketAddr;
use std::path::Path;

const DUMMY_USER: &str = "dummy";
const CONTEXT_PREFIX: &str = "cloudrun_";
const PREFERRED_REGION: &str = "us-central1";

#[derive(Debug, Serialize)]
struct Kubeconfig {
    #[serde(rename = "apiVersion")]
    api_version: String,
    kind: String,
    clusters: Vec<Cluster>,
    contexts: Vec<Context>,
    #[serde(rename = "current-context")]
    current_context: String,
    users: Vec<User>,
}

#[derive(Debug, Serialize)]
struct Cluster {
    name: String,
    cluster: ClusterEndpoint,
}

#[derive(Debug, Serialize)]
struct ClusterEndpoint {
    server: String,
}

#[derive(Debug, Serialize)]
struct Context {
    name: String,
    context: ContextRef,
}

#[derive(Debug, Serialize)]
struct ContextRef {
    cluster: String,
    user: String,
    namespace: String,
}

#[derive(Debug, Serialize)]
struct User {
    name: String,
}

/// Render a kubeconfig for the given project and regions
pub fn render(project: &str, regions: &[String], bind_addr: SocketAddr) -> BridgeResult<Vec<u8>> {
    let base = format!("http://{bind_addr}");

    let clusters = regions
        .iter()
        .map(|region| Cluster {
            name: region.clone(),
            cluster: ClusterEndpoint {
                server: format!("{base}/{region}"),
            },
        })
        .collect();
    let contexts = regions
        .iter()
        .map(|region| Context {
            name: format!("{CONTEXT_PREFIX}{region}"),
            context: ContextRef {
                cluster: region.clone(),
                user: DUMMY_USER.to_string(),
                namespace: project.to_string(),
            },
        })
        .collect();

    let current_region = regions
        .iter()
        .find(|region| *region == PREFERRED_REGION)
        .or_else(|| regions.first());
    let current_context = match current_region {
        Some(region) => format!("{CONTEXT_PREFIX}{region}"),
        None => String::new(),
    };

    let kubeconfig = Kubeconfig {
        api_version: "v1".to_string(),
        kind: "Config".to_string(),
        clusters,
        contexts,
        current_context,
        users: vec![User {
            name: DUMMY_USER.to_string(),
        }],
    };

    serde_yaml::to_string(&kubeconfig)
        .map(String::into_bytes)
        .map_err(|e| BridgeError::bootstrap(format!("failed to render kubeconfig: {e}")))
}

/// Write the rendered kubeconfig, creating parent directories as needed
pub fn write(path: &Path, contents: &[u8]) -> BridgeResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, contents)?;
    Ok(())
}
