//! # runbridge - Main Entry Point
//!
//! Starts the local kube-apiserver facade for Cloud Run: verifies gcloud
//! configuration, discovers the project's regions, writes a kubeconfig
//! pointing kubectl at the bridge, and serves until interrupted.

use std::sync::Arc;
use tracing::{error, info};

use runbridge::auth::credentials::GcloudCredentialProvider;
use runbridge::bootstrap::{gcloud, kubeconfig, regions};
use runbridge::core::config::BridgeConfig;
use runbridge::core::error::BridgeResult;
use runbridge::gateway::server::{BridgeServer, ServerState};

#[tokio::main]
async fn main() {
    init_observability();

    if let Err(e) = run().await {
        error!("startup failed: {e}");
        std::process::exit(1);
    }
}

/// Initialize logging with an env-filter override
fn init_observability() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "runbridge=info,tower_http=info".into()),
        )
        .init();
}

async fn run() -> BridgeResult<()> {
    let config = BridgeConfig::from_env()?;
    let credentials = Arc::new(GcloudCredentialProvider::new());

    let project = gcloud::default_project().await?;
    info!("assuming GCP project id {project:?}");

    let state = ServerState::new(config.clone(), credentials.clone())?;

    let regions = regions::list_regions(
        &state.client,
        credentials.as_ref(),
        &config.regions_endpoint,
        &project,
    )
    .await?;
    info!("found {} Cloud Run regions", regions.len());

    let rendered = kubeconfig::render(&project, &regions, config.bind_addr)?;
    kubeconfig::write(&config.kubeconfig_path, &rendered)?;
    info!(
        "wrote kubeconfig; set this environment variable in your shell:\n\texport KUBECONFIG={}",
        config.kubeconfig_path.display()
    );

    BridgeServer::new(state).serve().await
}
