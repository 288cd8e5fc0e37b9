//! # Bridge Server
//!
//! Axum wiring for the request pipeline. Every inbound request flows through
//! a single catch-all handler: Router → (Discovery Responder | Request
//! Rewriter → Upstream Dispatcher → Response Translator). The state shared
//! across requests is immutable after startup; the core adds no concurrency
//! of its own beyond the runtime's per-request tasks.

use crate::auth::credentials::CredentialProvider;
use crate::core::config::BridgeConfig;
use crate::core::error::{BridgeError, BridgeResult};
use crate::discovery::catalog::{DiscoveryCatalog, DISCOVERY_CONTENT_TYPE};
use crate::proxy::dispatch::{dispatch, UpstreamResponse};
use crate::proxy::rewrite::rewrite;
use crate::routing::router::{BridgeRouter, RouteKind, RouteMatch};
use crate::translate::{translate, Translation};
use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::{header, request::Parts, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Router as AxumRouter;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Shared server state; read-only after construction
#[derive(Clone)]
pub struct ServerState {
    pub config: Arc<BridgeConfig>,
    pub router: Arc<BridgeRouter>,
    pub discovery: Arc<DiscoveryCatalog>,
    pub credentials: Arc<dyn CredentialProvider>,
    pub client: reqwest::Client,
}

impl ServerState {
    /// Create the server state with its collaborators injected
    pub fn new(
        config: BridgeConfig,
        credentials: Arc<dyn CredentialProvider>,
    ) -> BridgeResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| BridgeError::config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            config: Arc::new(config),
            router: Arc::new(BridgeRouter::new()?),
            discovery: Arc::new(DiscoveryCatalog::new()),
            credentials,
            client,
        })
    }
}

/// Build the axum application for the bridge surface
pub fn build_app(state: ServerState) -> AxumRouter {
    AxumRouter::new()
        .fallback(handle_request)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bridge server: binds the local listener and runs until shutdown
pub struct BridgeServer {
    state: ServerState,
}

impl BridgeServer {
    pub fn new(state: ServerState) -> Self {
        Self { state }
    }

    /// Bind and serve until SIGINT/SIGTERM
    pub async fn serve(self) -> BridgeResult<()> {
        let addr = self.state.config.bind_addr;
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| BridgeError::config(format!("failed to bind {addr}: {e}")))?;

        info!("kube-apiserver facade for Cloud Run listening on http://{addr}");
        axum::serve(listener, build_app(self.state))
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        Ok(())
    }
}

/// Resolve on SIGINT or SIGTERM
async fn shutdown_signal() {
    let interrupt = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install SIGINT handler");
    };
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };
    tokio::select! {
        _ = interrupt => info!("received SIGINT, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
    }
}

/// Single entry point for every inbound request
async fn handle_request(State(state): State<ServerState>, request: Request) -> Response {
    match process_request(&state, request).await {
        Ok(response) => response,
        Err(error) => error.into_response(),
    }
}

async fn process_request(state: &ServerState, request: Request) -> BridgeResult<Response> {
    let (parts, body) = request.into_parts();
    let path = parts.uri.path().to_string();

    let route = state
        .router
        .match_route(&parts.method, &path)
        .ok_or_else(|| BridgeError::route_not_found(&path))?;

    match route.kind {
        RouteKind::BaseApiVersions => Ok(json_response(
            StatusCode::OK,
            DiscoveryCatalog::base_api_versions().as_bytes().to_vec(),
        )),
        RouteKind::DiscoveryRoot | RouteKind::DiscoveryGroup => {
            let doc = state.discovery.document(&route.discovery_key(), &path)?;
            Ok(json_response(StatusCode::OK, doc.to_vec()))
        }
        RouteKind::Resource => proxy_resource(state, route, parts, body).await,
    }
}

/// Proxy pipeline for namespaced resource requests
async fn proxy_resource(
    state: &ServerState,
    route: RouteMatch,
    parts: Parts,
    body: Body,
) -> BridgeResult<Response> {
    let body = axum::body::to_bytes(body, state.config.max_body_size)
        .await
        .map_err(|e| BridgeError::Io {
            message: format!("failed to read request body: {e}"),
        })?;

    let token = state.credentials.access_token().await?;
    let call = rewrite(
        &state.config,
        &route,
        &parts.method,
        &parts.uri,
        &parts.headers,
        body,
        &token,
    )?;

    let upstream = dispatch(&state.client, call).await?;

    let accept = parts
        .headers
        .get(header::ACCEPT)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("");
    let translation = translate(
        &parts.method,
        accept,
        &route.upstream_path(parts.uri.path()),
        &upstream,
    )?;

    Ok(assemble_response(upstream, translation))
}

/// Combine the upstream response with the translation outcome
fn assemble_response(upstream: UpstreamResponse, translation: Translation) -> Response {
    match translation {
        Translation::PassThrough => {
            let mut response = Response::new(Body::from(upstream.body));
            *response.status_mut() = upstream.status;
            *response.headers_mut() = upstream.headers;
            response
        }
        Translation::Rewritten { body, content_type } => {
            let mut headers = upstream.headers;
            // The body changed; framing headers no longer describe it.
            headers.remove(header::CONTENT_LENGTH);
            headers.remove(header::TRANSFER_ENCODING);
            headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));

            let mut response = Response::new(Body::from(body));
            *response.status_mut() = upstream.status;
            *response.headers_mut() = headers;
            response
        }
    }
}

fn json_response(status: StatusCode, body: Vec<u8>) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, DISCOVERY_CONTENT_TYPE)],
        body,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::credentials::StaticCredentialProvider;
    use axum::http::Method;
    use serde_json::Value;
    use tower::ServiceExt;

    fn test_app() -> AxumRouter {
        let state = ServerState::new(
            BridgeConfig::default(),
            Arc::new(StaticCredentialProvider::new("test-token")),
        )
        .unwrap();
        build_app(state)
    }

    async fn send(app: AxumRouter, method: Method, uri: &str) -> (StatusCode, Vec<u8>) {
        let response = app
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, body.to_vec())
    }

    #[tokio::test]
    async fn test_unmatched_route_returns_kubernetes_404() {
        let (status, body) = send(test_app(), Method::GET, "/us-central1/bogus").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let value: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["kind"], "Status");
        assert_eq!(value["status"], "Failure");
        assert_eq!(value["reason"], "NotFound");
        assert_eq!(value["code"], 404);
    }

    #[tokio::test]
    async fn test_base_api_versions_document() {
        let (status, body) = send(test_app(), Method::GET, "/us-central1/api/v1").await;
        assert_eq!(status, StatusCode::OK);

        let value: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["kind"], "APIVersions");
        assert_eq!(value["versions"], serde_json::json!(["v1"]));
    }

    #[tokio::test]
    async fn test_discovery_root_serves_stored_bytes() {
        let (status, body) = send(test_app(), Method::GET, "/us-central1/apis").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            include_bytes!("../../resources/discovery/apis.json").to_vec()
        );
    }

    #[tokio::test]
    async fn test_head_is_accepted_on_discovery_routes() {
        let (status, _) = send(test_app(), Method::HEAD, "/us-central1/apis").await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_write_methods_on_discovery_routes_are_not_found() {
        let (status, body) = send(test_app(), Method::POST, "/us-central1/apis").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let value: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["kind"], "Status");
    }

    #[tokio::test]
    async fn test_unknown_discovery_group_identifies_path() {
        let (status, body) = send(test_app(), Method::GET, "/us-central1/apis/foo/v1").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let value: Value = serde_json::from_slice(&body).unwrap();
        assert!(value["message"]
            .as_str()
            .unwrap()
            .contains("/us-central1/apis/foo/v1"));
    }
}
