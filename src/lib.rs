//! # runbridge
//!
//! A protocol-translation reverse proxy that presents a Kubernetes API
//! server surface on localhost so an unmodified kubectl can list, get, and
//! delete Cloud Run resources. The bridge rewrites each inbound request for
//! the regional Cloud Run endpoint, injects credentials, and reshapes the
//! responses kubectl cannot consume as-is (table rendering for `kubectl
//! get`, `Status` envelopes for deletes and errors).
//!
//! Modules:
//! - `core`: error taxonomy, Kubernetes `Status` envelope, configuration
//! - `routing`: the five inbound route shapes
//! - `discovery`: static API discovery documents
//! - `auth`: credential providers for the upstream API
//! - `proxy`: request rewriting and upstream dispatch
//! - `translate`: response-shape translation (tables, delete fix-up)
//! - `gateway`: axum server wiring
//! - `bootstrap`: startup collaborators (gcloud, regions, kubeconfig)

pub mod auth;
pub mod bootstrap;
pub mod core;
pub mod discovery;
pub mod gateway;
pub mod proxy;
pub mod routing;
pub mod translate;

pub use self::core::config::BridgeConfig;
pub use self::core::error::{ApiStatus, BridgeError, BridgeResult};
pub use self::gateway::server::{build_app, BridgeServer, ServerState};
pub use self::routing::router::{BridgeRouter, RouteKind, RouteMatch};
pub use self::translate::table::{ResourceKind, Table};
