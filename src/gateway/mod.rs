//! Server wiring for the Kubernetes-compatible surface.

pub mod server;

pub use server::{build_app, BridgeServer, ServerState};
