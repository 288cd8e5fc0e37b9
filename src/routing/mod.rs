//! Request routing for the bridge's inbound surface.

pub mod router;

pub use router::{BridgeRouter, RouteKind, RouteMatch};
