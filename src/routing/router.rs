//! # Path Router
//!
//! Matches incoming requests against the five route shapes the bridge
//! serves, using the `matchit` radix tree. The resource segment is a
//! catch-all so trailing sub-resources (an item name) survive verbatim into
//! the upstream path. A failed match yields `None`; the caller turns that
//! into the generic Kubernetes-shaped 404, never a framework default page.

use crate::core::error::{BridgeError, BridgeResult};
use axum::http::Method;
use matchit::Router as RadixRouter;

/// The route shape a request matched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteKind {
    /// `/{region}/api/v1`: hardcoded `APIVersions` document
    BaseApiVersions,
    /// `/{region}/apis`: root discovery catalog
    DiscoveryRoot,
    /// `/{region}/apis/{group}/{version}`: per-group discovery document
    DiscoveryGroup,
    /// Namespaced resource request, proxied upstream
    Resource,
}

/// Per-request route match, produced by the router and scoped to one
/// request's lifetime
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch {
    pub kind: RouteKind,
    /// Region path segment; empty on the legacy region-less route
    pub region: String,
    pub api_group: String,
    pub api_version: String,
    pub namespace: String,
    /// Resource kind plus any trailing sub-resource segments, verbatim
    pub resource: String,
}

impl RouteMatch {
    /// Discovery Key for this match: `""` for the root catalog,
    /// `"/{group}/{version}"` for a group document
    pub fn discovery_key(&self) -> String {
        match self.kind {
            RouteKind::DiscoveryGroup => format!("/{}/{}", self.api_group, self.api_version),
            _ => String::new(),
        }
    }

    /// The inbound path stripped of its leading region segment; this is the
    /// path sent upstream
    pub fn upstream_path(&self, original_path: &str) -> String {
        if self.region.is_empty() {
            return original_path.to_string();
        }
        let prefix = format!("/{}", self.region);
        original_path
            .strip_prefix(&prefix)
            .unwrap_or(original_path)
            .to_string()
    }
}

#[derive(Debug, Clone, Copy)]
enum RoutePattern {
    BaseApiVersions,
    DiscoveryRoot,
    DiscoveryGroup,
    Resource { legacy: bool },
}

/// Router over the five fixed inbound route shapes
pub struct BridgeRouter {
    inner: RadixRouter<RoutePattern>,
}

impl BridgeRouter {
    /// Build the route table
    pub fn new() -> BridgeResult<Self> {
        let mut inner = RadixRouter::new();
        let routes = [
            ("/{region}/api/v1", RoutePattern::BaseApiVersions),
            ("/{region}/apis", RoutePattern::DiscoveryRoot),
            (
                "/{region}/apis/{group}/{version}",
                RoutePattern::DiscoveryGroup,
            ),
            (
                "/{region}/apis/{group}/{version}/namespaces/{namespace}/{*resource}",
                RoutePattern::Resource { legacy: false },
            ),
            (
                "/apis/{group}/{version}/namespaces/{namespace}/{*resource}",
                RoutePattern::Resource { legacy: true },
            ),
        ];
        for (pattern, value) in routes {
            inner
                .insert(pattern, value)
                .map_err(|e| BridgeError::config(format!("failed to add route {pattern}: {e}")))?;
        }
        Ok(Self { inner })
    }

    /// Match a request to a route shape
    ///
    /// Discovery and base-version routes only accept GET and HEAD; the
    /// resource routes accept any method and let the upstream reject what it
    /// does not support.
    pub fn match_route(&self, method: &Method, path: &str) -> Option<RouteMatch> {
        let matched = self.inner.at(path).ok()?;
        let param = |name: &str| matched.params.get(name).unwrap_or("").to_string();

        let kind = match *matched.value {
            RoutePattern::BaseApiVersions => RouteKind::BaseApiVersions,
            RoutePattern::DiscoveryRoot => RouteKind::DiscoveryRoot,
            RoutePattern::DiscoveryGroup => RouteKind::DiscoveryGroup,
            RoutePattern::Resource { .. } => RouteKind::Resource,
        };

        if kind != RouteKind::Resource && *method != Method::GET && *method != Method::HEAD {
            return None;
        }

        let region = match *matched.value {
            RoutePattern::Resource { legacy: true } => String::new(),
            _ => param("region"),
        };

        Some(RouteMatch {
            kind,
            region,
            api_group: param("group"),
            api_version: param("version"),
            namespace: param("namespace"),
            resource: param("resource").trim_start_matches('/').to_string(),
        })
    }
}
