//! # Discovery Responder
//!
//! Serves the static catalog of API discovery documents. The documents are
//! compiled into the binary and keyed by the normalized Discovery Key; the
//! key set is closed after construction, so unknown keys always yield a 404
//! and never a partial match.

use crate::core::error::{BridgeError, BridgeResult};
use std::collections::HashMap;

const APIS_ROOT: &[u8] = include_bytes!("../../resources/discovery/apis.json");
const API_SERVING: &[u8] = include_bytes!("../../resources/discovery/api-serving.json");
const API_DOMAINS: &[u8] = include_bytes!("../../resources/discovery/api-domains.json");

/// `APIVersions` document served for the base `/{region}/api/v1` route. That
/// route never consults the catalog.
const BASE_API_VERSIONS: &str = r#"{"kind":"APIVersions","versions":["v1"]}"#;

/// Content type declared by the upstream for discovery documents
pub const DISCOVERY_CONTENT_TYPE: &str = "application/json";

/// Immutable map from Discovery Key to document payload
pub struct DiscoveryCatalog {
    docs: HashMap<&'static str, &'static [u8]>,
}

impl DiscoveryCatalog {
    /// Build the catalog of packaged discovery documents
    pub fn new() -> Self {
        let mut docs: HashMap<&'static str, &'static [u8]> = HashMap::new();
        docs.insert("", APIS_ROOT);
        docs.insert("/serving.knative.dev/v1", API_SERVING);
        docs.insert("/domains.cloudrun.com/v1", API_DOMAINS);
        Self { docs }
    }

    /// Look up the payload for a Discovery Key
    pub fn lookup(&self, key: &str) -> Option<&'static [u8]> {
        self.docs.get(key).copied()
    }

    /// Resolve a Discovery Key or fail with a 404 identifying the requested
    /// path
    pub fn document(&self, key: &str, requested_path: &str) -> BridgeResult<&'static [u8]> {
        self.lookup(key)
            .ok_or_else(|| BridgeError::discovery_not_found(requested_path))
    }

    /// The hardcoded `APIVersions` body for the base API route
    pub fn base_api_versions() -> &'static str {
        BASE_API_VERSIONS
    }
}

impl Default for DiscoveryCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn test_known_keys_return_exact_payloads() {
        let catalog = DiscoveryCatalog::new();
        assert_eq!(catalog.lookup(""), Some(APIS_ROOT));
        assert_eq!(catalog.lookup("/serving.knative.dev/v1"), Some(API_SERVING));
        assert_eq!(catalog.lookup("/domains.cloudrun.com/v1"), Some(API_DOMAINS));
    }

    #[test]
    fn test_unknown_key_error_carries_requested_path() {
        let catalog = DiscoveryCatalog::new();
        let err = catalog
            .document("/foo/v1", "/us-central1/apis/foo/v1")
            .unwrap_err();
        assert!(err.to_string().contains("/us-central1/apis/foo/v1"));
    }

    #[test]
    fn test_payloads_are_valid_json() {
        let catalog = DiscoveryCatalog::new();
        for key in ["", "/serving.knative.dev/v1", "/domains.cloudrun.com/v1"] {
            let payload = catalog.lookup(key).unwrap();
            serde_json::from_slice::<Value>(payload).unwrap();
        }
        serde_json::from_str::<Value>(DiscoveryCatalog::base_api_versions()).unwrap();
    }

    #[test]
    fn test_root_catalog_lists_both_groups() {
        let root: Value = serde_json::from_slice(APIS_ROOT).unwrap();
        assert_eq!(root["kind"], "APIGroupList");
        let names: Vec<&str> = root["groups"]
            .as_array()
            .unwrap()
            .iter()
            .map(|g| g["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["serving.knative.dev", "domains.cloudrun.com"]);
    }

    #[test]
    fn test_serving_document_lists_four_kinds() {
        let doc: Value = serde_json::from_slice(API_SERVING).unwrap();
        let names: Vec<&str> = doc["resources"]
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["name"].as_str().unwrap())
            .collect();
        assert_eq!(
            names,
            vec!["services", "configurations", "routes", "revisions"]
        );
    }

    #[test]
    fn test_base_api_versions_document() {
        let doc: Value = serde_json::from_str(DiscoveryCatalog::base_api_versions()).unwrap();
        assert_eq!(doc["kind"], "APIVersions");
        assert_eq!(doc["versions"], serde_json::json!(["v1"]));
    }
}
