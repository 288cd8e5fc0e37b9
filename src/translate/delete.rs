//! # Delete-Response Normalization
//!
//! Cloud Run's delete response does not carry the Kubernetes `Status`
//! envelope kubectl expects, so the translator patches the two identifying
//! fields onto the decoded object and re-encodes it.

use crate::core::error::{BridgeError, BridgeResult};
use serde_json::{Map, Value};

/// Force-set `kind` and `apiVersion` on an upstream delete response body
pub fn normalize_delete_body(body: &[u8]) -> BridgeResult<Vec<u8>> {
    let mut object: Map<String, Value> = serde_json::from_slice(body)
        .map_err(|e| BridgeError::translation(format!("invalid delete response body: {e}")))?;

    object.insert("kind".to_string(), Value::String("Status".to_string()));
    object.insert("apiVersion".to_string(), Value::String("v1".to_string()));

    Ok(serde_json::to_vec(&object)?)
}
