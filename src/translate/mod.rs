//! # Response Translator
//!
//! Decides how an upstream response reaches the client: reshaped into the
//! tabular rendering format, patched for delete responses, or streamed
//! through unmodified. The three outcomes are mutually exclusive and
//! evaluated in that priority order.

pub mod delete;
pub mod table;

pub use table::{ColumnDefinition, ResourceKind, Table, TableRow};

use crate::core::error::{BridgeError, BridgeResult};
use crate::proxy::dispatch::UpstreamResponse;
use axum::http::{Method, StatusCode};
use bytes::Bytes;

use delete::normalize_delete_body;

/// Translation outcome for one upstream response
#[derive(Debug)]
pub enum Translation {
    /// Body replaced; stale framing headers must be dropped by the caller
    Rewritten {
        body: Bytes,
        content_type: &'static str,
    },
    /// Stream the upstream body unmodified
    PassThrough,
}

/// Decide and perform the body translation for an upstream response
///
/// `upstream_path` is the region-stripped path the call was dispatched to;
/// it selects the table converter when the tabular protocol was negotiated.
pub fn translate(
    method: &Method,
    accept: &str,
    upstream_path: &str,
    response: &UpstreamResponse,
) -> BridgeResult<Translation> {
    if response.status == StatusCode::OK && accept.contains(";as=Table") {
        // The route table and the converter set must agree; a list path with
        // no converter is a programming-contract violation, not a client
        // error.
        let kind = ResourceKind::from_list_path(upstream_path)
            .ok_or_else(|| BridgeError::contract_violation(upstream_path))?;
        let table = kind.convert(&response.body)?;
        return Ok(Translation::Rewritten {
            body: Bytes::from(serde_json::to_vec(&table)?),
            content_type: "application/json",
        });
    }

    if *method == Method::DELETE && response.status == StatusCode::OK {
        return Ok(Translation::Rewritten {
            body: Bytes::from(normalize_delete_body(&response.body)?),
            content_type: "application/json",
        });
    }

    Ok(Translation::PassThrough)
}
