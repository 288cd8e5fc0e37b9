//! # Error Handling Module
//!
//! Defines the bridge's error taxonomy using the `thiserror` crate and maps
//! every failure onto the Kubernetes `Status` envelope that kubectl expects.
//! A client parsing error responses behaves identically whether it is talking
//! to a real API server or to this bridge.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, warn};

/// Main result type used throughout the bridge
pub type BridgeResult<T> = Result<T, BridgeError>;

/// Error types for the bridge
///
/// Each variant represents a different category of failure. The `#[error]`
/// attribute from `thiserror` provides the `Display` implementation, and the
/// display text becomes the `message` field of the Kubernetes `Status` body.
#[derive(Debug, Error, Clone)]
pub enum BridgeError {
    /// No route shape matched the request path and method
    #[error("the server could not find the requested resource {path:?}")]
    RouteNotFound { path: String },

    /// Discovery lookup miss; the key set is closed, unknown keys are 404
    #[error("API path {path:?} is not served by this endpoint")]
    DiscoveryNotFound { path: String },

    /// The watch protocol is explicitly unsupported
    #[error("watch is not supported by this endpoint")]
    WatchUnsupported,

    /// Token acquisition from the credential provider failed
    #[error("failed to get access token: {message}")]
    Credential { message: String },

    /// The outbound call failed at the transport level (DNS, refused, TLS, timeout)
    #[error("upstream request failed: {message}")]
    UpstreamTransport { message: String },

    /// The upstream body could not be reshaped into the client-facing form
    #[error("response translation failed: {message}")]
    Translation { message: String },

    /// A routable resource kind has no table converter. The route table and
    /// the converter set have drifted; this must surface as a clear 500,
    /// never a process abort.
    #[error("no list-to-table converter registered for {path:?}")]
    TranslationContract { path: String },

    /// Configuration-related errors (invalid bind address, bad template, etc.)
    #[error("configuration error: {message}")]
    Configuration { message: String },

    /// Startup collaborator failures (gcloud, region listing, kubeconfig)
    #[error("bootstrap error: {message}")]
    Bootstrap { message: String },

    /// I/O errors (file operations, request body reads, etc.)
    #[error("I/O error: {message}")]
    Io { message: String },

    /// JSON serialization/deserialization errors
    #[error("JSON error: {message}")]
    Json { message: String },
}

impl BridgeError {
    /// Create a route-not-found error for the given request path
    pub fn route_not_found<S: Into<String>>(path: S) -> Self {
        Self::RouteNotFound { path: path.into() }
    }

    /// Create a discovery-not-found error identifying the unresolved path
    pub fn discovery_not_found<S: Into<String>>(path: S) -> Self {
        Self::DiscoveryNotFound { path: path.into() }
    }

    /// Create a credential error with a custom message
    pub fn credential<S: Into<String>>(message: S) -> Self {
        Self::Credential {
            message: message.into(),
        }
    }

    /// Create an upstream transport error with the raw transport error text
    pub fn upstream_transport<S: Into<String>>(message: S) -> Self {
        Self::UpstreamTransport {
            message: message.into(),
        }
    }

    /// Create a translation error with a custom message
    pub fn translation<S: Into<String>>(message: S) -> Self {
        Self::Translation {
            message: message.into(),
        }
    }

    /// Create a translation-contract violation for the given upstream path
    pub fn contract_violation<S: Into<String>>(path: S) -> Self {
        Self::TranslationContract { path: path.into() }
    }

    /// Create a configuration error with a custom message
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a bootstrap error with a custom message
    pub fn bootstrap<S: Into<String>>(message: S) -> Self {
        Self::Bootstrap {
            message: message.into(),
        }
    }

    /// Get the HTTP status code returned to the client for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::RouteNotFound { .. } => StatusCode::NOT_FOUND,
            Self::DiscoveryNotFound { .. } => StatusCode::NOT_FOUND,
            Self::WatchUnsupported => StatusCode::BAD_REQUEST,
            Self::Credential { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::UpstreamTransport { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Translation { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::TranslationContract { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Configuration { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Bootstrap { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Io { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Json { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<std::io::Error> for BridgeError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for BridgeError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json {
            message: err.to_string(),
        }
    }
}

/// The Kubernetes `Status` failure envelope
///
/// Field set and order reproduce the upstream wire contract exactly; kubectl
/// parses this body to build its error output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiStatus {
    pub kind: String,
    #[serde(rename = "apiVersion")]
    pub api_version: String,
    pub metadata: ApiStatusMetadata,
    pub status: String,
    pub message: String,
    pub reason: String,
    pub details: ApiStatusDetails,
    pub code: u16,
}

/// Always-empty metadata object carried by the `Status` envelope
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ApiStatusMetadata {}

/// Detail fields of the `Status` envelope; empty strings when unknown
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ApiStatusDetails {
    pub name: String,
    pub group: String,
    pub kind: String,
}

impl ApiStatus {
    /// Build a failure envelope for the given status code and message
    ///
    /// The `reason` is the status code's canonical text with spaces removed,
    /// e.g. 400 becomes "BadRequest".
    pub fn failure(code: StatusCode, message: impl Into<String>) -> Self {
        Self {
            kind: "Status".to_string(),
            api_version: "v1".to_string(),
            metadata: ApiStatusMetadata::default(),
            status: "Failure".to_string(),
            message: message.into(),
            reason: reason_for(code),
            details: ApiStatusDetails::default(),
            code: code.as_u16(),
        }
    }
}

/// Derive the machine-readable reason from a status code's canonical text
pub fn reason_for(code: StatusCode) -> String {
    code.canonical_reason().unwrap_or_default().replace(' ', "")
}

impl IntoResponse for BridgeError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match &self {
            // The route table and converter set drifted; this needs operator
            // attention, not just a failed request.
            Self::TranslationContract { .. } => error!("request aborted: {}", self),
            _ if status.is_server_error() => {
                warn!(code = status.as_u16(), "request failed: {}", self);
            }
            _ => {}
        }
        let body = ApiStatus::failure(status, self.to_string());
        (
            status,
            [(header::CONTENT_TYPE, "application/json")],
            Json(body),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(
            BridgeError::route_not_found("/bogus").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            BridgeError::WatchUnsupported.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            BridgeError::credential("no token").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            BridgeError::upstream_transport("connection refused").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            BridgeError::contract_violation("/apis/x/v1/namespaces/ns/widgets").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_reason_derivation() {
        assert_eq!(reason_for(StatusCode::BAD_REQUEST), "BadRequest");
        assert_eq!(reason_for(StatusCode::NOT_FOUND), "NotFound");
        assert_eq!(
            reason_for(StatusCode::INTERNAL_SERVER_ERROR),
            "InternalServerError"
        );
        assert_eq!(
            reason_for(StatusCode::METHOD_NOT_ALLOWED),
            "MethodNotAllowed"
        );
    }

    #[test]
    fn test_failure_envelope_shape() {
        let status = ApiStatus::failure(StatusCode::BAD_REQUEST, "watch is not supported");
        let value = serde_json::to_value(&status).unwrap();

        assert_eq!(value["kind"], "Status");
        assert_eq!(value["apiVersion"], "v1");
        assert_eq!(value["status"], "Failure");
        assert_eq!(value["message"], "watch is not supported");
        assert_eq!(value["reason"], "BadRequest");
        assert_eq!(value["code"], 400);
        assert_eq!(value["metadata"], serde_json::json!({}));
        assert_eq!(value["details"]["name"], "");
        assert_eq!(value["details"]["group"], "");
        assert_eq!(value["details"]["kind"], "");
    }

    #[test]
    fn test_discovery_not_found_message_contains_path() {
        let err = BridgeError::discovery_not_found("/us-central1/apis/foo/v1");
        assert!(err.to_string().contains("/us-central1/apis/foo/v1"));
    }
}
