//! # Upstream Dispatcher
//!
//! Performs the single outbound call per inbound request and captures the
//! response. Transport-level failures surface as one generic error; there is
//! no retry and no backoff.

use crate::core::error::{BridgeError, BridgeResult};
use crate::proxy::rewrite::UpstreamCall;
use axum::http::{HeaderMap, StatusCode};
use bytes::Bytes;
use tracing::debug;

/// Captured upstream response
///
/// Headers are copied verbatim onto the client response before any body
/// transformation decision is made; the translator may only replace the body
/// (dropping stale framing headers when it does).
#[derive(Debug)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Execute the rewritten call against the upstream
pub async fn dispatch(
    client: &reqwest::Client,
    call: UpstreamCall,
) -> BridgeResult<UpstreamResponse> {
    debug!(method = %call.method, url = %call.url, "dispatching upstream request");

    let response = client
        .request(call.method, call.url)
        .headers(call.headers)
        .body(call.body)
        .send()
        .await
        .map_err(|e| BridgeError::upstream_transport(e.to_string()))?;

    let status = response.status();
    let headers = response.headers().clone();
    let body = response
        .bytes()
        .await
        .map_err(|e| BridgeError::upstream_transport(e.to_string()))?;

    Ok(UpstreamResponse {
        status,
        headers,
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Method;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn call_for(url: String) -> UpstreamCall {
        UpstreamCall {
            method: Method::GET,
            url,
            headers: {
                let mut headers = HeaderMap::new();
                headers.insert("authorization", "Bearer test-token".parse().unwrap());
                headers
            },
            body: Bytes::new(),
        }
    }

    #[tokio::test]
    async fn test_dispatch_captures_status_headers_and_body() {
        let upstream = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/things"))
            .and(header("authorization", "Bearer test-token"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("x-upstream", "yes")
                    .set_body_raw(r#"{"items":[]}"#, "application/json"),
            )
            .mount(&upstream)
            .await;

        let response = dispatch(
            &reqwest::Client::new(),
            call_for(format!("{}/v1/things", upstream.uri())),
        )
        .await
        .unwrap();

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.headers.get("x-upstream").unwrap(), "yes");
        assert_eq!(response.body.as_ref(), br#"{"items":[]}"#);
    }

    #[tokio::test]
    async fn test_transport_failure_is_a_single_generic_error() {
        // Nothing listens on this port.
        let result = dispatch(
            &reqwest::Client::new(),
            call_for("http://127.0.0.1:1/v1/things".to_string()),
        )
        .await;
        assert!(matches!(
            result,
            Err(BridgeError::UpstreamTransport { .. })
        ));
    }
}
