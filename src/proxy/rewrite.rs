//! # Request Rewriter
//!
//! Turns a matched inbound request into the outbound upstream call: target
//! host derived from the region, rewritten path, bearer token injection, and
//! the header surgery the translation layer depends on. Requests carrying a
//! `watch` query parameter are rejected up front; the watch protocol is not
//! supported.

use crate::core::config::BridgeConfig;
use crate::core::error::{BridgeError, BridgeResult};
use crate::routing::router::RouteMatch;
use axum::http::{header, HeaderMap, HeaderValue, Method, Uri};
use bytes::Bytes;

/// A fully rewritten outbound request, ready for dispatch
#[derive(Debug)]
pub struct UpstreamCall {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Build the upstream call for a proxied resource request
pub fn rewrite(
    config: &BridgeConfig,
    route: &RouteMatch,
    method: &Method,
    uri: &Uri,
    headers: &HeaderMap,
    body: Bytes,
    token: &str,
) -> BridgeResult<UpstreamCall> {
    if has_watch_param(uri.query()) {
        return Err(BridgeError::WatchUnsupported);
    }

    let base = config.upstream_base_for(&route.region);
    let path = route.upstream_path(uri.path());
    let url = match uri.query() {
        Some(query) => format!("{base}{path}?{query}"),
        None => format!("{base}{path}"),
    };

    let mut headers = headers.clone();
    headers.insert(
        header::USER_AGENT,
        HeaderValue::from_str(&config.user_agent)
            .map_err(|e| BridgeError::config(format!("invalid user agent: {e}")))?,
    );
    headers.insert(
        header::AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|e| BridgeError::credential(format!("token is not a valid header value: {e}")))?,
    );
    headers.insert(
        header::HOST,
        HeaderValue::from_str(authority_of(&base))
            .map_err(|e| BridgeError::config(format!("invalid upstream host: {e}")))?,
    );
    // The translator must see an uncompressed body it can parse.
    headers.remove(header::ACCEPT_ENCODING);

    Ok(UpstreamCall {
        method: method.clone(),
        url,
        headers,
        body,
    })
}

/// True when the query string carries a `watch` parameter with a non-empty
/// value
fn has_watch_param(query: Option<&str>) -> bool {
    let Some(query) = query else {
        return false;
    };
    query.split('&').any(|pair| {
        matches!(pair.split_once('='), Some(("watch", value)) if !value.is_empty())
    })
}

/// The authority portion of a base URL (everything after the scheme)
fn authority_of(base: &str) -> &str {
    base.split_once("://").map(|(_, rest)| rest).unwrap_or(base)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::router::BridgeRouter;

    fn route_for(path: &str) -> RouteMatch {
        BridgeRouter::new()
            .unwrap()
            .match_route(&Method::GET, path)
            .unwrap()
    }

    fn rewrite_path(path_and_query: &str) -> BridgeResult<UpstreamCall> {
        let uri: Uri = path_and_query.parse().unwrap();
        let route = route_for(uri.path());
        rewrite(
            &BridgeConfig::default(),
            &route,
            &Method::GET,
            &uri,
            &HeaderMap::new(),
            Bytes::new(),
            "test-token",
        )
    }

    #[test]
    fn test_upstream_url_from_region() {
        let call =
            rewrite_path("/us-central1/apis/serving.knative.dev/v1/namespaces/demo/services")
                .unwrap();
        assert_eq!(
            call.url,
            "https://us-central1-run.googleapis.com/apis/serving.knative.dev/v1/namespaces/demo/services"
        );
    }

    #[test]
    fn test_query_string_is_preserved() {
        let call = rewrite_path(
            "/us-central1/apis/serving.knative.dev/v1/namespaces/demo/services?limit=500",
        )
        .unwrap();
        assert!(call.url.ends_with("/namespaces/demo/services?limit=500"));
    }

    #[test]
    fn test_watch_param_is_rejected() {
        for query in ["watch=true", "watch=1", "limit=500&watch=true"] {
            let err = rewrite_path(&format!(
                "/us-central1/apis/serving.knative.dev/v1/namespaces/demo/services?{query}"
            ))
            .unwrap_err();
            assert!(matches!(err, BridgeError::WatchUnsupported));
        }
    }

    #[test]
    fn test_empty_watch_value_passes_through() {
        // `?watch=` carries no value; only non-empty values are rejected.
        assert!(rewrite_path(
            "/us-central1/apis/serving.knative.dev/v1/namespaces/demo/services?watch="
        )
        .is_ok());
        assert!(rewrite_path(
            "/us-central1/apis/serving.knative.dev/v1/namespaces/demo/services?watcher=true"
        )
        .is_ok());
    }

    #[test]
    fn test_header_rewrite() {
        let uri: Uri = "/us-central1/apis/serving.knative.dev/v1/namespaces/demo/services"
            .parse()
            .unwrap();
        let route = route_for(uri.path());
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT_ENCODING, HeaderValue::from_static("gzip"));
        headers.insert(
            header::ACCEPT,
            HeaderValue::from_static("application/json;as=Table"),
        );

        let call = rewrite(
            &BridgeConfig::default(),
            &route,
            &Method::GET,
            &uri,
            &headers,
            Bytes::new(),
            "test-token",
        )
        .unwrap();

        assert_eq!(
            call.headers.get(header::AUTHORIZATION).unwrap(),
            "Bearer test-token"
        );
        assert_eq!(
            call.headers.get(header::HOST).unwrap(),
            "us-central1-run.googleapis.com"
        );
        assert!(call.headers.get(header::ACCEPT_ENCODING).is_none());
        // Unrelated headers survive the rewrite.
        assert_eq!(
            call.headers.get(header::ACCEPT).unwrap(),
            "application/json;as=Table"
        );
        let user_agent = call.headers.get(header::USER_AGENT).unwrap();
        assert!(user_agent.to_str().unwrap().starts_with("runbridge/"));
    }

    #[test]
    fn test_legacy_route_substitutes_empty_region() {
        let uri: Uri = "/apis/serving.knative.dev/v1/namespaces/demo/services"
            .parse()
            .unwrap();
        let route = route_for(uri.path());
        let call = rewrite(
            &BridgeConfig::default(),
            &route,
            &Method::GET,
            &uri,
            &HeaderMap::new(),
            Bytes::new(),
            "test-token",
        )
        .unwrap();
        assert_eq!(
            call.url,
            "https://-run.googleapis.com/apis/serving.knative.dev/v1/namespaces/demo/services"
        );
    }
}
