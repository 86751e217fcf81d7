//! API Middleware
//!
//! Request logging with correlation ids.

use std::net::SocketAddr;

use axum::{
    body::Body,
    extract::{ConnectInfo, OriginalUri},
    http::{HeaderMap, HeaderValue, Request, Uri},
    middleware::Next,
    response::Response,
};
use tracing::Instrument;
use uuid::Uuid;

/// Header carrying the caller's correlation id
pub const CORRELATION_ID_HEADER: &str = "x-correlation-id";

/// Headers that should be masked in logs
const SENSITIVE_HEADERS: &[&str] = &["authorization", "cookie", "set-cookie"];

/// Query parameters that carry PINs and must never be logged
const SENSITIVE_QUERY_PARAMS: &[&str] = &["pin", "oldPin", "newPin"];

const REDACTED: &str = "[REDACTED]";

// =========================================================================
// mask_headers_for_logging
// =========================================================================

/// Mask sensitive headers for logging
pub fn mask_headers_for_logging(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(name, value)| {
            let name_lower = name.as_str().to_lowercase();
            let masked_value = if SENSITIVE_HEADERS.contains(&name_lower.as_str()) {
                REDACTED.to_string()
            } else {
                value.to_str().unwrap_or("[invalid utf8]").to_string()
            };
            (name.to_string(), masked_value)
        })
        .collect()
}

// =========================================================================
// mask_uri_for_logging
// =========================================================================

/// Path and query of `uri` with PIN parameter values replaced.
///
/// Keys are compared after percent-decoding, the same way the `Query`
/// extractor reads them.
pub fn mask_uri_for_logging(uri: &Uri) -> String {
    let Some(query) = uri.query() else {
        return uri.path().to_string();
    };

    let masked: Vec<String> = query
        .split('&')
        .map(|pair| match form_urlencoded::parse(pair.as_bytes()).next() {
            Some((key, _)) if SENSITIVE_QUERY_PARAMS.contains(&&*key) => format!("{key}={REDACTED}"),
            _ => pair.to_string(),
        })
        .collect();

    format!("{}?{}", uri.path(), masked.join("&"))
}

// =========================================================================
// Request Logging Middleware
// =========================================================================

/// Correlation id from `X-Correlation-Id` when it is a valid UUID,
/// otherwise a fresh one
pub fn correlation_id_from(headers: &HeaderMap) -> Uuid {
    headers
        .get(CORRELATION_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| Uuid::parse_str(s).ok())
        .unwrap_or_else(Uuid::new_v4)
}

/// Log request/response and run the handler inside an `operation` span
/// carrying the correlation id, which is echoed on the response.
pub async fn logging_middleware(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = match request.extensions().get::<OriginalUri>() {
        Some(OriginalUri(original)) => mask_uri_for_logging(original),
        None => mask_uri_for_logging(request.uri()),
    };
    let version = request.version();
    let headers = mask_headers_for_logging(request.headers());
    let correlation_id = correlation_id_from(request.headers());
    let client_ip = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());

    let span = tracing::info_span!("operation", correlation_id = %correlation_id);

    let mut response = async move {
        let start = std::time::Instant::now();

        tracing::info!(
            method = %method,
            uri = %uri,
            version = ?version,
            client_ip = ?client_ip,
            headers = ?headers,
            "Incoming request"
        );

        let response = next.run(request).await;

        tracing::info!(
            method = %method,
            uri = %uri,
            status = %response.status(),
            duration_ms = %start.elapsed().as_millis(),
            "Request completed"
        );

        response
    }
    .instrument(span)
    .await;

    if let Ok(value) = HeaderValue::from_str(&correlation_id.to_string()) {
        response.headers_mut().insert(CORRELATION_ID_HEADER, value);
    }

    response
}
