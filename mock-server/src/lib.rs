use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use axum::{
    extract::{Path, Query, RawQuery},
    http::{header, HeaderMap, Method, StatusCode},
    routing::{any, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

/// API key accepted by `/secure`.
pub const API_KEY: &str = "test-key";

/// Largest body `/large` will produce.
pub const MAX_LARGE_BODY: usize = 64 * 1024 * 1024;

/// ISO-8859-1 XML served by `/latin1`; `\xfc` is not valid UTF-8.
pub const LATIN1_BODY: &[u8] = b"<n>M\xfcller</n>";

/// What `/echo` saw of the incoming request.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Echo {
    pub method: String,
    pub query: Option<String>,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

pub fn app() -> Router {
    Router::new()
        .route("/echo", any(echo))
        .route("/echo/{*rest}", any(echo))
        .route("/status/{code}", any(status))
        .route("/empty", any(empty))
        .route("/slow/{millis}", get(slow))
        .route("/secure", any(secure))
        .route("/large/{bytes}", get(large))
        .route("/latin1", get(latin1))
}

/// Body of `len` ASCII digits cycling `0..=9`, as served by `/large`.
pub fn large_body(len: usize) -> Vec<u8> {
    (b'0'..=b'9').cycle().take(len).collect()
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    if let Ok(addr) = listener.local_addr() {
        tracing::debug!(%addr, "mock web service accepting connections");
    }
    axum::serve(listener, app()).await
}

async fn echo(method: Method, RawQuery(query): RawQuery, headers: HeaderMap, body: String) -> Json<Echo> {
    let headers = headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|value| (name.as_str().to_string(), value.to_string()))
        })
        .collect();
    Json(Echo {
        method: method.as_str().to_string(),
        query,
        headers,
        body,
    })
}

async fn status(Path(code): Path<u16>) -> Result<(StatusCode, String), StatusCode> {
    let status = StatusCode::from_u16(code).map_err(|_| StatusCode::BAD_REQUEST)?;
    Ok((status, format!("status {code}")))
}

async fn empty() -> StatusCode {
    StatusCode::OK
}

async fn slow(Path(millis): Path<u64>) -> &'static str {
    tokio::time::sleep(Duration::from_millis(millis)).await;
    "slow"
}

async fn secure(Query(query): Query<HashMap<String, String>>) -> Result<&'static str, StatusCode> {
    match query.get("api_key") {
        Some(key) if key == API_KEY => Ok(r#"{"authorized":true}"#),
        _ => Err(StatusCode::UNAUTHORIZED),
    }
}

async fn large(Path(bytes): Path<usize>) -> Result<Vec<u8>, StatusCode> {
    if bytes > MAX_LARGE_BODY {
        return Err(StatusCode::BAD_REQUEST);
    }
    Ok(large_body(bytes))
}

async fn latin1() -> ([(header::HeaderName, &'static str); 1], &'static [u8]) {
    (
        [(header::CONTENT_TYPE, "application/xml; charset=iso-8859-1")],
        LATIN1_BODY,
    )
}
