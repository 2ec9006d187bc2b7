//! Middleware for logging requests and responses.
//!
//! Credentials never reach the logs: the session cookie, bearer token and
//! identity provider session ID headers are redacted, as is any
//! `session_token` field in a JSON body.

use axum::{
    body::{Body, Bytes},
    extract::Request,
    http::{
        HeaderMap, HeaderValue, StatusCode,
        header::{AUTHORIZATION, CONTENT_TYPE, COOKIE, SET_COOKIE},
    },
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::Value;

use crate::auth::SESSION_ID_HEADER;

/// Bodies longer than this many characters are truncated in `info` logs and
/// logged in full at the `debug` level.
pub const LOG_BODY_LENGTH_LIMIT: usize = 64;

const REDACTED: &str = "********";
const SESSION_TOKEN_FIELD: &str = "session_token";

/// Log the request and response for each request.
///
/// Both the request and response are logged at the `info` level.
/// If a body is longer than [LOG_BODY_LENGTH_LIMIT] characters, it is
/// truncated and logged in full at the `debug` level. Binary bodies, such as
/// PDF reports, are logged by size only.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let body_bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::error!("Could not read request body: {error}");
            return StatusCode::BAD_REQUEST.into_response();
        }
    };

    log_message(
        &format!(
            "Received request: {} {} {:?}\nheaders: {:#?}",
            parts.method,
            parts.uri,
            parts.version,
            redact_headers(&parts.headers)
        ),
        &describe_body(&parts.headers, &body_bytes),
    );

    let request = Request::from_parts(parts, Body::from(body_bytes));
    let response = next.run(request).await;

    let (parts, body) = response.into_parts();
    let body_bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::error!("Could not read response body: {error}");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    log_message(
        &format!(
            "Sending response: {}\nheaders: {:#?}",
            parts.status,
            redact_headers(&parts.headers)
        ),
        &describe_body(&parts.headers, &body_bytes),
    );

    Response::from_parts(parts, Body::from(body_bytes))
}

/// Copy `headers`, replacing the values of credential headers.
fn redact_headers(headers: &HeaderMap) -> HeaderMap {
    let mut redacted = headers.clone();

    for (name, value) in redacted.iter_mut() {
        let is_credential = *name == COOKIE
            || *name == SET_COOKIE
            || *name == AUTHORIZATION
            || name.as_str().eq_ignore_ascii_case(SESSION_ID_HEADER);

        if is_credential {
            *value = HeaderValue::from_static(REDACTED);
        }
    }

    redacted
}

/// Produce a loggable version of a request or response body.
fn describe_body(headers: &HeaderMap, body: &Bytes) -> String {
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    if content_type.starts_with("application/json") {
        if let Ok(mut json) = serde_json::from_slice::<Value>(body) {
            redact_session_tokens(&mut json);
            return json.to_string();
        }
    }

    if content_type.starts_with("application/pdf") {
        return format!("<{} bytes of binary data>", body.len());
    }

    match std::str::from_utf8(body) {
        Ok(text) => text.to_owned(),
        Err(_) => format!("<{} bytes of binary data>", body.len()),
    }
}

fn redact_session_tokens(json: &mut Value) {
    match json {
        Value::Object(map) => {
            for (key, value) in map.iter_mut() {
                if key == SESSION_TOKEN_FIELD {
                    *value = Value::String(REDACTED.to_owned());
                } else {
                    redact_session_tokens(value);
                }
            }
        }
        Value::Array(values) => values.iter_mut().for_each(redact_session_tokens),
        _ => {}
    }
}

fn log_message(summary: &str, body: &str) {
    if body.chars().count() > LOG_BODY_LENGTH_LIMIT {
        let truncated: String = body.chars().take(LOG_BODY_LENGTH_LIMIT).collect();
        tracing::info!("{summary}\nbody: {truncated}...");
        tracing::debug!("Full body: {body:?}");
    } else {
        tracing::info!("{summary}\nbody: {body:?}");
    }
}
