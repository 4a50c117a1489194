//! Twirp JSON framing for `kv.KVService`.
//!
//! Only the JSON encoding is served. Calls are `POST` requests to
//! `/twirp/kv.KVService/<Method>`; faults use the Twirp error body
//! `{"code": "...", "msg": "..."}`.

use std::fmt;

use axum::Router;
use axum::extract::rejection::BytesRejection;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri, header};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::any;
use bytes::Bytes;
use postit_kv::{KvError, KvStore};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::json;

use super::service::StoreService;

/// Path prefix every `kv.KVService` method lives under.
pub const SERVICE_PREFIX: &str = "/twirp/kv.KVService/";

/// Twirp error codes this service can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    BadRoute,
    Malformed,
    InvalidArgument,
    Internal,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BadRoute => "bad_route",
            Self::Malformed => "malformed",
            Self::InvalidArgument => "invalid_argument",
            Self::Internal => "internal",
        }
    }

    pub fn status(self) -> StatusCode {
        match self {
            Self::BadRoute => StatusCode::NOT_FOUND,
            Self::Malformed | Self::InvalidArgument => StatusCode::BAD_REQUEST,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An RPC fault, rendered as a Twirp error response.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{code}: {msg}")]
pub struct TwirpError {
    pub code: ErrorCode,
    pub msg: String,
}

impl TwirpError {
    pub fn new(code: ErrorCode, msg: impl Into<String>) -> Self {
        Self {
            code,
            msg: msg.into(),
        }
    }

    fn bad_route(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::BadRoute, msg)
    }
}

impl From<KvError> for TwirpError {
    fn from(err: KvError) -> Self {
        if err.is_invalid_input() {
            return Self::new(ErrorCode::InvalidArgument, err.to_string());
        }
        tracing::error!(error = %err, "Store operation failed");
        Self::new(ErrorCode::Internal, "storage failure")
    }
}

impl IntoResponse for TwirpError {
    fn into_response(self) -> Response {
        let body = json!({ "code": self.code.as_str(), "msg": self.msg });
        (self.code.status(), Json(body)).into_response()
    }
}

/// Router serving every `kv.KVService` method from `service`.
pub fn router<S: KvStore>(service: StoreService<S>) -> Router {
    Router::new()
        .route(SERVICE_PREFIX, any(handle_call::<S>))
        .route("/twirp/kv.KVService/{*method}", any(handle_call::<S>))
        .with_state(service)
}

async fn handle_call<S: KvStore>(
    State(service): State<StoreService<S>>,
    uri: Uri,
    http_method: Method,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, TwirpError> {
    if http_method != Method::POST {
        return Err(TwirpError::bad_route(format!(
            "unsupported method {http_method} (only POST is allowed)"
        )));
    }
    if !is_json(&headers) {
        return Err(TwirpError::bad_route(
            "unexpected Content-Type (expected application/json)",
        ));
    }
    let body = body.map_err(|e| TwirpError::new(ErrorCode::Malformed, e.body_text()))?;

    let method = uri.path().strip_prefix(SERVICE_PREFIX).unwrap_or_default();
    tracing::debug!(method, "Twirp call");

    match method {
        "SaveValue" => respond(service.save_value(decode(&body)?).await?),
        "LoadValue" => respond(service.load_value(decode(&body)?).await?),
        "" => Err(TwirpError::bad_route("no method name in path")),
        other => Err(TwirpError::bad_route(format!(
            "no handler for path {SERVICE_PREFIX}{other}"
        ))),
    }
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|ct| ct.split(';').next())
        .is_some_and(|mime| mime.trim().eq_ignore_ascii_case("application/json"))
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, TwirpError> {
    serde_json::from_slice(body).map_err(|e| {
        TwirpError::new(
            ErrorCode::Malformed,
            format!("the json request could not be decoded: {e}"),
        )
    })
}

fn respond<T: Serialize>(message: T) -> Result<Response, TwirpError> {
    Ok(Json(message).into_response())
}
