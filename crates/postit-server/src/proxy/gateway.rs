//! Reverse proxy from `/couchdb` to the configured upstream.
//!
//! Every request has the prefix stripped, its `Authorization` header replaced
//! with the configured Basic credentials, and is forwarded as-is otherwise.
//! Upstream responses (including 4xx/5xx) are relayed with a streamed body.
//! Only transport failures are answered locally, with an empty 502, and
//! paths carrying `.`/`..` segments are refused with a 400 before forwarding.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::extract::{ConnectInfo, Request, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::any;
use reqwest::redirect::Policy;
use thiserror::Error;
use tracing::instrument;

use super::auth::BasicAuth;
use super::headers;
use super::hook::{PassThrough, ResponseHook};
use super::upstream::Upstream;
use crate::config::UpstreamConfig;

/// Path prefix routed to the upstream.
pub const PROXY_PREFIX: &str = "/couchdb";

/// Errors building a [`ProxyGateway`].
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("upstream credentials cannot be sent as a header")]
    Credentials(#[from] axum::http::header::InvalidHeaderValue),
}

/// Shared proxy state. Cheap to clone; clones share the connection pool.
#[derive(Clone)]
pub struct ProxyGateway {
    client: reqwest::Client,
    upstream: Upstream,
    auth: BasicAuth,
    hook: Arc<dyn ResponseHook>,
}

impl ProxyGateway {
    pub fn new(config: &UpstreamConfig) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .redirect(Policy::none())
            .build()?;
        Ok(Self {
            client,
            upstream: Upstream::new(config.origin.clone()),
            auth: BasicAuth::new(&config.username, &config.password)?,
            hook: Arc::new(PassThrough),
        })
    }

    /// Replace the [`PassThrough`] response hook.
    pub fn with_hook(mut self, hook: impl ResponseHook) -> Self {
        self.hook = Arc::new(hook);
        self
    }

    pub fn upstream(&self) -> &Upstream {
        &self.upstream
    }

    /// Forward `req` upstream and relay the answer.
    ///
    /// Dropping the returned future (or the streamed body of its response)
    /// cancels the in-flight upstream request.
    #[instrument(skip_all, fields(method = %req.method(), path = %req.uri().path()))]
    pub async fn forward(&self, req: Request) -> Response {
        let client_ip = req
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip());
        let (parts, body) = req.into_parts();

        let rest = parts
            .uri
            .path()
            .strip_prefix(PROXY_PREFIX)
            .unwrap_or_default();
        let Some(url) = self.upstream.url_for(rest, parts.uri.query()) else {
            tracing::warn!(path = rest, "Refusing dot segment in proxied path");
            return StatusCode::BAD_REQUEST.into_response();
        };

        let body = match axum::body::to_bytes(body, usize::MAX).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read request body");
                return StatusCode::BAD_REQUEST.into_response();
            }
        };

        let mut out_headers = headers::outbound(parts.headers, client_ip);
        out_headers.insert(header::AUTHORIZATION, self.auth.header_value());

        let upstream_resp = match self
            .client
            .request(parts.method, url)
            .headers(out_headers)
            .body(body)
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    upstream = %self.upstream.origin(),
                    "Upstream request failed"
                );
                return StatusCode::BAD_GATEWAY.into_response();
            }
        };

        let status = upstream_resp.status();
        tracing::debug!(status = status.as_u16(), "Upstream responded");

        let mut resp_headers = upstream_resp.headers().clone();
        headers::strip_hop_by_hop(&mut resp_headers);

        let mut response = Response::new(Body::from_stream(upstream_resp.bytes_stream()));
        *response.status_mut() = status;
        *response.headers_mut() = resp_headers;

        self.hook.on_response(response)
    }
}

/// Router that sends `/couchdb`, `/couchdb/` and everything below to `gateway`.
pub fn router(gateway: ProxyGateway) -> Router {
    Router::new()
        .route("/couchdb", any(handle))
        .route("/couchdb/", any(handle))
        .route("/couchdb/{*rest}", any(handle))
        .with_state(gateway)
}

async fn handle(State(gateway): State<ProxyGateway>, req: Request) -> Response {
    gateway.forward(req).await
}
