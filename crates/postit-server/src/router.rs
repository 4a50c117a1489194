use axum::Router;
use axum::extract::Request;
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::Response;
use postit_kv::KvStore;
use tracing::Instrument;

use crate::assets::{self, StaticAssets};
use crate::proxy::{self, PROXY_PREFIX, ProxyGateway};
use crate::rpc::{self, SERVICE_PREFIX, StoreService};

/// Which part of the application a request path belongs to, in dispatch
/// priority order.
///
/// Only used to label the per-request span. Dispatch itself is done by the
/// axum route table in [`app`], whose RPC, proxy and asset routes do not
/// overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface {
    Rpc,
    Proxy,
    Static,
}

impl Surface {
    pub fn classify(path: &str) -> Self {
        if path.starts_with(SERVICE_PREFIX) {
            Self::Rpc
        } else if path == PROXY_PREFIX
            || path
                .strip_prefix(PROXY_PREFIX)
                .is_some_and(|rest| rest.starts_with('/'))
        {
            Self::Proxy
        } else {
            Self::Static
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Rpc => "rpc",
            Self::Proxy => "proxy",
            Self::Static => "static",
        }
    }
}

/// The whole HTTP surface: RPC, the `/couchdb` proxy, static assets, and a
/// plain 404 for everything else.
pub fn app<S: KvStore>(
    service: StoreService<S>,
    gateway: ProxyGateway,
    assets: StaticAssets,
) -> Router {
    Router::new()
        .merge(rpc::router(service))
        .merge(proxy::router(gateway))
        .merge(assets::router(assets))
        .fallback(not_found)
        .layer(middleware::from_fn(trace_request))
}

async fn not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}

async fn trace_request(req: Request, next: Next) -> Response {
    let surface = Surface::classify(req.uri().path());
    let span = tracing::info_span!(
        "request",
        method = %req.method(),
        path = %req.uri().path(),
        surface = surface.as_str(),
    );

    async move {
        let response = next.run(req).await;
        tracing::debug!(status = response.status().as_u16(), "Request completed");
        response
    }
    .instrument(span)
    .await
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use postit_kv::MemoryStore;
    use reqwest::Url;
    use tower::ServiceExt;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::config::UpstreamConfig;

    fn gateway(origin: &str) -> ProxyGateway {
        ProxyGateway::new(&UpstreamConfig {
            origin: Url::parse(origin).unwrap(),
            username: "admin".to_string(),
            password: "secret".to_string(),
        })
        .unwrap()
    }

    fn test_app(origin: &str) -> Router {
        app(
            StoreService::new(Arc::new(MemoryStore::new())),
            gateway(origin),
            StaticAssets::default(),
        )
    }

    #[test]
    fn classify_by_prefix() {
        assert_eq!(Surface::classify("/twirp/kv.KVService/SaveValue"), Surface::Rpc);
        assert_eq!(Surface::classify("/couchdb"), Surface::Proxy);
        assert_eq!(Surface::classify("/couchdb/"), Surface::Proxy);
        assert_eq!(Surface::classify("/couchdb/notes/_all_docs"), Surface::Proxy);
        assert_eq!(Surface::classify("/couchdbx"), Surface::Static);
        assert_eq!(Surface::classify("/static/boards.html"), Surface::Static);
        assert_eq!(Surface::classify("/"), Surface::Static);
    }

    #[tokio::test]
    async fn rpc_prefix_is_served_locally() {
        let server = MockServer::start().await;
        let req = Request::builder()
            .method("POST")
            .uri("/twirp/kv.KVService/LoadValue")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"key":"k"}"#))
            .unwrap();

        let resp = test_app(&server.uri()).oneshot(req).await.unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn rpc_path_under_proxy_prefix_goes_upstream() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;
        let req = Request::builder()
            .method("POST")
            .uri("/couchdb/twirp/kv.KVService/LoadValue")
            .header("content-type", "application/json")
            .body(Body::from("{}"))
            .unwrap();

        test_app(&server.uri()).oneshot(req).await.unwrap();

        let received = server.received_requests().await.unwrap();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].url.path(), "/twirp/kv.KVService/LoadValue");
    }

    #[tokio::test]
    async fn unknown_paths_are_not_found() {
        let server = MockServer::start().await;

        for uri in ["/nope", "/couchdbx", "/twirp/other.Service/Call"] {
            let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
            let resp = test_app(&server.uri()).oneshot(req).await.unwrap();
            assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{uri}");
        }
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn root_redirects() {
        let req = Request::builder().uri("/").body(Body::empty()).unwrap();

        let resp = test_app("http://127.0.0.1:9").oneshot(req).await.unwrap();

        assert_eq!(resp.status(), StatusCode::TEMPORARY_REDIRECT);
    }
}
