//! End-to-end tests over a real TCP listener: SQLite store on disk, CouchDB
//! mocked with wiremock, requests sent with reqwest.

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use postit_kv::SqliteStore;
use postit_server::{ProxyGateway, StaticAssets, UpstreamConfig, serve_on};
use reqwest::Url;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct Running {
    addr: SocketAddr,
    stop: oneshot::Sender<()>,
    task: JoinHandle<()>,
    store: Arc<SqliteStore>,
}

impl Running {
    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    async fn stop(self) {
        let _ = self.stop.send(());
        self.task.await.unwrap();
        self.store.close().await;
    }
}

async fn start(db: &Path, upstream: &str) -> Running {
    let store = Arc::new(SqliteStore::open(db).await.unwrap());
    let gateway = ProxyGateway::new(&UpstreamConfig {
        origin: Url::parse(upstream).unwrap(),
        username: "admin".to_string(),
        password: "secret".to_string(),
    })
    .unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (stop, stopped) = oneshot::channel::<()>();

    let task = tokio::spawn({
        let store = Arc::clone(&store);
        async move {
            serve_on(listener, store, gateway, StaticAssets::default(), async {
                let _ = stopped.await;
            })
            .await
            .unwrap();
        }
    });

    Running {
        addr,
        stop,
        task,
        store,
    }
}

async fn rpc(client: &reqwest::Client, server: &Running, method: &str, body: Value) -> (u16, Value) {
    let resp = client
        .post(server.url(&format!("/twirp/kv.KVService/{method}")))
        .json(&body)
        .send()
        .await
        .unwrap();
    let status = resp.status().as_u16();
    (status, resp.json().await.unwrap())
}

#[tokio::test]
async fn note_scenario_over_http() {
    let dir = tempfile::tempdir().unwrap();
    let upstream = MockServer::start().await;
    let server = start(&dir.path().join("postit.db"), &upstream.uri()).await;
    let client = reqwest::Client::new();

    let (status, body) = rpc(&client, &server, "SaveValue", json!({"key": "note-1", "value": "hello"})).await;
    assert_eq!(status, 200);
    assert_eq!(body, json!({"success": true}));

    let (_, body) = rpc(&client, &server, "LoadValue", json!({"key": "note-1"})).await;
    assert_eq!(body, json!({"value": "hello", "found": true}));

    let (status, body) = rpc(&client, &server, "LoadValue", json!({"key": "note-2"})).await;
    assert_eq!(status, 200);
    assert_eq!(body, json!({"value": "", "found": false}));

    server.stop().await;
}

#[tokio::test]
async fn value_survives_server_restart() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("data").join("postit.db");
    let upstream = MockServer::start().await;
    let client = reqwest::Client::new();

    let first = start(&db, &upstream.uri()).await;
    rpc(&client, &first, "SaveValue", json!({"key": "board", "value": "{\"cols\":3}"})).await;
    first.stop().await;

    let second = start(&db, &upstream.uri()).await;
    let (_, body) = rpc(&client, &second, "LoadValue", json!({"key": "board"})).await;
    assert_eq!(body, json!({"value": "{\"cols\":3}", "found": true}));
    second.stop().await;
}

#[tokio::test]
async fn proxy_forwards_with_credentials_and_caller_address() {
    let dir = tempfile::tempdir().unwrap();
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/notes/_all_docs"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"rows":[]}"#))
        .mount(&upstream)
        .await;
    let server = start(&dir.path().join("postit.db"), &upstream.uri()).await;

    let resp = reqwest::Client::new()
        .get(server.url("/couchdb/notes/_all_docs?limit=10"))
        .header("authorization", "Basic ZXZpbDpldmls")
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status().as_u16(), 200);
    assert_eq!(resp.text().await.unwrap(), r#"{"rows":[]}"#);

    let received = upstream.received_requests().await.unwrap();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].url.query(), Some("limit=10"));
    assert_eq!(received[0].headers["authorization"], "Basic YWRtaW46c2VjcmV0");
    assert_eq!(received[0].headers["x-forwarded-for"], "127.0.0.1");

    server.stop().await;
}

#[tokio::test]
async fn concurrent_saves_over_http_are_all_visible() {
    let dir = tempfile::tempdir().unwrap();
    let upstream = MockServer::start().await;
    let server = Arc::new(start(&dir.path().join("postit.db"), &upstream.uri()).await);
    let client = reqwest::Client::new();

    let mut tasks = Vec::new();
    for i in 0..32 {
        let client = client.clone();
        let url = server.url("/twirp/kv.KVService/SaveValue");
        tasks.push(tokio::spawn(async move {
            client
                .post(url)
                .json(&json!({"key": format!("note-{i}"), "value": format!("v{i}")}))
                .send()
                .await
                .unwrap()
                .status()
                .as_u16()
        }));
    }
    for task in tasks {
        assert_eq!(task.await.unwrap(), 200);
    }

    for i in 0..32 {
        let (_, body) = rpc(&client, &server, "LoadValue", json!({"key": format!("note-{i}")})).await;
        assert_eq!(body, json!({"value": format!("v{i}"), "found": true}));
    }

    let server = Arc::try_unwrap(server).ok().unwrap();
    server.stop().await;
}
