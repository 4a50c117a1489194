use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use postit_kv::{KvStore, SqliteStore};
use tokio::net::TcpListener;
use tracing::info;

use crate::assets::StaticAssets;
use crate::config::Config;
use crate::error::ServeError;
use crate::proxy::ProxyGateway;
use crate::router;
use crate::rpc::StoreService;
use crate::signal::wait_for_shutdown;

/// Run postit until SIGINT or SIGTERM.
///
/// Opens the store (fatal on failure), builds the gateway, binds
/// `config.addr`, serves, and closes the store pool once in-flight requests
/// have drained.
pub async fn serve(config: Config) -> Result<(), ServeError> {
    let store = Arc::new(SqliteStore::open(&config.db_path).await?);
    let gateway = ProxyGateway::new(&config.upstream)?;
    let assets = StaticAssets::new(config.static_path);

    let listener = TcpListener::bind(config.addr)
        .await
        .map_err(|source| ServeError::Bind {
            addr: config.addr,
            source,
        })?;
    info!(
        addr = %config.addr,
        upstream = %config.upstream.origin,
        "postit listening"
    );

    let shutdown = async {
        let signal = wait_for_shutdown().await;
        info!(%signal, "Shutting down");
    };
    let result = serve_on(listener, Arc::clone(&store), gateway, assets, shutdown).await;

    store.close().await;
    info!("Store closed");
    result
}

/// Serve the full application on an already-bound listener until `shutdown`
/// resolves. Caller addresses are made available to the proxy.
pub async fn serve_on<S, F>(
    listener: TcpListener,
    store: Arc<S>,
    gateway: ProxyGateway,
    assets: StaticAssets,
    shutdown: F,
) -> Result<(), ServeError>
where
    S: KvStore,
    F: Future<Output = ()> + Send + 'static,
{
    let app = router::app(StoreService::new(store), gateway, assets);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown)
    .await
    .map_err(ServeError::Serve)
}
