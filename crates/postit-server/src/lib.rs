//! postit HTTP server.
//!
//! One listener, three surfaces:
//!
//! - `POST /twirp/kv.KVService/{SaveValue,LoadValue}`: key-value RPC over
//!   [`postit_kv::KvStore`]
//! - `/couchdb/...`: reverse proxy to CouchDB with injected Basic auth
//! - `/`, `/static/...`, `/bundle.js`, `/favicon.ico`: the browser front end
//!
//! ```rust,no_run
//! use postit_server::{Config, serve};
//! use postit_std::SystemEnv;
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let config = Config::load(&SystemEnv)?;
//! serve(config).await?;
//! # Ok(())
//! # }
//! ```

pub mod assets;
pub mod config;
pub mod error;
pub mod proxy;
pub mod router;
pub mod rpc;
pub mod server;
pub mod signal;

pub use assets::StaticAssets;
pub use config::{Config, UpstreamConfig};
pub use error::{ConfigError, ServeError};
pub use proxy::{GatewayError, PassThrough, ProxyGateway, ResponseHook};
pub use router::{Surface, app};
pub use rpc::StoreService;
pub use server::{serve, serve_on};
