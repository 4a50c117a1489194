use std::net::SocketAddr;
use std::path::PathBuf;

use postit_kv::KvError;
use thiserror::Error;

use crate::proxy::GatewayError;

/// Problems building a [`Config`](crate::Config) at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid listen address {value:?}: {source}")]
    InvalidAddr {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },

    #[error("no database path configured and HOME is not set")]
    MissingDbPath,

    #[error("couchdb host is not configured (set [couchdb] host or COUCHDB_HOST)")]
    MissingUpstream,

    #[error("invalid couchdb host {value:?}: {reason}")]
    InvalidUpstream { value: String, reason: String },
}

/// Fatal errors from [`serve`](crate::serve).
#[derive(Debug, Error)]
pub enum ServeError {
    #[error(transparent)]
    Store(#[from] KvError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}
