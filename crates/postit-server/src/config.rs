use std::fmt;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use postit_std::{ReadEnv, home_dir};
use reqwest::Url;
use serde::Deserialize;

use crate::error::ConfigError;

pub const DEFAULT_ADDR: &str = "127.0.0.1:8000";
const DEFAULT_CONFIG_FILE: &str = "postit-config.toml";
const DEFAULT_DB_FILE: &str = "postit.db";

const ENV_CONFIG: &str = "POSTIT_CONFIG";
const ENV_ADDR: &str = "POSTIT_ADDR";
const ENV_STATIC_PATH: &str = "POSTIT_STATIC_PATH";
const ENV_DB_PATH: &str = "POSTIT_DB_PATH";
const ENV_COUCHDB_HOST: &str = "COUCHDB_HOST";
const ENV_COUCHDB_USERNAME: &str = "COUCHDB_USERNAME";
const ENV_COUCHDB_PASSWORD: &str = "COUCHDB_PASSWORD";

/// Fully resolved server configuration.
///
/// Built once at startup by [`Config::load`] and passed by value into
/// [`serve`](crate::serve); nothing reads configuration after that.
///
/// Sources, later ones winning:
/// 1. TOML file at `POSTIT_CONFIG`, or `$HOME/postit-config.toml` when present
/// 2. Environment variables:
///    - `POSTIT_ADDR`: listen address (default `127.0.0.1:8000`)
///    - `POSTIT_STATIC_PATH`: directory served under `/static` (default: none)
///    - `POSTIT_DB_PATH`: SQLite file (default `$HOME/postit.db`)
///    - `COUCHDB_HOST`: upstream origin for `/couchdb` (required)
///    - `COUCHDB_USERNAME` / `COUCHDB_PASSWORD`: Basic credentials injected into
///      every proxied request
#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub static_path: Option<PathBuf>,
    pub db_path: PathBuf,
    pub upstream: UpstreamConfig,
}

/// Where `/couchdb` traffic goes and which credentials it carries.
///
/// The credentials are applied to every proxied request regardless of who
/// sent it. Anyone who can reach the proxy prefix acts as this user.
#[derive(Clone)]
pub struct UpstreamConfig {
    pub origin: Url,
    pub username: String,
    pub password: String,
}

impl fmt::Debug for UpstreamConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpstreamConfig")
            .field("origin", &self.origin.as_str())
            .field("username", &self.username)
            .field("password", &"[redacted]")
            .finish()
    }
}

/// On-disk layout of `postit-config.toml`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    server: ServerSection,
    couchdb: CouchDbSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ServerSection {
    addr: Option<String>,
    static_path: Option<PathBuf>,
    db_path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CouchDbSection {
    host: Option<String>,
    username: Option<String>,
    password: Option<String>,
}

impl FileConfig {
    fn read(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl Config {
    /// Load the config file (if any), apply environment overrides, and
    /// validate the result.
    pub fn load<E: ReadEnv>(env: &E) -> Result<Self, ConfigError> {
        let file = match env.non_empty_var(ENV_CONFIG) {
            Some(path) => FileConfig::read(Path::new(&path))?,
            None => match home_dir(env).map(|home| home.join(DEFAULT_CONFIG_FILE)) {
                Some(path) if path.is_file() => FileConfig::read(&path)?,
                _ => FileConfig::default(),
            },
        };
        Self::resolve(file, env)
    }

    /// Parse `content` as a config file and layer `env` on top of it.
    pub fn from_toml_str<E: ReadEnv>(content: &str, env: &E) -> Result<Self, ConfigError> {
        let file = toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: PathBuf::from("<inline>"),
            source,
        })?;
        Self::resolve(file, env)
    }

    fn resolve<E: ReadEnv>(file: FileConfig, env: &E) -> Result<Self, ConfigError> {
        let FileConfig { server, couchdb } = file;

        let raw_addr = env
            .non_empty_var(ENV_ADDR)
            .or(server.addr)
            .unwrap_or_else(|| DEFAULT_ADDR.to_string());
        let addr = raw_addr
            .parse()
            .map_err(|source| ConfigError::InvalidAddr {
                value: raw_addr.clone(),
                source,
            })?;

        let static_path = env
            .non_empty_var(ENV_STATIC_PATH)
            .map(PathBuf::from)
            .or(server.static_path);

        let db_path = env
            .non_empty_var(ENV_DB_PATH)
            .map(PathBuf::from)
            .or(server.db_path)
            .or_else(|| home_dir(env).map(|home| home.join(DEFAULT_DB_FILE)))
            .ok_or(ConfigError::MissingDbPath)?;

        let host = env
            .non_empty_var(ENV_COUCHDB_HOST)
            .or(couchdb.host)
            .filter(|h| !h.is_empty())
            .ok_or(ConfigError::MissingUpstream)?;
        let origin = parse_origin(&host)?;

        Ok(Self {
            addr,
            static_path,
            db_path,
            upstream: UpstreamConfig {
                origin,
                username: env
                    .non_empty_var(ENV_COUCHDB_USERNAME)
                    .or(couchdb.username)
                    .unwrap_or_default(),
                password: env
                    .non_empty_var(ENV_COUCHDB_PASSWORD)
                    .or(couchdb.password)
                    .unwrap_or_default(),
            },
        })
    }
}

fn parse_origin(host: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidUpstream {
        value: host.to_string(),
        reason: reason.to_string(),
    };

    let url = Url::parse(host).map_err(|e| invalid(&e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid("scheme must be http or https"));
    }
    if url.host_str().is_none() {
        return Err(invalid("missing host"));
    }
    Ok(url)
}
