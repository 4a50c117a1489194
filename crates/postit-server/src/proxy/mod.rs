pub mod auth;
pub mod gateway;
pub mod headers;
pub mod hook;
pub mod upstream;

pub use auth::BasicAuth;
pub use gateway::{GatewayError, PROXY_PREFIX, ProxyGateway, router};
pub use hook::{PassThrough, ResponseHook};
pub use upstream::Upstream;
