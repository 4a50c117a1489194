//! `kv.KVService`: `SaveValue` and `LoadValue` over the key-value store.

pub mod messages;
pub mod service;
pub mod twirp;

pub use messages::{LoadValueRequest, LoadValueResponse, SaveValueRequest, SaveValueResponse};
pub use service::StoreService;
pub use twirp::{ErrorCode, SERVICE_PREFIX, TwirpError, router};
