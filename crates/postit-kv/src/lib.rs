//! Durable single-key, single-value string store.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use postit_kv::{KvStore, SqliteStore};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), postit_kv::KvError> {
//! let store = SqliteStore::open("/var/lib/postit/postit.db").await?;
//!
//! store.save("note-1", "buy milk").await?;
//! assert_eq!(store.load("note-1").await?, Some("buy milk".to_string()));
//! assert_eq!(store.load("note-2").await?, None);
//! # Ok(())
//! # }
//! ```
//!
//! An absent key is `Ok(None)`, never an error. [`KvError::Storage`] is
//! reserved for the backing engine failing.

pub mod error;
pub mod memory;
pub mod record;
pub mod sqlite;
pub mod store;

pub use error::KvError;
pub use memory::MemoryStore;
pub use record::Record;
pub use sqlite::SqliteStore;
pub use store::KvStore;
