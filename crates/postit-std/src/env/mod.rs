//! Environment variable access behind a trait.
//!
//! ```
//! use postit_std::env::{ReadEnv, SystemEnv};
//!
//! fn listen_addr<E: ReadEnv>(env: &E) -> String {
//!     env.var("POSTIT_ADDR")
//!         .unwrap_or_else(|_| "127.0.0.1:8000".to_string())
//! }
//!
//! let addr = listen_addr(&SystemEnv);
//! ```

mod in_memory;
mod read_env;
mod system;

#[cfg(any(test, feature = "test-support"))]
pub use in_memory::InMemoryEnv;
pub use read_env::ReadEnv;
pub use system::SystemEnv;
