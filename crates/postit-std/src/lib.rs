//! Thin seams over process state used by the postit server.
//!
//! | Concern | Trait / fn | Production | Test |
//! |---------|------------|------------|------|
//! | Env vars | [`ReadEnv`] | [`SystemEnv`] | [`InMemoryEnv`]* |
//! | Home directory | [`home_dir`] | reads `HOME` via [`ReadEnv`] | same |
//!
//! *Available with `#[cfg(test)]` or the `"test-support"` feature.

pub mod dirs;
pub mod env;

pub use dirs::home_dir;
pub use env::{ReadEnv, SystemEnv};

#[cfg(any(test, feature = "test-support"))]
pub use env::InMemoryEnv;
