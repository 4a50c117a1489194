use std::env;

/// Read a single environment variable.
///
/// Config loaders take `&impl ReadEnv` so tests can hand them an
/// [`InMemoryEnv`](super::InMemoryEnv) instead of mutating the process env.
pub trait ReadEnv {
    fn var(&self, key: &str) -> Result<String, env::VarError>;

    /// Like [`var`](ReadEnv::var) but treats an empty value as unset.
    fn non_empty_var(&self, key: &str) -> Option<String> {
        self.var(key).ok().filter(|v| !v.is_empty())
    }
}
