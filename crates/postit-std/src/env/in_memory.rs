#[cfg(any(test, feature = "test-support"))]
use std::collections::HashMap;
#[cfg(any(test, feature = "test-support"))]
use std::env;
#[cfg(any(test, feature = "test-support"))]
use std::sync::Mutex;

#[cfg(any(test, feature = "test-support"))]
use super::ReadEnv;

/// Environment double that never touches the process environment.
///
/// Backed by a `Mutex` so it can be shared with handlers running on a
/// multi-threaded tokio runtime.
#[cfg(any(test, feature = "test-support"))]
#[derive(Debug, Default)]
pub struct InMemoryEnv {
    vars: Mutex<HashMap<String, String>>,
}

#[cfg(any(test, feature = "test-support"))]
impl InMemoryEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) {
        self.vars
            .lock()
            .unwrap()
            .insert(key.into(), value.into());
    }

    pub fn remove(&self, key: &str) {
        self.vars.lock().unwrap().remove(key);
    }
}

#[cfg(any(test, feature = "test-support"))]
impl ReadEnv for InMemoryEnv {
    fn var(&self, key: &str) -> Result<String, env::VarError> {
        self.vars
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .ok_or(env::VarError::NotPresent)
    }
}
