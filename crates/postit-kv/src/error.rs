use std::path::PathBuf;

use thiserror::Error;

/// Errors returned by [`KvStore`](crate::KvStore) implementations.
#[derive(Debug, Error)]
pub enum KvError {
    /// The store directory could not be created.
    #[error("failed to create store directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Connecting to or migrating the database failed during startup.
    #[error("failed to initialize store at {}: {source}", path.display())]
    Init {
        path: PathBuf,
        #[source]
        source: sqlx::Error,
    },

    /// The caller supplied a key the store does not accept.
    #[error("invalid key: {0}")]
    InvalidKey(&'static str),

    /// The backing engine failed a read or write.
    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),
}

impl KvError {
    /// `true` when the error was caused by the caller's input rather than
    /// the storage engine.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidKey(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_key_is_invalid_input() {
        assert!(KvError::InvalidKey("key must not be empty").is_invalid_input());
    }

    #[test]
    fn storage_is_not_invalid_input() {
        let err = KvError::Storage(sqlx::Error::PoolClosed);
        assert!(!err.is_invalid_input());
        assert!(err.to_string().starts_with("storage error"));
    }

    #[test]
    fn init_display_includes_path() {
        let err = KvError::Init {
            path: PathBuf::from("/data/postit.db"),
            source: sqlx::Error::PoolTimedOut,
        };
        assert!(err.to_string().contains("/data/postit.db"));
    }
}
