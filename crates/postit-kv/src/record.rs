use crate::error::KvError;

/// One persisted key/value pair.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Record {
    pub key: String,
    pub value: String,
}

/// Reject keys the store will not persist. Only the empty key is refused;
/// there is no length or character-set limit beyond the engine's own.
pub(crate) fn validate_key(key: &str) -> Result<(), KvError> {
    if key.is_empty() {
        return Err(KvError::InvalidKey("key must not be empty"));
    }
    Ok(())
}
