use std::sync::Arc;

use postit_kv::{KvError, KvStore};
use tracing::instrument;

use super::messages::{LoadValueRequest, LoadValueResponse, SaveValueRequest, SaveValueResponse};

/// `kv.KVService` over any [`KvStore`]. Each call is exactly one store
/// operation; errors propagate unchanged to the wire layer.
pub struct StoreService<S> {
    store: Arc<S>,
}

impl<S> Clone for StoreService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: KvStore> StoreService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    #[instrument(skip(self, req), fields(key = %req.key))]
    pub async fn save_value(&self, req: SaveValueRequest) -> Result<SaveValueResponse, KvError> {
        self.store.save(&req.key, &req.value).await?;
        Ok(SaveValueResponse { success: true })
    }

    #[instrument(skip(self, req), fields(key = %req.key))]
    pub async fn load_value(&self, req: LoadValueRequest) -> Result<LoadValueResponse, KvError> {
        let response = match self.store.load(&req.key).await? {
            Some(value) => LoadValueResponse { value, found: true },
            None => LoadValueResponse::default(),
        };
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use postit_kv::MemoryStore;

    fn service() -> StoreService<MemoryStore> {
        StoreService::new(Arc::new(MemoryStore::new()))
    }

    fn save(key: &str, value: &str) -> SaveValueRequest {
        SaveValueRequest {
            key: key.to_string(),
            value: value.to_string(),
        }
    }

    fn load(key: &str) -> LoadValueRequest {
        LoadValueRequest {
            key: key.to_string(),
        }
    }

    #[tokio::test]
    async fn save_reports_success() {
        let svc = service();

        let resp = svc.save_value(save("k", "v")).await.unwrap();

        assert!(resp.success);
    }

    #[tokio::test]
    async fn load_after_save_is_found() {
        let svc = service();
        svc.save_value(save("note-1", "hello")).await.unwrap();

        let resp = svc.load_value(load("note-1")).await.unwrap();

        assert_eq!(
            resp,
            LoadValueResponse {
                value: "hello".to_string(),
                found: true
            }
        );
    }

    #[tokio::test]
    async fn absent_key_is_not_found_without_error() {
        let svc = service();

        let resp = svc.load_value(load("note-2")).await.unwrap();

        assert_eq!(resp, LoadValueResponse::default());
    }

    #[tokio::test]
    async fn stored_empty_value_is_found() {
        let svc = service();
        svc.save_value(save("blank", "")).await.unwrap();

        let resp = svc.load_value(load("blank")).await.unwrap();

        assert!(resp.found);
        assert_eq!(resp.value, "");
    }

    #[tokio::test]
    async fn empty_key_propagates_invalid_key() {
        let svc = service();

        let err = svc.save_value(save("", "v")).await.unwrap_err();

        assert!(err.is_invalid_input());
    }
}
