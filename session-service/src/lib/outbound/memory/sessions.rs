use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::domain::identity::errors::StoreError;
use crate::domain::identity::models::SessionKey;
use crate::domain::identity::ports::SessionStore;

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    deadline: Instant,
}

/// Process-local session store with per-entry deadlines.
///
/// Expired entries are dropped lazily on access.
#[derive(Debug, Clone, Default)]
pub struct InMemorySessionStore {
    entries: Arc<RwLock<HashMap<String, Entry>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn set(&self, key: &SessionKey, value: &str, ttl: Duration) -> Result<(), StoreError> {
        let entry = Entry {
            value: value.to_string(),
            deadline: Instant::now() + ttl,
        };
        self.entries.write().await.insert(key.to_string(), entry);
        Ok(())
    }

    async fn get(&self, key: &SessionKey) -> Result<Option<String>, StoreError> {
        let key = key.to_string();
        let now = Instant::now();

        {
            let entries = self.entries.read().await;
            match entries.get(&key) {
                Some(entry) if entry.deadline > now => return Ok(Some(entry.value.clone())),
                Some(_) => {}
                None => return Ok(None),
            }
        }

        let mut entries = self.entries.write().await;
        if entries.get(&key).is_some_and(|entry| entry.deadline <= now) {
            entries.remove(&key);
        }
        Ok(None)
    }

    async fn delete(&self, key: &SessionKey) -> Result<(), StoreError> {
        self.entries.write().await.remove(&key.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::identity::models::UserId;

    #[tokio::test]
    async fn test_last_writer_wins() {
        let store = InMemorySessionStore::new();
        let key = SessionKey::Refresh(UserId::new());

        store.set(&key, "first", Duration::from_secs(60)).await.unwrap();
        store.set(&key, "second", Duration::from_secs(60)).await.unwrap();

        assert_eq!(store.get(&key).await.unwrap().as_deref(), Some("second"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_entries_expire() {
        let store = InMemorySessionStore::new();
        let key = SessionKey::Reset(UserId::new());

        store.set(&key, "token", Duration::from_secs(5)).await.unwrap();
        tokio::time::advance(Duration::from_secs(6)).await;

        assert_eq!(store.get(&key).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_keys_are_namespaced() {
        let store = InMemorySessionStore::new();
        let id = UserId::new();

        store
            .set(&SessionKey::Refresh(id), "r", Duration::from_secs(60))
            .await
            .unwrap();

        assert_eq!(store.get(&SessionKey::Reset(id)).await.unwrap(), None);
        store.delete(&SessionKey::Refresh(id)).await.unwrap();
        store.delete(&SessionKey::Refresh(id)).await.unwrap();
        assert_eq!(store.get(&SessionKey::Refresh(id)).await.unwrap(), None);
    }
}
