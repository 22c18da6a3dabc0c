//!
//! Subdomain to signing key resolution.
//!
//! Every subdomain signs its name record with its own key, stored in the
//! name service's key store under the subdomain itself. Resolved keys are
//! cached for the lifetime of the process.
//!

use std::{collections::HashMap, sync::Arc};

use me3_common::SubdomainLabel;
use tokio::sync::{Mutex, RwLock};

use crate::{KeyType, NameService, NameServiceError};

/// A key in the name service's key store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningKey {
    /// Key store name. Same as the subdomain it belongs to.
    pub name: String,
    /// Key id, which is also the name records are published under.
    pub id: String,
}

#[derive(thiserror::Error, Debug)]
pub enum KeyStoreError {
    #[error("Failed to list keys: {0}")]
    List(#[source] NameServiceError),
    #[error("Failed to generate key: {0}")]
    Generate(#[source] NameServiceError),
}

/// Label to key id cache, shared between clones.
#[derive(Debug, Clone, Default)]
pub struct KeyCache {
    inner: Arc<RwLock<HashMap<String, String>>>,
}

impl KeyCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, label: &str) -> Option<String> {
        self.inner.read().await.get(label).cloned()
    }

    /// Remember `id` for `label` unless a key is already known.
    /// Returns the id that ends up cached.
    pub async fn insert_if_absent(&self, label: &str, id: String) -> String {
        self.inner
            .write()
            .await
            .entry(label.to_string())
            .or_insert(id)
            .clone()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

/// Looks up or creates the signing key of a subdomain.
#[derive(Clone)]
pub struct KeyManager {
    service: Arc<dyn NameService>,
    cache: KeyCache,
    /// One creation lock per label. Concurrent requests for a new subdomain create one key
    /// without holding up other subdomains.
    creating: Arc<Mutex<HashMap<String, Arc<Mutex<()>>>>>,
}

impl std::fmt::Debug for KeyManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyManager")
            .field("cache", &self.cache)
            .finish()
    }
}

impl KeyManager {
    pub fn new(service: Arc<dyn NameService>, cache: KeyCache) -> Self {
        Self {
            service,
            cache,
            creating: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    async fn creation_lock(&self, name: &str) -> Arc<Mutex<()>> {
        self.creating
            .lock()
            .await
            .entry(name.to_string())
            .or_default()
            .clone()
    }

    pub fn cache(&self) -> &KeyCache {
        &self.cache
    }

    /// Key for `label`, reusing a cached or stored key before generating a new one.
    pub async fn key_for(&self, label: &SubdomainLabel) -> Result<SigningKey, KeyStoreError> {
        let name = label.as_str();
        if let Some(id) = self.cache.get(name).await {
            tracing::debug!("Using cached key {id} for {name}");
            return Ok(SigningKey {
                name: name.to_string(),
                id,
            });
        }

        let lock = self.creation_lock(name).await;
        let _guard = lock.lock().await;
        // Another request may have resolved the key while we waited.
        if let Some(id) = self.cache.get(name).await {
            return Ok(SigningKey {
                name: name.to_string(),
                id,
            });
        }

        let keys = self
            .service
            .list_keys()
            .await
            .map_err(KeyStoreError::List)?;
        let id = match keys.into_iter().find(|key| key.name == name) {
            Some(key) => {
                tracing::debug!("Found stored key {} for {name}", key.id);
                key.id
            }
            None => {
                let key = self
                    .service
                    .generate_key(name, KeyType::Ed25519)
                    .await
                    .map_err(KeyStoreError::Generate)?;
                tracing::info!("Generated key {} for {name}", key.id);
                key.id
            }
        };

        let id = self.cache.insert_if_absent(name, id).await;
        Ok(SigningKey {
            name: name.to_string(),
            id,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::atomic::{AtomicBool, Ordering},
        time::Duration,
    };

    use async_trait::async_trait;

    use super::*;
    use crate::{testing::InMemoryNameService, KeyInfo, NamePublishOptions, PublishedName};

    /// Name service whose first key listing never answers.
    #[derive(Default)]
    struct StuckFirstList {
        inner: InMemoryNameService,
        stuck: AtomicBool,
    }

    #[async_trait]
    impl NameService for StuckFirstList {
        async fn list_keys(&self) -> Result<Vec<KeyInfo>, NameServiceError> {
            if !self.stuck.swap(true, Ordering::SeqCst) {
                std::future::pending::<()>().await;
            }
            self.inner.list_keys().await
        }

        async fn generate_key(
            &self,
            name: &str,
            key_type: KeyType,
        ) -> Result<KeyInfo, NameServiceError> {
            self.inner.generate_key(name, key_type).await
        }

        async fn publish(
            &self,
            path: &str,
            options: &NamePublishOptions,
        ) -> Result<PublishedName, NameServiceError> {
            self.inner.publish(path, options).await
        }
    }

    fn label(raw: &str) -> SubdomainLabel {
        SubdomainLabel::from_domain(raw).unwrap()
    }

    #[tokio::test]
    async fn distinct_subdomains_get_distinct_keys() {
        let service = Arc::new(InMemoryNameService::new());
        let manager = KeyManager::new(service.clone(), KeyCache::new());

        let alice = manager.key_for(&label("alice.me3.eth")).await.unwrap();
        let bob = manager.key_for(&label("bob.me3.eth")).await.unwrap();

        assert_ne!(alice.id, bob.id);
        assert_eq!(alice.name, "alice.me3.eth");
        assert_eq!(service.generate_calls(), 2);
    }

    #[tokio::test]
    async fn second_lookup_hits_cache() {
        let service = Arc::new(InMemoryNameService::new());
        let manager = KeyManager::new(service.clone(), KeyCache::new());

        let first = manager.key_for(&label("alice.me3.eth")).await.unwrap();
        let second = manager.key_for(&label("alice.me3.eth")).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(service.list_calls(), 1);
        assert_eq!(service.generate_calls(), 1);
        assert_eq!(manager.cache().len().await, 1);
    }

    #[tokio::test]
    async fn stored_key_is_reused() {
        let service = Arc::new(InMemoryNameService::new());
        let existing = service.add_key("alice.me3.eth");
        let manager = KeyManager::new(service.clone(), KeyCache::new());

        let key = manager.key_for(&label("alice.me3.eth")).await.unwrap();

        assert_eq!(key.id, existing.id);
        assert_eq!(service.generate_calls(), 0);
    }

    #[tokio::test]
    async fn caches_are_isolated() {
        let service = Arc::new(InMemoryNameService::new());
        let a = KeyManager::new(service.clone(), KeyCache::new());
        let b = KeyManager::new(service.clone(), KeyCache::new());

        a.key_for(&label("alice.me3.eth")).await.unwrap();
        assert!(b.cache().is_empty().await);

        // b finds the stored key instead of generating another one.
        b.key_for(&label("alice.me3.eth")).await.unwrap();
        assert_eq!(service.generate_calls(), 1);
        assert_eq!(service.list_calls(), 2);
    }

    #[tokio::test]
    async fn concurrent_requests_create_one_key() {
        let service = Arc::new(InMemoryNameService::new());
        let manager = KeyManager::new(service.clone(), KeyCache::new());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let manager = manager.clone();
                tokio::spawn(async move { manager.key_for(&label("carol.me3.eth")).await })
            })
            .collect();
        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.unwrap().unwrap().id);
        }

        ids.dedup();
        assert_eq!(ids.len(), 1);
        assert_eq!(service.generate_calls(), 1);
    }

    #[tokio::test]
    async fn stuck_lookup_does_not_block_other_subdomains() {
        let service = Arc::new(StuckFirstList::default());
        let manager = KeyManager::new(service.clone(), KeyCache::new());

        let stuck = {
            let manager = manager.clone();
            tokio::spawn(async move { manager.key_for(&label("alice.me3.eth")).await })
        };
        while !service.stuck.load(Ordering::SeqCst) {
            tokio::task::yield_now().await;
        }

        let bob = tokio::time::timeout(
            Duration::from_secs(2),
            manager.key_for(&label("bob.me3.eth")),
        )
        .await
        .expect("bob is not blocked by alice")
        .unwrap();
        assert_eq!(bob.name, "bob.me3.eth");
        assert!(!stuck.is_finished());
        stuck.abort();
    }

    #[tokio::test]
    async fn list_failure_is_reported() {
        let service = Arc::new(InMemoryNameService::new());
        service.fail_next(NameServiceError::Status {
            status: 500,
            message: "node is down".to_string(),
        });
        let manager = KeyManager::new(service.clone(), KeyCache::new());

        let err = manager.key_for(&label("alice.me3.eth")).await.unwrap_err();
        assert!(matches!(err, KeyStoreError::List(_)));
        assert!(manager.cache().is_empty().await);
    }
}
