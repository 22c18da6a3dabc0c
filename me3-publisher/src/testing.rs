//! In-memory stand-ins for the remote services.
//!
//! Both record every call and can be told to fail the next requests.

use std::{
    collections::{hash_map::DefaultHasher, HashMap, VecDeque},
    hash::{Hash, Hasher},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    },
};

use async_trait::async_trait;
use me3_common::AssembledSite;

use crate::{
    Cid, ContentStore, KeyInfo, KeyType, NamePublishOptions, NameService, NameServiceError,
    PublishedName, UploadError, UploadOptions,
};

/// A successful upload as seen by [InMemoryContentStore].
#[derive(Debug, Clone)]
pub struct UploadRecord {
    pub options: UploadOptions,
    pub names: Vec<String>,
    pub contents: Vec<Vec<u8>>,
    pub cid: Cid,
}

impl UploadRecord {
    /// Content of the uploaded file called `name`.
    pub fn file(&self, name: &str) -> Option<&[u8]> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| self.contents[i].as_slice())
    }
}

/// Content store that hashes what it gets instead of uploading it.
///
/// Identical file sets get identical identifiers.
#[derive(Debug, Default)]
pub struct InMemoryContentStore {
    uploads: Mutex<Vec<UploadRecord>>,
    failures: Mutex<VecDeque<UploadError>>,
    attempts: AtomicUsize,
}

impl InMemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the next upload with `error`. Queued failures are used in order.
    pub fn fail_next(&self, error: UploadError) {
        self.failures.lock().unwrap().push_back(error);
    }

    /// Number of upload calls, failed ones included.
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    pub fn uploads(&self) -> Vec<UploadRecord> {
        self.uploads.lock().unwrap().clone()
    }
}

#[async_trait]
impl ContentStore for InMemoryContentStore {
    async fn upload(
        &self,
        site: &AssembledSite,
        options: &UploadOptions,
    ) -> Result<Cid, UploadError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.failures.lock().unwrap().pop_front() {
            return Err(error);
        }

        let mut hasher = DefaultHasher::new();
        let mut names = Vec::with_capacity(site.len());
        let mut contents = Vec::with_capacity(site.len());
        for file in site.files() {
            let bytes = file.read_all().await.map_err(|source| UploadError::File {
                name: file.name().to_string(),
                source,
            })?;
            file.name().hash(&mut hasher);
            bytes.hash(&mut hasher);
            names.push(file.name().to_string());
            contents.push(bytes.to_vec());
        }

        let cid: Cid = format!("bafymem{:016x}", hasher.finish())
            .parse()
            .expect("hex is a valid cid");
        self.uploads.lock().unwrap().push(UploadRecord {
            options: options.clone(),
            names,
            contents,
            cid: cid.clone(),
        });
        Ok(cid)
    }
}

#[derive(Debug, Default)]
struct NameState {
    keys: Vec<KeyInfo>,
    /// key id -> path
    records: HashMap<String, String>,
}

/// Key store and name records kept in memory.
///
/// Key ids are derived from the key name, so they are stable across instances.
#[derive(Debug, Default)]
pub struct InMemoryNameService {
    state: Mutex<NameState>,
    failures: Mutex<VecDeque<NameServiceError>>,
    list_calls: AtomicUsize,
    generate_calls: AtomicUsize,
    publish_calls: AtomicUsize,
}

impl InMemoryNameService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put a key into the store without going through [NameService::generate_key].
    pub fn add_key(&self, name: &str) -> KeyInfo {
        let key = KeyInfo {
            name: name.to_string(),
            id: key_id(name),
        };
        self.state.lock().unwrap().keys.push(key.clone());
        key
    }

    /// Fail the next call, whichever method it is.
    pub fn fail_next(&self, error: NameServiceError) {
        self.failures.lock().unwrap().push_back(error);
    }

    /// Path the name `id` currently points to.
    pub fn resolve(&self, id: &str) -> Option<String> {
        self.state.lock().unwrap().records.get(id).cloned()
    }

    pub fn record_count(&self) -> usize {
        self.state.lock().unwrap().records.len()
    }

    pub fn keys(&self) -> Vec<KeyInfo> {
        self.state.lock().unwrap().keys.clone()
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn generate_calls(&self) -> usize {
        self.generate_calls.load(Ordering::SeqCst)
    }

    pub fn publish_calls(&self) -> usize {
        self.publish_calls.load(Ordering::SeqCst)
    }

    fn take_failure(&self) -> Result<(), NameServiceError> {
        match self.failures.lock().unwrap().pop_front() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

fn key_id(name: &str) -> String {
    let mut hasher = DefaultHasher::new();
    name.hash(&mut hasher);
    format!("k51mem{:016x}", hasher.finish())
}

#[async_trait]
impl NameService for InMemoryNameService {
    async fn list_keys(&self) -> Result<Vec<KeyInfo>, NameServiceError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.take_failure()?;
        Ok(self.keys())
    }

    async fn generate_key(
        &self,
        name: &str,
        _key_type: KeyType,
    ) -> Result<KeyInfo, NameServiceError> {
        self.generate_calls.fetch_add(1, Ordering::SeqCst);
        self.take_failure()?;
        if self.keys().iter().any(|key| key.name == name) {
            return Err(NameServiceError::Status {
                status: 500,
                message: format!("key with name '{name}' already exists"),
            });
        }
        Ok(self.add_key(name))
    }

    async fn publish(
        &self,
        path: &str,
        options: &NamePublishOptions,
    ) -> Result<PublishedName, NameServiceError> {
        self.publish_calls.fetch_add(1, Ordering::SeqCst);
        self.take_failure()?;

        let mut state = self.state.lock().unwrap();
        let id = state
            .keys
            .iter()
            .find(|key| key.name == options.key)
            .map(|key| key.id.clone())
            .ok_or_else(|| NameServiceError::Status {
                status: 500,
                message: "no key by the given name was found".to_string(),
            })?;
        state.records.insert(id.clone(), path.to_string());

        Ok(PublishedName {
            name: id,
            value: path.to_string(),
        })
    }
}
