//! Remote side of the me3 publishing flow.
//!
//! - [ContentPublisher] uploads an assembled site to the content store with retries.
//! - [KeyManager] looks up or creates the signing key of a subdomain.
//! - [NameUpdater] points the subdomain's name at a content identifier.

mod cid;
mod content_publisher;
mod content_store;
mod key_manager;
mod kubo;
mod name_service;
mod name_updater;
mod retry;
mod web3_storage;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use cid::{Cid, CidError};
pub use content_publisher::{ContentPublisher, PublishError};
pub use content_store::{ContentStore, UploadError, UploadOptions};
pub use key_manager::{KeyCache, KeyManager, KeyStoreError, SigningKey};
pub use kubo::{format_lifetime, KuboClient, DEFAULT_KUBO_ENDPOINT, DEFAULT_KUBO_TIMEOUT};
pub use name_service::{
    KeyInfo, KeyType, NamePublishOptions, NameService, NameServiceError, PublishedName,
};
pub use name_updater::{NameRecord, NameUpdater, PublishNameError};
pub use retry::RetrySettings;
pub use web3_storage::{Web3StorageClient, DEFAULT_UPLOAD_TIMEOUT};
