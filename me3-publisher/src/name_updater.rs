use std::{sync::Arc, time::Duration};

use crate::{Cid, NamePublishOptions, NameService, NameServiceError, SigningKey};

/// A signed, mutable name record as published.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameRecord {
    /// The key-derived name the record resolves under.
    pub name: String,
    pub value: Cid,
    pub lifetime: Duration,
}

#[derive(thiserror::Error, Debug)]
#[error("Failed to publish name record: {0}")]
pub struct PublishNameError(#[source] pub NameServiceError);

/// Points the name of a [SigningKey] at a content identifier.
#[derive(Clone)]
pub struct NameUpdater {
    service: Arc<dyn NameService>,
}

impl std::fmt::Debug for NameUpdater {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NameUpdater").finish_non_exhaustive()
    }
}

impl NameUpdater {
    pub fn new(service: Arc<dyn NameService>) -> Self {
        Self { service }
    }

    /// Publish a record `name(key) -> /ipfs/<cid>`, superseding the previous one.
    pub async fn publish_name(
        &self,
        cid: &Cid,
        key: &SigningKey,
        lifetime: Duration,
    ) -> Result<NameRecord, PublishNameError> {
        let options = NamePublishOptions {
            key: key.name.clone(),
            lifetime,
        };
        let published = self
            .service
            .publish(&cid.ipfs_path(), &options)
            .await
            .map_err(PublishNameError)?;

        tracing::info!(
            "Published {} -> {} for {}",
            published.name,
            published.value,
            key.name
        );
        Ok(NameRecord {
            name: published.name,
            value: cid.clone(),
            lifetime,
        })
    }
}
