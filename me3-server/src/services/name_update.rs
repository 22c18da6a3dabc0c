use std::time::Duration;

use me3_common::{LabelError, SubdomainLabel};
use me3_publisher::{Cid, KeyManager, KeyStoreError, NameRecord, NameUpdater, PublishNameError};

use crate::shared::HttpError;

#[derive(thiserror::Error, Debug)]
pub enum NameUpdateError {
    #[error(transparent)]
    Label(#[from] LabelError),
    #[error(transparent)]
    KeyStore(#[from] KeyStoreError),
    #[error(transparent)]
    PublishName(#[from] PublishNameError),
}

impl From<NameUpdateError> for HttpError {
    fn from(error: NameUpdateError) -> Self {
        match error {
            NameUpdateError::Label(e) => e.into(),
            NameUpdateError::KeyStore(e) => e.into(),
            NameUpdateError::PublishName(e) => e.into(),
        }
    }
}

/// Points a subdomain's name at new content, creating its key on first use.
#[derive(Debug, Clone)]
pub struct NameUpdateService {
    keys: KeyManager,
    updater: NameUpdater,
    lifetime: Duration,
}

impl NameUpdateService {
    pub fn new(keys: KeyManager, updater: NameUpdater, lifetime: Duration) -> Self {
        Self {
            keys,
            updater,
            lifetime,
        }
    }

    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    /// `subdomain` is a full domain such as `wee.me3.eth`. It names the key.
    pub async fn update(&self, subdomain: &str, cid: &Cid) -> Result<NameRecord, NameUpdateError> {
        let label = SubdomainLabel::from_domain(subdomain)?;
        let key = self.keys.key_for(&label).await?;
        Ok(self.updater.publish_name(cid, &key, self.lifetime).await?)
    }
}
