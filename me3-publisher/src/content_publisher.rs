//!
//! Uploads an assembled site and retries transient failures with an exponential backoff.
//!

use std::sync::Arc;

use me3_common::AssembledSite;

use crate::{Cid, ContentStore, RetrySettings, UploadError, UploadOptions};

#[derive(thiserror::Error, Debug)]
pub enum PublishError {
    /// The store refused the upload. Trying again won't help.
    #[error("Content store rejected the upload: {0}")]
    Rejected(#[source] UploadError),
    /// Every attempt failed with a transient error.
    #[error("Upload failed after {attempts} attempts: {source}")]
    RetriesExhausted {
        attempts: usize,
        #[source]
        source: UploadError,
    },
}

impl PublishError {
    pub fn is_rejected(&self) -> bool {
        matches!(self, PublishError::Rejected(_))
    }

    pub fn is_retries_exhausted(&self) -> bool {
        matches!(self, PublishError::RetriesExhausted { .. })
    }
}

/// Hands assembled sites to a [ContentStore].
#[derive(Clone)]
pub struct ContentPublisher {
    store: Arc<dyn ContentStore>,
    retry_settings: RetrySettings,
}

impl std::fmt::Debug for ContentPublisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentPublisher")
            .field("retry_settings", &self.retry_settings)
            .finish()
    }
}

impl ContentPublisher {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self::new_with_settings(store, RetrySettings::new())
    }

    pub fn new_with_settings(store: Arc<dyn ContentStore>, retry_settings: RetrySettings) -> Self {
        Self {
            store,
            retry_settings,
        }
    }

    /// Upload `site` under `name` without an extra directory layer.
    ///
    /// Transient failures are retried up to `max_retries` times. Whatever
    /// error comes out of here is final for this layer.
    pub async fn publish(&self, site: &AssembledSite, name: &str) -> Result<Cid, PublishError> {
        let options = UploadOptions::new(name);
        let max_retries = self.retry_settings.max_retries;
        let mut retry_count: u8 = 0;

        loop {
            match self.store.upload(site, &options).await {
                Ok(cid) => {
                    tracing::info!("Saved {name} as {cid}");
                    return Ok(cid);
                }
                Err(e) if !e.is_transient() => {
                    tracing::warn!("Upload of {name} rejected: {e}");
                    return Err(PublishError::Rejected(e));
                }
                Err(e) if retry_count >= max_retries => {
                    return Err(PublishError::RetriesExhausted {
                        attempts: retry_count as usize + 1,
                        source: e,
                    });
                }
                Err(e) => {
                    let delay = self.retry_settings.retry_delay(retry_count);
                    retry_count += 1;
                    tracing::debug!(
                        "{retry_count}/{max_retries} Failed to upload {name}: {e}. Sleep for {delay:?} before trying again."
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}
