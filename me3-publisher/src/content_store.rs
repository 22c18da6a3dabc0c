use async_trait::async_trait;
use me3_common::AssembledSite;

use crate::Cid;

/// Options passed along with an upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOptions {
    /// Human readable name of the upload, e.g. the subdomain.
    pub name: String,
    /// Wrap the files in an extra directory. Sites are published as-is, so this is `false`.
    pub wrap_with_directory: bool,
}

impl UploadOptions {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            wrap_with_directory: false,
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum UploadError {
    /// The request never got a response.
    #[error("Content store request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// The store answered with a non-success status.
    #[error("Content store responded with {status}: {body}")]
    Status { status: u16, body: String },
    /// A site file could not be opened for upload.
    #[error("Failed to read {name} for upload: {source}")]
    File {
        name: String,
        #[source]
        source: std::io::Error,
    },
    /// The store answered with something we don't understand.
    #[error("Invalid content store response: {0}")]
    InvalidResponse(String),
}

impl UploadError {
    /// Whether trying again might succeed.
    ///
    /// Connection problems, rate limiting and server errors are transient.
    pub fn is_transient(&self) -> bool {
        match self {
            UploadError::Transport(e) => !(e.is_builder() || e.is_decode()),
            UploadError::Status { status, .. } => *status == 429 || *status >= 500,
            UploadError::File { .. } | UploadError::InvalidResponse(_) => false,
        }
    }
}

/// A content-addressed store that turns a file set into a single [Cid].
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Upload every file of `site` in one go.
    async fn upload(&self, site: &AssembledSite, options: &UploadOptions)
        -> Result<Cid, UploadError>;
}
