use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CidError {
    #[error("Content identifier is empty")]
    Empty,
    #[error("Content identifier `{0}` contains invalid characters")]
    InvalidCharacters(String),
}

/// Content identifier returned by the content store.
///
/// Opaque to this crate. Only trimmed of an `/ipfs/` or `ipfs://` prefix and
/// checked to be a single path segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cid(String);

impl Cid {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The content path names are published against: `/ipfs/<cid>`.
    pub fn ipfs_path(&self) -> String {
        format!("/ipfs/{}", self.0)
    }
}

impl FromStr for Cid {
    type Err = CidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let bare = trimmed
            .strip_prefix("/ipfs/")
            .or_else(|| trimmed.strip_prefix("ipfs://"))
            .unwrap_or(trimmed)
            .trim_end_matches('/');

        if bare.is_empty() {
            return Err(CidError::Empty);
        }
        if !bare.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(CidError::InvalidCharacters(s.to_string()));
        }
        Ok(Self(bare.to_string()))
    }
}

impl Display for Cid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
