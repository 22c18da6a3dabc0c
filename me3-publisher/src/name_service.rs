use std::{fmt::Display, time::Duration};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A key known to the name service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyInfo {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Id")]
    pub id: String,
}

/// Signing key algorithm. Only ed25519 keys back names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyType {
    #[default]
    Ed25519,
}

impl KeyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyType::Ed25519 => "ed25519",
        }
    }
}

impl Display for KeyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamePublishOptions {
    /// Name of the key to sign the record with.
    pub key: String,
    /// How long the record stays valid.
    pub lifetime: Duration,
}

/// What the name service answered to a publish.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishedName {
    /// The key-derived name the record resolves under.
    #[serde(rename = "Name")]
    pub name: String,
    /// The path the record points to.
    #[serde(rename = "Value")]
    pub value: String,
}

#[derive(thiserror::Error, Debug)]
pub enum NameServiceError {
    #[error("Name service request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Name service responded with {status}: {message}")]
    Status { status: u16, message: String },
    #[error("Invalid name service response: {0}")]
    InvalidResponse(String),
}

/// Key store and name publishing of an IPNS capable node.
#[async_trait]
pub trait NameService: Send + Sync {
    /// All keys in the node's key store.
    async fn list_keys(&self) -> Result<Vec<KeyInfo>, NameServiceError>;

    /// Create a new key called `name`.
    async fn generate_key(&self, name: &str, key_type: KeyType)
        -> Result<KeyInfo, NameServiceError>;

    /// Publish a record pointing at `path`, superseding any previous record of the key.
    async fn publish(
        &self,
        path: &str,
        options: &NamePublishOptions,
    ) -> Result<PublishedName, NameServiceError>;
}
