//!
//! Client for the Kubo (go-ipfs) RPC API.
//!
//! Every command is a `POST /api/v0/<command>` with its arguments in the query string.
//!

use std::time::Duration;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize};
use url::Url;

use crate::{KeyInfo, KeyType, NamePublishOptions, NameService, NameServiceError, PublishedName};

/// Default RPC endpoint of a local Kubo node.
pub const DEFAULT_KUBO_ENDPOINT: &str = "http://127.0.0.1:5001";

/// Upper bound of a single RPC call, key generation included.
pub const DEFAULT_KUBO_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Deserialize)]
struct KeyListResponse {
    #[serde(rename = "Keys", default)]
    keys: Option<Vec<KeyInfo>>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    #[serde(rename = "Message")]
    message: String,
}

/// Render a lifetime the way Go's `time.ParseDuration` reads it: `24h`, `90m`, `45s`.
///
/// Durations with a fractional second fall back to the largest exact unit, `1500ms`.
pub fn format_lifetime(lifetime: Duration) -> String {
    let nanos = lifetime.subsec_nanos();
    if nanos != 0 {
        return if nanos % 1_000_000 == 0 {
            format!("{}ms", lifetime.as_millis())
        } else if nanos % 1_000 == 0 {
            format!("{}us", lifetime.as_micros())
        } else {
            format!("{}ns", lifetime.as_nanos())
        };
    }

    let secs = lifetime.as_secs();
    if secs == 0 {
        "0s".to_string()
    } else if secs % 3600 == 0 {
        format!("{}h", secs / 3600)
    } else if secs % 60 == 0 {
        format!("{}m", secs / 60)
    } else {
        format!("{secs}s")
    }
}

#[derive(Debug, Clone)]
pub struct KuboClient {
    http: reqwest::Client,
    endpoint: Url,
}

impl KuboClient {
    pub fn new(endpoint: Url) -> Result<Self, reqwest::Error> {
        Self::new_with_timeout(endpoint, DEFAULT_KUBO_TIMEOUT)
    }

    /// Calls that take longer than `timeout` fail with [NameServiceError::Transport].
    pub fn new_with_timeout(endpoint: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::new_with_client(http, endpoint))
    }

    pub fn new_with_client(http: reqwest::Client, endpoint: Url) -> Self {
        Self { http, endpoint }
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn command_url(&self, command: &str, args: &[(&str, &str)]) -> Result<Url, NameServiceError> {
        let mut url = self.endpoint.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                NameServiceError::InvalidResponse(format!(
                    "endpoint {} can't take a path",
                    self.endpoint
                ))
            })?;
            segments.pop_if_empty().push("api").push("v0");
            for segment in command.split('/') {
                segments.push(segment);
            }
        }
        if !args.is_empty() {
            let mut query = url.query_pairs_mut();
            for (key, value) in args {
                query.append_pair(key, value);
            }
        }
        Ok(url)
    }

    async fn rpc<T: DeserializeOwned>(
        &self,
        command: &str,
        args: &[(&str, &str)],
    ) -> Result<T, NameServiceError> {
        let url = self.command_url(command, args)?;
        tracing::trace!(%url, "Kubo RPC");
        let response = self.http.post(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.message)
                .unwrap_or(body);
            return Err(NameServiceError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body)
            .map_err(|e| NameServiceError::InvalidResponse(format!("{command}: {e}")))
    }
}

#[async_trait]
impl NameService for KuboClient {
    async fn list_keys(&self) -> Result<Vec<KeyInfo>, NameServiceError> {
        let response: KeyListResponse = self.rpc("key/list", &[]).await?;
        Ok(response.keys.unwrap_or_default())
    }

    async fn generate_key(
        &self,
        name: &str,
        key_type: KeyType,
    ) -> Result<KeyInfo, NameServiceError> {
        self.rpc("key/gen", &[("arg", name), ("type", key_type.as_str())])
            .await
    }

    async fn publish(
        &self,
        path: &str,
        options: &NamePublishOptions,
    ) -> Result<PublishedName, NameServiceError> {
        let lifetime = format_lifetime(options.lifetime);
        self.rpc(
            "name/publish",
            &[
                ("arg", path),
                ("key", options.key.as_str()),
                ("lifetime", lifetime.as_str()),
            ],
        )
        .await
    }
}
