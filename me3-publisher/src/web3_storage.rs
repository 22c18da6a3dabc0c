//!
//! HTTP client for a web3.storage compatible upload API.
//!
//! `POST /upload` with one multipart `file` part per site file. Files are
//! streamed from wherever they live, untouched files are never buffered.
//!

use std::time::Duration;

use async_trait::async_trait;
use me3_common::AssembledSite;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use reqwest::{
    multipart::{Form, Part},
    Body,
};
use serde::Deserialize;
use url::Url;

use crate::{Cid, ContentStore, UploadError, UploadOptions};

/// Upper bound of a whole upload, body included.
pub const DEFAULT_UPLOAD_TIMEOUT: Duration = Duration::from_secs(300);

#[derive(Debug, Deserialize)]
struct UploadResponse {
    cid: String,
}

#[derive(Debug, Clone)]
pub struct Web3StorageClient {
    http: reqwest::Client,
    endpoint: Url,
    api_token: Option<String>,
}

impl Web3StorageClient {
    pub fn new(endpoint: Url, api_token: Option<String>) -> Result<Self, reqwest::Error> {
        Self::new_with_timeout(endpoint, api_token, DEFAULT_UPLOAD_TIMEOUT)
    }

    /// Uploads that take longer than `timeout` fail with a transient [UploadError::Transport].
    pub fn new_with_timeout(
        endpoint: Url,
        api_token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::new_with_client(http, endpoint, api_token))
    }

    pub fn new_with_client(http: reqwest::Client, endpoint: Url, api_token: Option<String>) -> Self {
        Self {
            http,
            endpoint,
            api_token,
        }
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn upload_url(&self, options: &UploadOptions) -> Result<Url, UploadError> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|_| {
                UploadError::InvalidResponse(format!("endpoint {} can't take a path", self.endpoint))
            })?
            .pop_if_empty()
            .push("upload");
        url.query_pairs_mut().append_pair(
            "wrap-with-directory",
            if options.wrap_with_directory {
                "true"
            } else {
                "false"
            },
        );
        Ok(url)
    }

    async fn build_form(&self, site: &AssembledSite) -> Result<Form, UploadError> {
        let mut form = Form::new();
        for file in site.files() {
            let stream = file.stream().await.map_err(|source| UploadError::File {
                name: file.name().to_string(),
                source,
            })?;
            let part = Part::stream_with_length(Body::wrap_stream(stream), file.size())
                .file_name(file.name().to_string());
            form = form.part("file", part);
        }
        Ok(form)
    }
}

#[async_trait]
impl ContentStore for Web3StorageClient {
    async fn upload(
        &self,
        site: &AssembledSite,
        options: &UploadOptions,
    ) -> Result<Cid, UploadError> {
        let url = self.upload_url(options)?;
        let form = self.build_form(site).await?;

        let mut request = self
            .http
            .post(url)
            .header(
                "X-Name",
                utf8_percent_encode(&options.name, NON_ALPHANUMERIC).to_string(),
            )
            .multipart(form);
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UploadError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body: UploadResponse = response.json().await?;
        body.cid
            .parse()
            .map_err(|e| UploadError::InvalidResponse(format!("{e}")))
    }
}
