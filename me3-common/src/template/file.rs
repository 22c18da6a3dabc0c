use std::path::{Path, PathBuf};

use bytes::Bytes;
use futures_util::{stream::BoxStream, StreamExt};
use tokio_util::io::ReaderStream;

/// Where a [TemplateFile]'s bytes live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileContent {
    /// Untouched file on disk, streamed when read.
    Path(PathBuf),
    /// Materialized content.
    Bytes(Bytes),
}

/// A single file of a site template.
///
/// Immutable once created. `name` is the path relative to the template root,
/// always `/` separated, and becomes the file's path in the published site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateFile {
    name: String,
    size: u64,
    content: FileContent,
}

impl TemplateFile {
    /// A file backed by `path` on disk.
    pub fn from_path(name: impl Into<String>, path: impl Into<PathBuf>, size: u64) -> Self {
        Self {
            name: name.into(),
            size,
            content: FileContent::Path(path.into()),
        }
    }

    /// A file held in memory.
    pub fn from_bytes(name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        let bytes = bytes.into();
        Self {
            name: name.into(),
            size: bytes.len() as u64,
            content: FileContent::Bytes(bytes),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn content(&self) -> &FileContent {
        &self.content
    }

    /// Path of the backing file, if the content has not been materialized.
    pub fn path(&self) -> Option<&Path> {
        match &self.content {
            FileContent::Path(path) => Some(path),
            FileContent::Bytes(_) => None,
        }
    }

    /// Open the content as a chunked byte stream.
    pub async fn stream(&self) -> std::io::Result<BoxStream<'static, std::io::Result<Bytes>>> {
        match &self.content {
            FileContent::Path(path) => {
                let file = tokio::fs::File::open(path).await?;
                Ok(ReaderStream::new(file).boxed())
            }
            FileContent::Bytes(bytes) => {
                let bytes = bytes.clone();
                Ok(futures_util::stream::once(async move { Ok(bytes) }).boxed())
            }
        }
    }

    /// Read the whole content into memory.
    pub async fn read_all(&self) -> std::io::Result<Bytes> {
        match &self.content {
            FileContent::Path(path) => Ok(Bytes::from(tokio::fs::read(path).await?)),
            FileContent::Bytes(bytes) => Ok(bytes.clone()),
        }
    }
}
