use std::sync::Arc;

use bytes::BytesMut;
use futures_util::StreamExt;
use once_cell::sync::Lazy;
use regex::Regex;
use tokio::task::JoinHandle;

use super::{ReplaceChain, TemplateError, TemplateFile};
use crate::{constants::DEFAULT_DYNAMIC_FILE_PATTERN, AssemblyError, PlaceholderMap};

static DEFAULT_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(DEFAULT_DYNAMIC_FILE_PATTERN).expect("valid built-in pattern"));

/// Substitutes placeholders into the dynamic files of a template.
///
/// Files whose name matches the dynamic pattern are streamed through a
/// [ReplaceChain] on their own task. Every other file is handed back untouched.
#[derive(Debug, Clone)]
pub struct Materializer {
    pattern: Regex,
    placeholders: Arc<PlaceholderMap>,
}

impl Materializer {
    /// Materializer using the bundle script naming convention.
    pub fn new(placeholders: PlaceholderMap) -> Self {
        Self {
            pattern: DEFAULT_PATTERN.clone(),
            placeholders: Arc::new(placeholders),
        }
    }

    /// Use a different dynamic file pattern.
    pub fn with_pattern(mut self, pattern: Regex) -> Self {
        self.pattern = pattern;
        self
    }

    pub fn placeholders(&self) -> &PlaceholderMap {
        &self.placeholders
    }

    /// Whether `name` is eligible for substitution.
    pub fn is_dynamic(&self, name: &str) -> bool {
        self.pattern.is_match(name)
    }

    /// Start materializing every file. Must be called within a tokio runtime.
    ///
    /// The returned list has one entry per input file, in input order. Each
    /// dynamic file runs independently, a failing file does not stop the others.
    pub fn materialize(&self, files: Vec<TemplateFile>) -> Vec<PendingFile> {
        files
            .into_iter()
            .map(|file| {
                if !self.is_dynamic(file.name()) {
                    return PendingFile::ready(file);
                }
                let name = file.name().to_string();
                let placeholders = self.placeholders.clone();
                tracing::debug!(%name, "Materializing dynamic file");
                let handle =
                    tokio::spawn(async move { materialize_file(file, &placeholders).await });
                PendingFile::running(name, handle)
            })
            .collect()
    }
}

/// Stream one file through the replace chain into a new in-memory file of the same name.
///
/// The chain is drained only after the source stream has ended, so the
/// returned file always holds the complete output.
pub async fn materialize_file(
    file: TemplateFile,
    placeholders: &PlaceholderMap,
) -> Result<TemplateFile, TemplateError> {
    let stream_error = |source: std::io::Error| TemplateError::Stream {
        name: file.name().to_string(),
        source,
    };

    let mut reader = file.stream().await.map_err(stream_error)?;
    let mut chain = ReplaceChain::new(placeholders);
    let mut output = BytesMut::with_capacity(file.size() as usize);

    while let Some(chunk) = reader.next().await {
        let chunk = chunk.map_err(stream_error)?;
        output.extend_from_slice(&chain.push(&chunk));
    }
    output.extend_from_slice(&chain.finish());

    Ok(TemplateFile::from_bytes(file.name(), output.freeze()))
}

#[derive(Debug)]
enum PendingState {
    Ready(TemplateFile),
    Running(JoinHandle<Result<TemplateFile, TemplateError>>),
}

/// A file whose materialization may still be in flight.
#[derive(Debug)]
pub struct PendingFile {
    name: String,
    state: PendingState,
}

impl PendingFile {
    fn ready(file: TemplateFile) -> Self {
        Self {
            name: file.name().to_string(),
            state: PendingState::Ready(file),
        }
    }

    fn running(name: String, handle: JoinHandle<Result<TemplateFile, TemplateError>>) -> Self {
        Self {
            name,
            state: PendingState::Running(handle),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the file was passed through without a task.
    pub fn is_ready(&self) -> bool {
        matches!(self.state, PendingState::Ready(_))
    }

    /// Wait for the file to be fully materialized.
    pub async fn resolve(self) -> Result<TemplateFile, AssemblyError> {
        match self.state {
            PendingState::Ready(file) => Ok(file),
            PendingState::Running(handle) => match handle.await {
                Ok(Ok(file)) => Ok(file),
                Ok(Err(source)) => Err(AssemblyError::File {
                    name: self.name,
                    source,
                }),
                Err(source) => Err(AssemblyError::Interrupted {
                    name: self.name,
                    source,
                }),
            },
        }
    }

    /// Stop the materialization task, if any.
    pub fn abort(&self) {
        if let PendingState::Running(handle) = &self.state {
            handle.abort();
        }
    }
}
