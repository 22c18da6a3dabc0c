//! Fan-in of materialized template files.

use crate::{PendingFile, TemplateError, TemplateFile};

/// Error returned when a template file could not be assembled into the site.
#[derive(thiserror::Error, Debug)]
pub enum AssemblyError {
    /// Materializing the file failed.
    #[error("Failed to assemble {name}: {source}")]
    File {
        name: String,
        #[source]
        source: TemplateError,
    },
    /// The materialization task panicked or was cancelled.
    #[error("Materialization of {name} was interrupted: {source}")]
    Interrupted {
        name: String,
        #[source]
        source: tokio::task::JoinError,
    },
}

impl AssemblyError {
    /// Name of the file that failed.
    pub fn file_name(&self) -> &str {
        match self {
            AssemblyError::File { name, .. } | AssemblyError::Interrupted { name, .. } => name,
        }
    }
}

/// The final, uploadable file set of a site.
///
/// Holds exactly one entry per template file, in template order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssembledSite {
    files: Vec<TemplateFile>,
}

impl AssembledSite {
    /// Build a site from already resolved files.
    pub fn from_files(files: Vec<TemplateFile>) -> Self {
        Self { files }
    }

    pub fn files(&self) -> &[TemplateFile] {
        &self.files
    }

    pub fn names(&self) -> Vec<&str> {
        self.files.iter().map(TemplateFile::name).collect()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Sum of all file sizes in bytes.
    pub fn total_size(&self) -> u64 {
        self.files.iter().map(TemplateFile::size).sum()
    }

    pub fn into_files(self) -> Vec<TemplateFile> {
        self.files
    }
}

/// Await every pending file and collect them in input order.
///
/// Fails on the first file (in input order) that could not be materialized.
/// Files still in flight at that point are aborted, nothing is dropped silently.
pub async fn assemble(pending: Vec<PendingFile>) -> Result<AssembledSite, AssemblyError> {
    let mut files = Vec::with_capacity(pending.len());
    let mut pending = pending.into_iter();

    while let Some(next) = pending.next() {
        match next.resolve().await {
            Ok(file) => files.push(file),
            Err(error) => {
                for rest in pending {
                    rest.abort();
                }
                tracing::debug!(file = error.file_name(), "Site assembly failed");
                return Err(error);
            }
        }
    }

    Ok(AssembledSite { files })
}
