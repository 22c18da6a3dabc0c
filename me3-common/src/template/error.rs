use std::path::PathBuf;

/// Errors raised while reading or materializing template files.
#[derive(thiserror::Error, Debug)]
pub enum TemplateError {
    /// The template directory could not be enumerated.
    #[error("Failed to read template {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// A file's stream failed while it was being materialized.
    #[error("Failed to materialize {name}: {source}")]
    Stream {
        name: String,
        #[source]
        source: std::io::Error,
    },
}
