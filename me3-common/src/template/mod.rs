mod error;
mod file;
mod materializer;
mod replace;
mod source;

pub use error::TemplateError;
pub use file::{FileContent, TemplateFile};
pub use materializer::{materialize_file, Materializer, PendingFile};
pub use replace::{replace_all, ReplaceChain};
pub use source::read_template_dir;
