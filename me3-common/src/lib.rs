//! Types and pure logic shared by the me3 deploy and name-update flows.
//!
//! - [label] turns free-form user input into DNS-safe subdomain labels.
//! - [template] reads a site template and materializes its dynamic files.
//! - [site] resolves materialized files into an uploadable [site::AssembledSite].

#![deny(rustdoc::broken_intra_doc_links)]

pub mod constants;
pub mod label;
pub mod placeholders;
pub mod site;
pub mod template;

pub use label::{LabelError, SubdomainLabel};
pub use placeholders::PlaceholderMap;
pub use site::{assemble, AssembledSite, AssemblyError};
pub use template::{
    read_template_dir, FileContent, Materializer, PendingFile, TemplateError, TemplateFile,
};
