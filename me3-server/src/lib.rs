//! HTTP service of the me3 site publisher.
//!
//! - `POST /ipfs-deploy` materializes a template for a subdomain and uploads it.
//! - `POST /ipns-update` points a subdomain's name at uploaded content.
//!
//! Start it with [Me3Server::start] on an [AppContext] read from a [DataDir].

mod app_context;
pub mod constants;
mod data_directory;
mod server;
pub mod services;
mod shared;
pub mod tracing;

pub use app_context::{AppContext, AppContextConversionError};
pub use data_directory::*;
pub use server::{create_router, Me3Server, Me3ServerBuildError};
pub use shared::{ErrorKind, HttpError};
