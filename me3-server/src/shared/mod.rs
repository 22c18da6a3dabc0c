mod http_error;

pub(crate) use http_error::HttpResult;
pub use http_error::{ErrorKind, HttpError};
