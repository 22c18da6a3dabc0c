pub(crate) mod deploy;
pub(crate) mod ipns_update;

use axum::http::StatusCode;

use crate::shared::HttpError;

/// CORS preflight. The headers come from the CORS layer.
pub(crate) async fn preflight() -> (StatusCode, &'static str) {
    (StatusCode::OK, "preflight")
}

pub(crate) async fn not_found() -> HttpError {
    HttpError::not_found()
}
