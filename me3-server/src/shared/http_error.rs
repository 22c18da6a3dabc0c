//! Server error
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use me3_common::{AssemblyError, LabelError, TemplateError};
use me3_publisher::{CidError, KeyStoreError, PublishError, PublishNameError};
use serde::Serialize;

pub(crate) type HttpResult<T, E = HttpError> = core::result::Result<T, E>;

/// Failure classes a request can end in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    BadRequest,
    InvalidLabel,
    Unauthorized,
    NotFound,
    TemplateRead,
    Assembly,
    Publish,
    KeyStore,
    PublishName,
}

impl ErrorKind {
    pub fn status(&self) -> StatusCode {
        match self {
            ErrorKind::BadRequest | ErrorKind::InvalidLabel => StatusCode::BAD_REQUEST,
            ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::TemplateRead | ErrorKind::Assembly => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorKind::Publish | ErrorKind::KeyStore | ErrorKind::PublishName => {
                StatusCode::BAD_GATEWAY
            }
        }
    }

    /// Value of the `type` field in the response body.
    pub fn type_name(&self) -> &'static str {
        match self {
            ErrorKind::BadRequest | ErrorKind::InvalidLabel => "BadRequest",
            ErrorKind::Unauthorized => "Unauthorized",
            ErrorKind::NotFound => "NotFound",
            ErrorKind::TemplateRead | ErrorKind::Assembly => "InternalServerError",
            ErrorKind::Publish | ErrorKind::KeyStore | ErrorKind::PublishName => "BadGateway",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpError {
    kind: ErrorKind,
    message: String,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    message: &'a str,
    #[serde(rename = "type")]
    kind: &'a str,
}

impl HttpError {
    pub fn new(kind: ErrorKind, message: impl ToString) -> HttpError {
        Self {
            kind,
            message: message.to_string(),
        }
    }

    pub fn bad_request(message: impl ToString) -> HttpError {
        Self::new(ErrorKind::BadRequest, message)
    }

    pub fn unauthorized(message: impl ToString) -> HttpError {
        Self::new(ErrorKind::Unauthorized, message)
    }

    pub fn not_found() -> HttpError {
        Self::new(ErrorKind::NotFound, "Route not found")
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn status(&self) -> StatusCode {
        self.kind.status()
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            message: &self.message,
            kind: self.kind.type_name(),
        };
        (self.kind.status(), Json(body)).into_response()
    }
}

// === BAD_REQUEST ===

impl From<serde_json::Error> for HttpError {
    fn from(error: serde_json::Error) -> Self {
        Self::bad_request(format!("Invalid JSON body: {error}"))
    }
}

impl From<CidError> for HttpError {
    fn from(error: CidError) -> Self {
        Self::bad_request(error)
    }
}

impl From<LabelError> for HttpError {
    fn from(error: LabelError) -> Self {
        Self::new(ErrorKind::InvalidLabel, error)
    }
}

// === INTERNAL_SERVER_ERROR / BAD_GATEWAY ===
// Logged here so handlers can just use `?`.

impl From<TemplateError> for HttpError {
    fn from(error: TemplateError) -> Self {
        tracing::error!(?error);
        Self::new(ErrorKind::TemplateRead, error)
    }
}

impl From<AssemblyError> for HttpError {
    fn from(error: AssemblyError) -> Self {
        tracing::error!(?error);
        Self::new(ErrorKind::Assembly, error)
    }
}

impl From<PublishError> for HttpError {
    fn from(error: PublishError) -> Self {
        tracing::error!(?error);
        Self::new(ErrorKind::Publish, error)
    }
}

impl From<KeyStoreError> for HttpError {
    fn from(error: KeyStoreError) -> Self {
        tracing::error!(?error);
        Self::new(ErrorKind::KeyStore, error)
    }
}

impl From<PublishNameError> for HttpError {
    fn from(error: PublishNameError) -> Self {
        tracing::error!(?error);
        Self::new(ErrorKind::PublishName, error)
    }
}
