use axum::http::{header::AUTHORIZATION, HeaderMap};
use base64::{engine::general_purpose::STANDARD, Engine};

use crate::shared::{HttpError, HttpResult};

/// Shared secret check of name update callers.
///
/// Callers send `Authorization: Bearer <base64(secret)>`. Without a configured
/// secret no credential matches and every call is refused.
#[derive(Clone, Default)]
pub(crate) struct BearerAuth {
    secret: Option<String>,
}

impl std::fmt::Debug for BearerAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BearerAuth")
            .field("configured", &self.is_configured())
            .finish()
    }
}

impl BearerAuth {
    /// An empty secret counts as none.
    pub fn new(secret: Option<String>) -> Self {
        Self {
            secret: secret.filter(|s| !s.is_empty()),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.secret.is_some()
    }

    pub fn check(&self, headers: &HeaderMap) -> HttpResult<()> {
        let header = headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();
        let mut parts = header.split(' ');
        let scheme = parts.next().unwrap_or_default();
        let token = parts.next().unwrap_or_default();

        if scheme != "Bearer" {
            return Err(HttpError::unauthorized("Unable to authenticate"));
        }
        if token.is_empty() {
            return Err(HttpError::unauthorized("No token provided"));
        }

        let decoded = STANDARD
            .decode(token)
            .ok()
            .and_then(|bytes| String::from_utf8(bytes).ok());
        match (&self.secret, decoded) {
            (Some(secret), Some(decoded)) if *secret == decoded => Ok(()),
            _ => Err(HttpError::unauthorized("Invalid credentials")),
        }
    }
}
