//! Subdomain label normalization.
//!
//! User input is first reduced to ASCII letters and digits and only then handed
//! to the UTS #46 ToASCII transform (non-transitional, STD3 rules), so the IDN
//! step never sees punctuation.

use std::fmt::Display;

/// Error returned when a string cannot be turned into a [SubdomainLabel].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LabelError {
    /// Nothing was left after removing disallowed characters.
    #[error("Invalid label: `{raw}` contains no letters or digits")]
    Empty { raw: String },
    /// The IDN transform refused the remaining code points.
    #[error("Invalid label: `{raw}` is not a valid internationalized domain name")]
    Rejected { raw: String },
}

/// A normalized, ASCII-only subdomain identifier.
///
/// Used as the key store name and as the left-most part of the published name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubdomainLabel(String);

impl SubdomainLabel {
    /// Strip everything outside `[a-zA-Z0-9]` and IDN-encode the rest.
    ///
    /// `My.Site` becomes `mysite`.
    pub fn sanitize(raw: &str) -> Result<Self, LabelError> {
        let stripped: String = raw.chars().filter(char::is_ascii_alphanumeric).collect();
        if stripped.is_empty() {
            return Err(LabelError::Empty {
                raw: raw.to_string(),
            });
        }
        to_ascii(&stripped, raw).map(Self)
    }

    /// IDN-encode an already qualified domain such as `wee.me3.eth`, keeping its dots.
    ///
    /// Unlike [SubdomainLabel::sanitize] nothing is stripped; code points the
    /// transform does not accept make the whole name invalid.
    pub fn from_domain(raw: &str) -> Result<Self, LabelError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(LabelError::Empty {
                raw: raw.to_string(),
            });
        }
        to_ascii(trimmed, raw).map(Self)
    }

    /// The label as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Append a parent domain: `mysite` + `ethonline2021char.eth`.
    pub fn qualify(&self, parent_domain: &str) -> String {
        let parent = parent_domain.trim_matches('.');
        if parent.is_empty() {
            return self.0.clone();
        }
        format!("{}.{}", self.0, parent)
    }
}

fn to_ascii(input: &str, raw: &str) -> Result<String, LabelError> {
    idna::domain_to_ascii_strict(input).map_err(|_| LabelError::Rejected {
        raw: raw.to_string(),
    })
}

impl Display for SubdomainLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for SubdomainLabel {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<SubdomainLabel> for String {
    fn from(value: SubdomainLabel) -> Self {
        value.0
    }
}
