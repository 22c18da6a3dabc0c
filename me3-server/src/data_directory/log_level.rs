use std::fmt::{self, Display};
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use tracing_subscriber::filter::{Directive, LevelFilter};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LogDirectiveError {
    #[error("invalid log level: {0}")]
    Level(String),
    #[error("invalid module log level, expected `module=level`: {0}")]
    Target(String),
}

/// Global log level, e.g. `info`.
#[derive(Debug, Clone, PartialEq)]
pub struct LogLevel(pub LevelFilter);

impl Default for LogLevel {
    fn default() -> Self {
        LogLevel(LevelFilter::INFO)
    }
}

impl FromStr for LogLevel {
    type Err = LogDirectiveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse()
            .map(Self)
            .map_err(|_| LogDirectiveError::Level(s.to_string()))
    }
}

impl Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<LogLevel> for Directive {
    fn from(val: LogLevel) -> Self {
        val.0.into()
    }
}

/// Log level of a single module, e.g. `me3_server=debug`.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetLevel(pub Directive);

impl FromStr for TargetLevel {
    type Err = LogDirectiveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !s.contains('=') {
            return Err(LogDirectiveError::Target(s.to_string()));
        }
        s.parse()
            .map(Self)
            .map_err(|_| LogDirectiveError::Target(s.to_string()))
    }
}

impl Display for TargetLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<TargetLevel> for Directive {
    fn from(val: TargetLevel) -> Self {
        val.0
    }
}

macro_rules! string_serde {
    ($ty:ty) => {
        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.to_string())
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(de::Error::custom)
            }
        }
    };
}

string_serde!(LogLevel);
string_serde!(TargetLevel);
