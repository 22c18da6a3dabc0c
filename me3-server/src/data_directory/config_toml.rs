//! Configuration file of the server.
//!
//! All default values live exclusively in `config.default.toml`.
//! This module embeds that file at compile-time and lets callers
//! layer their own TOML on top.

use std::{
    collections::BTreeMap,
    fs,
    net::SocketAddr,
    path::{Path, PathBuf},
    str::FromStr,
    time::Duration,
};

use me3_publisher::RetrySettings;
use serde::{Deserialize, Serialize};
use url::Url;

use super::{
    log_level::{LogLevel, TargetLevel},
    toml_merge,
};
use crate::constants::{CONTENT_STORE_TOKEN_ENV, INCOMING_API_KEY_ENV};

/// Embedded copy of the default configuration.
pub const DEFAULT_CONFIG: &str = include_str!("config.default.toml");

/// Incoming API key of [ConfigToml::test].
pub const TEST_INCOMING_API_KEY: &str = "me3-test-key";

/// Error that can occur when reading a configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigReadError {
    /// The file did not exist or could not be read.
    #[error("config file not found: {0}")]
    ConfigFileNotFound(#[from] std::io::Error),
    /// The TOML was syntactically invalid.
    #[error("config file is not valid TOML: {0}")]
    ConfigFileNotValid(#[from] toml::de::Error),
    /// Failed to merge defaults with overrides.
    #[error("failed to merge embedded and user TOML: {0}")]
    ConfigMergeError(String),
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct GeneralToml {
    pub parent_domain: String,
    pub template_dir: PathBuf,
    pub dynamic_file_pattern: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct HttpToml {
    pub listen_socket: SocketAddr,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ContentStoreToml {
    pub endpoint: Url,
    pub api_token: Option<String>,
    pub max_retries: u8,
    pub initial_retry_delay_ms: u64,
    pub max_retry_delay_ms: u64,
    pub request_timeout_s: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct NameServiceToml {
    pub endpoint: Url,
    pub record_lifetime_s: u64,
    pub incoming_api_key: Option<String>,
    pub request_timeout_s: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct LoggingToml {
    pub level: LogLevel,
    #[serde(default)]
    pub module_levels: Vec<TargetLevel>,
}

/// The overall server configuration.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ConfigToml {
    /// Naming and template lookup.
    pub general: GeneralToml,
    /// Deploy request version to template directory name.
    pub templates: BTreeMap<String, String>,
    pub http: HttpToml,
    /// Where assembled sites are uploaded to.
    pub content_store: ContentStoreToml,
    /// Key store and name records.
    pub name_service: NameServiceToml,
    /// Log output. Nothing is logged when absent.
    pub logging: Option<LoggingToml>,
}

impl Default for ConfigToml {
    fn default() -> Self {
        ConfigToml::from_str(DEFAULT_CONFIG).expect("Embedded config.default.toml must be valid")
    }
}

impl ConfigToml {
    /// Read and parse a configuration file, overlaying it on top of the embedded defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigReadError> {
        let raw = fs::read_to_string(path)?;
        Self::from_str_with_defaults(&raw)
    }

    /// Parse a raw TOML string, overlaying it on top of the embedded defaults.
    pub fn from_str_with_defaults(raw: &str) -> Result<Self, ConfigReadError> {
        let default_val: toml::Value = DEFAULT_CONFIG
            .parse()
            .expect("embedded defaults invalid TOML");
        let user_val: toml::Value = raw.parse()?;

        let merged_val = toml_merge::merge(default_val, user_val)
            .map_err(|e| ConfigReadError::ConfigMergeError(e.to_string()))?;

        Ok(merged_val.try_into()?)
    }

    /// The embedded default config with every value commented out.
    pub fn default_string() -> String {
        DEFAULT_CONFIG
            .lines()
            .map(|line| {
                let trimmed = line.trim_start();
                let is_comment = trimmed.starts_with('#');
                let is_section = trimmed.starts_with('[') && !trimmed.contains('=');
                if !is_comment && !is_section && !trimmed.is_empty() {
                    format!("# {}", line)
                } else {
                    line.to_string()
                }
            })
            .collect::<Vec<String>>()
            .join("\n")
    }

    /// Secrets from the environment take precedence over the file.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(token) = non_empty_env(CONTENT_STORE_TOKEN_ENV) {
            self.content_store.api_token = Some(token);
        }
        if let Some(key) = non_empty_env(INCOMING_API_KEY_ENV) {
            self.name_service.incoming_api_key = Some(key);
        }
        self
    }

    /// Template root, relative paths are resolved against `base`.
    pub fn template_root(&self, base: &Path) -> PathBuf {
        if self.general.template_dir.is_absolute() {
            self.general.template_dir.clone()
        } else {
            base.join(&self.general.template_dir)
        }
    }

    pub fn record_lifetime(&self) -> Duration {
        Duration::from_secs(self.name_service.record_lifetime_s)
    }

    pub fn upload_timeout(&self) -> Duration {
        Duration::from_secs(self.content_store.request_timeout_s)
    }

    pub fn name_service_timeout(&self) -> Duration {
        Duration::from_secs(self.name_service.request_timeout_s)
    }

    pub fn retry_settings(&self) -> RetrySettings {
        let mut settings = RetrySettings::new();
        settings
            .max_retries(self.content_store.max_retries)
            .initial_retry_delay(Duration::from_millis(
                self.content_store.initial_retry_delay_ms,
            ))
            .max_retry_delay(Duration::from_millis(self.content_store.max_retry_delay_ms));
        settings
    }

    /// Returns a default config tuned for tests.
    ///
    /// Ephemeral port, bundled templates, fast retries and [TEST_INCOMING_API_KEY]
    /// as the name update credential.
    pub fn test() -> Self {
        let mut config = Self::default();
        config.http.listen_socket = SocketAddr::from(([127, 0, 0, 1], 0));
        config.general.template_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("templates");
        config.content_store.initial_retry_delay_ms = 1;
        config.content_store.max_retry_delay_ms = 5;
        config.content_store.api_token = None;
        config.name_service.incoming_api_key = Some(TEST_INCOMING_API_KEY.to_string());
        config.logging = None;
        config
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

impl FromStr for ConfigToml {
    type Err = toml::de::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        toml::from_str(s)
    }
}

#[cfg(test)]
mod tests {
    use std::net::{Ipv4Addr, SocketAddrV4};

    use super::*;

    #[test]
    fn test_default_config() {
        let c = ConfigToml::default();
        assert_eq!(c.general.parent_domain, "ethonline2021char.eth");
        assert_eq!(c.general.template_dir, PathBuf::from("templates"));
        assert_eq!(
            c.general.dynamic_file_pattern,
            me3_common::constants::DEFAULT_DYNAMIC_FILE_PATTERN
        );
        assert_eq!(c.templates.get("1.0").map(String::as_str), Some("onchain"));
        assert_eq!(c.templates.get("2.0").map(String::as_str), Some("allinone"));
        assert_eq!(
            c.http.listen_socket,
            SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::new(127, 0, 0, 1), 8888))
        );
        assert_eq!(c.content_store.endpoint.as_str(), "https://api.web3.storage/");
        assert_eq!(c.content_store.api_token, None);
        assert_eq!(c.content_store.max_retries, 2);
        assert_eq!(c.name_service.endpoint.as_str(), "http://127.0.0.1:5001/");
        assert_eq!(c.record_lifetime(), Duration::from_secs(24 * 3600));
        assert_eq!(c.name_service.incoming_api_key, None);
        assert_eq!(c.upload_timeout(), Duration::from_secs(300));
        assert_eq!(c.name_service_timeout(), Duration::from_secs(60));
        assert!(c.logging.is_some());
    }

    #[test]
    fn test_default_string_commented_out() {
        // A fully commented out file must still be equal to the defaults.
        let s = ConfigToml::default_string();
        let parsed = ConfigToml::from_str_with_defaults(&s).expect("Should be valid config file");
        assert_eq!(parsed, ConfigToml::default());
    }

    #[test]
    fn test_partial_config() {
        let s = "[general]\nparent_domain = \"me3.eth\"\n\n[templates]\n\"3.0\" = \"minimal\"\n";
        let parsed = ConfigToml::from_str_with_defaults(s).unwrap();
        assert_eq!(parsed.general.parent_domain, "me3.eth");
        assert_eq!(parsed.general.template_dir, PathBuf::from("templates"));
        assert_eq!(parsed.templates.len(), 3);
        assert_eq!(parsed.http, ConfigToml::default().http);
    }

    #[test]
    fn test_invalid_value() {
        let s = "[http]\nlisten_socket = \"not a socket\"\n";
        assert!(matches!(
            ConfigToml::from_str_with_defaults(s),
            Err(ConfigReadError::ConfigFileNotValid(_))
        ));

        let s = "[name_service]\nrecord_lifetime_s = \"forever\"\n";
        assert!(matches!(
            ConfigToml::from_str_with_defaults(s),
            Err(ConfigReadError::ConfigMergeError(_))
        ));
    }

    #[test]
    fn test_env_overrides() {
        temp_env::with_vars(
            [
                (CONTENT_STORE_TOKEN_ENV, Some("store-token")),
                (INCOMING_API_KEY_ENV, Some("")),
            ],
            || {
                let c = ConfigToml::from_str_with_defaults(
                    "[name_service]\nincoming_api_key = \"from-file\"\n",
                )
                .unwrap()
                .with_env_overrides();
                assert_eq!(c.content_store.api_token.as_deref(), Some("store-token"));
                // Empty variables don't override.
                assert_eq!(c.name_service.incoming_api_key.as_deref(), Some("from-file"));
            },
        );
    }

    #[test]
    fn test_template_root() {
        let mut c = ConfigToml::default();
        assert_eq!(
            c.template_root(Path::new("/data")),
            PathBuf::from("/data/templates")
        );
        c.general.template_dir = PathBuf::from("/srv/templates");
        assert_eq!(
            c.template_root(Path::new("/data")),
            PathBuf::from("/srv/templates")
        );
    }

    #[test]
    fn test_retry_settings() {
        let c = ConfigToml::default();
        let settings = c.retry_settings();
        assert_eq!(settings.get_max_retries(), 2);
    }
}
