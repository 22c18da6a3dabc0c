//!
//! The application context shared between all components.
//! Think of it as a simple Dependency Injection container.
//!
//! Create with a `DataDir` instance: `AppContext::read_from(data_dir)`
//!

use std::{path::PathBuf, sync::Arc};

use me3_publisher::{
    ContentPublisher, ContentStore, KeyCache, KeyManager, KuboClient, NameService, NameUpdater,
    Web3StorageClient,
};
use regex::Regex;

use crate::{
    services::{NameUpdateService, SiteDeployer},
    install_bundled_templates, ConfigReadError, ConfigToml, DataDir,
};

/// Errors that can occur when converting a `DataDir` to an `AppContext`.
#[derive(Debug, thiserror::Error)]
pub enum AppContextConversionError {
    /// Failed to create the data directory.
    #[error("Failed to create data directory: {0}")]
    DataDir(std::io::Error),
    /// Failed to read or create config file.
    #[error("Failed to read or create config file: {0}")]
    Config(ConfigReadError),
    /// Failed to write the bundled templates into the data directory.
    #[error("Failed to install bundled templates: {0}")]
    Templates(std::io::Error),
    /// The dynamic file pattern is not a valid regex.
    #[error("Invalid dynamic file pattern: {0}")]
    Pattern(regex::Error),
    /// Failed to build a client of a remote service.
    #[error("Failed to build {service} client: {source}")]
    Client {
        service: &'static str,
        source: anyhow::Error,
    },
}

#[derive(Clone)]
pub struct AppContext {
    pub(crate) config_toml: ConfigToml,
    /// Relative template directories are resolved against this.
    pub(crate) base_path: PathBuf,
    pub(crate) content_store: Arc<dyn ContentStore>,
    pub(crate) name_service: Arc<dyn NameService>,
    /// Process wide label to key cache.
    pub(crate) key_cache: KeyCache,
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("config_toml", &self.config_toml)
            .field("base_path", &self.base_path)
            .finish_non_exhaustive()
    }
}

impl AppContext {
    /// Create a new AppContext from a data directory.
    pub fn read_from(dir: DataDir) -> Result<Self, AppContextConversionError> {
        dir.ensure_data_dir_exists()
            .map_err(AppContextConversionError::DataDir)?;
        let config = dir
            .read_or_create_config_file()
            .map_err(AppContextConversionError::Config)?;
        let template_root = config.template_root(dir.path());
        let installed = install_bundled_templates(&template_root)
            .map_err(AppContextConversionError::Templates)?;
        if installed {
            tracing::info!("Installed bundled templates into {}", template_root.display());
        }
        Self::from_config(config, dir.path().to_path_buf())
    }

    /// Create a new AppContext talking to the services named in `config`.
    pub fn from_config(
        config: ConfigToml,
        base_path: PathBuf,
    ) -> Result<Self, AppContextConversionError> {
        let content_store = Web3StorageClient::new_with_timeout(
            config.content_store.endpoint.clone(),
            config.content_store.api_token.clone(),
            config.upload_timeout(),
        )
        .map_err(|e| AppContextConversionError::Client {
            service: "content store",
            source: e.into(),
        })?;
        let name_service = KuboClient::new_with_timeout(
            config.name_service.endpoint.clone(),
            config.name_service_timeout(),
        )
        .map_err(|e| AppContextConversionError::Client {
            service: "name service",
            source: e.into(),
        })?;
        if config.content_store.api_token.is_none() {
            tracing::warn!("No content store API token configured. Uploads will likely be refused.");
        }
        Ok(Self::from_parts(
            config,
            base_path,
            Arc::new(content_store),
            Arc::new(name_service),
        ))
    }

    /// Create a new AppContext with the given services.
    pub fn from_parts(
        config: ConfigToml,
        base_path: PathBuf,
        content_store: Arc<dyn ContentStore>,
        name_service: Arc<dyn NameService>,
    ) -> Self {
        Self {
            config_toml: config,
            base_path,
            content_store,
            name_service,
            key_cache: KeyCache::new(),
        }
    }

    /// Create a new AppContext backed by in-memory services.
    #[cfg(any(test, feature = "testing"))]
    pub fn test() -> Self {
        Self::from_parts(
            ConfigToml::test(),
            PathBuf::from(env!("CARGO_MANIFEST_DIR")),
            Arc::new(me3_publisher::testing::InMemoryContentStore::new()),
            Arc::new(me3_publisher::testing::InMemoryNameService::new()),
        )
    }

    pub fn config_toml(&self) -> &ConfigToml {
        &self.config_toml
    }

    pub(crate) fn site_deployer(&self) -> Result<SiteDeployer, AppContextConversionError> {
        let pattern = Regex::new(&self.config_toml.general.dynamic_file_pattern)
            .map_err(AppContextConversionError::Pattern)?;
        let publisher = ContentPublisher::new_with_settings(
            self.content_store.clone(),
            self.config_toml.retry_settings(),
        );
        let template_root = self.config_toml.template_root(&self.base_path);
        if !template_root.is_dir() {
            tracing::error!(
                "Template directory {} does not exist. Every deploy will fail.",
                template_root.display()
            );
        }
        Ok(SiteDeployer::new(
            template_root,
            self.config_toml.templates.clone(),
            self.config_toml.general.parent_domain.clone(),
            pattern,
            publisher,
        ))
    }

    pub(crate) fn name_update_service(&self) -> NameUpdateService {
        NameUpdateService::new(
            KeyManager::new(self.name_service.clone(), self.key_cache.clone()),
            NameUpdater::new(self.name_service.clone()),
            self.config_toml.record_lifetime(),
        )
    }
}
