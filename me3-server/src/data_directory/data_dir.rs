use std::{
    io::Write,
    path::{Path, PathBuf},
};

use super::{ConfigReadError, ConfigToml};

/// The data directory of the server.
///
/// Holds `config.toml` and, unless configured otherwise, the `templates` directory.
/// A leading `~/` is expanded to the home directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataDir {
    expanded_path: PathBuf,
}

impl DataDir {
    pub fn new(path: PathBuf) -> Self {
        Self {
            expanded_path: Self::expand_home_dir(path),
        }
    }

    fn expand_home_dir(path: PathBuf) -> PathBuf {
        let Some(raw) = path.to_str() else {
            // Not valid utf-8, can't be expanded.
            return path;
        };
        if let Some(without_home) = raw.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(without_home);
            }
        }
        path
    }

    pub fn path(&self) -> &Path {
        &self.expanded_path
    }

    /// Create the directory if it doesn't exist yet.
    pub fn ensure_data_dir_exists(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.expanded_path)
    }

    pub fn get_config_file_path(&self) -> PathBuf {
        self.expanded_path.join("config.toml")
    }

    /// Read `config.toml`, writing the commented default first if it doesn't exist.
    ///
    /// Environment overrides are applied to the result.
    pub fn read_or_create_config_file(&self) -> Result<ConfigToml, ConfigReadError> {
        let config_file_path = self.get_config_file_path();
        if !config_file_path.exists() {
            self.write_default_config_file()?;
            tracing::info!("Wrote default config to {}", config_file_path.display());
        }
        let config = ConfigToml::from_file(config_file_path)?;
        Ok(config.with_env_overrides())
    }

    fn write_default_config_file(&self) -> std::io::Result<()> {
        let mut config_file = std::fs::File::create(self.get_config_file_path())?;
        config_file.write_all(ConfigToml::default_string().as_bytes())?;
        Ok(())
    }
}

impl Default for DataDir {
    fn default() -> Self {
        Self::new(PathBuf::from("~/.me3"))
    }
}
