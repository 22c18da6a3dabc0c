//!
//! Initialize tracing logs from the `[logging]` section of the config file.
//!
//! Runs before the server starts so config loading problems are logged too.
//! `RUST_LOG` takes precedence over the config file.
//!

use std::path::Path;

use tracing_subscriber::EnvFilter;

use crate::{ConfigToml, DataDir, LoggingToml};

fn env_filter(logging: &LoggingToml) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let mut filter = EnvFilter::new("");
        filter = filter.add_directive(logging.level.clone().into());
        for directive in &logging.module_levels {
            filter = filter.add_directive(directive.clone().into());
        }
        filter
    })
}

/// Initialize the tracing subscriber if the config has a `[logging]` section.
pub fn init_tracing_logs_with_config_if_set(config: &ConfigToml) -> anyhow::Result<()> {
    let Some(logging) = &config.logging else {
        return Ok(());
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter(logging))
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {}", e))?;
    Ok(())
}

/// Same as [init_tracing_logs_with_config_if_set], reading the config from `data_dir`.
/// Falls back to the defaults if the file can't be read.
pub fn init_tracing_logs_if_set(data_dir: &Path) -> anyhow::Result<()> {
    let config_path = DataDir::new(data_dir.to_path_buf()).get_config_file_path();
    let config = match ConfigToml::from_file(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to read config from {}: {}", config_path.display(), e);
            ConfigToml::default()
        }
    };

    init_tracing_logs_with_config_if_set(&config)
}
