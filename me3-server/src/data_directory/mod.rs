mod bundled_templates;
mod config_toml;
mod data_dir;
mod log_level;
mod toml_merge;

pub use bundled_templates::{install_bundled_templates, BUNDLED_TEMPLATES};
pub use config_toml::{
    ConfigReadError, ConfigToml, ContentStoreToml, GeneralToml, HttpToml, LoggingToml,
    NameServiceToml, DEFAULT_CONFIG, TEST_INCOMING_API_KEY,
};
pub use data_dir::DataDir;
pub use log_level::{LogDirectiveError, LogLevel, TargetLevel};
