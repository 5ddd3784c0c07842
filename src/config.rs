use crate::core::db::ConnectParams;
use crate::core::{MysqlError, Result};
use crate::results_grid::ExportFormat;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Top-level configuration structure parsed from a TOML file.
#[derive(Debug, Deserialize)]
pub struct Config {
    pub mysql: ConnectParams,
    pub output: Option<OutputConfig>,
}

/// Output-related configuration.
#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    pub format: Option<String>,
}

impl Config {
    /// Output format, `Text` unless configured otherwise
    pub fn format(&self) -> Result<ExportFormat> {
        match self.output.as_ref().and_then(|o| o.format.as_deref()) {
            Some(name) => name.parse(),
            None => Ok(ExportFormat::Text),
        }
    }
}

/// `<config_dir>/greentea/mysql.toml`, if the platform has a config dir
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("greentea").join("mysql.toml"))
}

/// Loads configuration from a TOML file at the given path.
///
/// # Example
///
/// ```no_run
/// use greentea_mysql::config::load_config;
///
/// let config = load_config("mysql.toml").expect("Failed to load config");
/// println!("{:?}", config.mysql);
/// ```
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path = path.as_ref();
    debug!("Loading configuration from {:?}", path);
    let content = fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    if config.mysql.host.is_empty() {
        return Err(MysqlError::Config("mysql.host must not be empty".to_string()));
    }
    Ok(config)
}
