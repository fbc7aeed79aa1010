//! Configuration loading from disk and environment.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::schema::DaemonConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(PathBuf, std::io::Error),
    Parse(toml::de::Error),
    Env { key: &'static str, value: String },
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(path, e) => write!(f, "read {}: {}", path.display(), e),
            ConfigError::Parse(e) => write!(f, "parse error: {}", e.message()),
            ConfigError::Env { key, value } => write!(f, "invalid {}={:?}", key, value),
            ConfigError::Validation(errors) => {
                write!(f, "validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(_, e) => Some(e),
            ConfigError::Parse(e) => Some(e),
            _ => None,
        }
    }
}

/// Load, override and validate configuration.
///
/// Without a path the defaults are used. `engines` is forwarded to
/// [`validate_config`].
pub fn load_config(
    path: Option<&Path>,
    engines: Option<&[&str]>,
) -> Result<DaemonConfig, ConfigError> {
    let mut config = match path {
        Some(path) => parse_file(path)?,
        None => DaemonConfig::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    validate_config(&config, engines).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Parse a TOML file without overrides or validation.
pub fn parse_file(path: &Path) -> Result<DaemonConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
    toml::from_str(&content).map_err(ConfigError::Parse)
}

/// Apply `TSDBD_*` overrides using `lookup` to read variables.
pub fn apply_env_overrides<F>(config: &mut DaemonConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(dir) = lookup("TSDBD_DATA_DIR") {
        config.data.dir = PathBuf::from(dir);
    }
    if let Some(engine) = lookup("TSDBD_DATA_ENGINE") {
        config.data.engine = engine;
    }
    if let Some(addr) = lookup("TSDBD_HTTP_BIND_ADDRESS") {
        config.http.bind_address = addr;
    }
    if let Some(raw) = lookup("TSDBD_SHUTDOWN_TIMEOUT_SECS") {
        config.shutdown.timeout_secs = raw.trim().parse().map_err(|_| ConfigError::Env {
            key: "TSDBD_SHUTDOWN_TIMEOUT_SECS",
            value: raw.clone(),
        })?;
    }
    Ok(())
}
