use crate::config::schema::{EditorConfig, ValidationError};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = ".blockwright.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config from {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config TOML{}: {source}", origin(.path))]
    Toml {
        path: Option<PathBuf>,
        #[source]
        source: toml_edit::de::Error,
    },

    #[error("invalid config{}: {source}", origin(.path))]
    Validation {
        path: Option<PathBuf>,
        #[source]
        source: ValidationError,
    },
}

fn origin(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|path| format!(" ({})", path.display()))
        .unwrap_or_default()
}

impl ConfigError {
    /// Attach the file a string-level error came from.
    fn in_file(self, file: &Path) -> Self {
        match self {
            ConfigError::Toml { path: None, source } => ConfigError::Toml {
                path: Some(file.to_path_buf()),
                source,
            },
            ConfigError::Validation { path: None, source } => ConfigError::Validation {
                path: Some(file.to_path_buf()),
                source,
            },
            other => other,
        }
    }
}

pub fn load_from_str(input: &str) -> Result<EditorConfig, ConfigError> {
    let config: EditorConfig = toml_edit::de::from_str(input)
        .map_err(|source| ConfigError::Toml { path: None, source })?;
    config
        .validate()
        .map_err(|source| ConfigError::Validation { path: None, source })?;
    Ok(config)
}

pub fn load_from_path(path: impl AsRef<Path>) -> Result<EditorConfig, ConfigError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_from_str(&contents).map_err(|error| error.in_file(path))
}

/// Candidate config files in priority order.
///
/// 1. `<dir>/.blockwright.toml`
/// 2. `$HOME/.config/blockwright/config.toml`
pub fn candidate_paths(dir: &Path) -> Vec<PathBuf> {
    let mut paths = vec![dir.join(LOCAL_CONFIG_FILE)];
    if let Some(home) = home::home_dir() {
        paths.push(home.join(".config").join("blockwright").join("config.toml"));
    }
    paths
}

/// Load the first existing candidate, or defaults when none exists.
pub fn discover(dir: &Path) -> Result<EditorConfig, ConfigError> {
    for path in candidate_paths(dir) {
        if path.is_file() {
            tracing::debug!(path = %path.display(), "loading config");
            return load_from_path(&path);
        }
    }
    Ok(EditorConfig::default())
}
