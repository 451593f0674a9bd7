//! Persisted user configuration for tunecat
//!
//! Settings live in a TOML file. Every field is optional; callers fall back to
//! their own defaults for unset keys. On the command line keys are kebab-case
//! (`root-dir`, `lines-to-read`, ...).

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable that overrides the config file location
pub const CONFIG_ENV_VAR: &str = "TUNECAT_CONFIG";

/// Name of the pointer file placed next to the default config
pub const POINTER_FILE_NAME: &str = ".tunecat_config_path";

/// Default config file name
pub const CONFIG_FILE_NAME: &str = "tunecat.toml";

/// Keys accepted by [`Config::get`] and [`Config::set`]
pub const KEYS: &[&str] = &[
    "root-dir",
    "manifest-path",
    "lines-to-read",
    "descriptor-extension",
    "changelog-file",
    "signature-section",
    "signature-key",
    "signature-prefix",
    "decimal-precision",
];

/// Error type for configuration handling
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Neither a home nor a config directory could be determined
    NoConfigDir,
    Io { path: PathBuf, message: String },
    Parse { path: PathBuf, message: String },
    Serialize(String),
    UnknownKey(String),
    InvalidValue { key: String, value: String, reason: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::NoConfigDir => write!(f, "Could not determine config directory"),
            ConfigError::Io { path, message } => {
                write!(f, "Failed to access {}: {}", path.display(), message)
            }
            ConfigError::Parse { path, message } => {
                write!(f, "Invalid config file {}: {}", path.display(), message)
            }
            ConfigError::Serialize(msg) => write!(f, "Failed to serialize config: {}", msg),
            ConfigError::UnknownKey(key) => write!(
                f,
                "Unknown config key: {}. Supported keys: {}",
                key,
                KEYS.join(", ")
            ),
            ConfigError::InvalidValue { key, value, reason } => {
                write!(f, "Invalid value '{}' for {}: {}", value, key, reason)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root_dir: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manifest_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lines_to_read: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descriptor_extension: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub changelog_file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature_section: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature_prefix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decimal_precision: Option<u32>,
}

impl Config {
    /// Default config file path (platform-appropriate)
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        #[cfg(not(target_os = "windows"))]
        let base = dirs::home_dir()
            .ok_or(ConfigError::NoConfigDir)?
            .join(".config");

        #[cfg(target_os = "windows")]
        let base = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;

        Ok(base.join("tunecat").join(CONFIG_FILE_NAME))
    }

    /// Pointer file that redirects the config location, next to the default config
    pub fn pointer_path() -> Result<PathBuf, ConfigError> {
        let default = Self::default_path()?;
        Ok(default
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(POINTER_FILE_NAME))
    }

    /// Resolved config file path.
    ///
    /// `$TUNECAT_CONFIG` wins, then a non-empty pointer file, then the default.
    pub fn path() -> Result<PathBuf, ConfigError> {
        if let Some(path) = std::env::var(CONFIG_ENV_VAR).ok().and_then(non_empty_path) {
            return Ok(path);
        }

        let default = Self::default_path()?;
        let pointer = Self::pointer_path()?;
        Ok(read_pointer(&pointer).unwrap_or(default))
    }

    /// Redirect future runs to `new_path` by writing the pointer file
    pub fn set_pointer(new_path: &str) -> Result<PathBuf, ConfigError> {
        let pointer = Self::pointer_path()?;
        write_file(&pointer, new_path.trim())?;
        Ok(pointer)
    }

    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from an explicit path; a missing file is an empty config
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    pub fn save(&self) -> Result<PathBuf, ConfigError> {
        let path = Self::path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?;
        write_file(path, &content)
    }

    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "root-dir" => self.root_dir.clone(),
            "manifest-path" => self.manifest_path.clone(),
            "lines-to-read" => self.lines_to_read.map(|v| v.to_string()),
            "descriptor-extension" => self.descriptor_extension.clone(),
            "changelog-file" => self.changelog_file.clone(),
            "signature-section" => self.signature_section.clone(),
            "signature-key" => self.signature_key.clone(),
            "signature-prefix" => self.signature_prefix.clone(),
            "decimal-precision" => self.decimal_precision.map(|v| v.to_string()),
            _ => None,
        }
    }

    /// Set a key from its command-line string form
    pub fn set(&mut self, key: &str, value: String) -> Result<(), ConfigError> {
        match key {
            "root-dir" => self.root_dir = Some(value),
            "manifest-path" => self.manifest_path = Some(value),
            "lines-to-read" => self.lines_to_read = Some(parse_positive(key, &value)?),
            "descriptor-extension" => self.descriptor_extension = Some(value),
            "changelog-file" => self.changelog_file = Some(value),
            "signature-section" => self.signature_section = Some(value),
            "signature-key" => self.signature_key = Some(value),
            "signature-prefix" => self.signature_prefix = Some(value),
            "decimal-precision" => {
                let precision: usize = parse_positive(key, &value)?;
                let precision = u32::try_from(precision).map_err(|_| ConfigError::InvalidValue {
                    key: key.to_string(),
                    value: value.clone(),
                    reason: "value is too large".to_string(),
                })?;
                self.decimal_precision = Some(precision);
            }
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        KEYS.iter().all(|key| self.get(key).is_none())
    }

    /// Set keys with their values, in [`KEYS`] order
    pub fn values_iter(&self) -> Vec<(&'static str, String)> {
        KEYS.iter()
            .filter_map(|key| self.get(key).map(|value| (*key, value)))
            .collect()
    }
}

fn non_empty_path(raw: String) -> Option<PathBuf> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| PathBuf::from(trimmed))
}

fn read_pointer(pointer: &Path) -> Option<PathBuf> {
    fs::read_to_string(pointer).ok().and_then(non_empty_path)
}

fn write_file(path: &Path, content: &str) -> Result<(), ConfigError> {
    let io_err = |e: std::io::Error| ConfigError::Io {
        path: path.to_path_buf(),
        message: e.to_string(),
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    fs::write(path, content).map_err(io_err)
}

fn parse_positive(key: &str, value: &str) -> Result<usize, ConfigError> {
    match value.trim().parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            reason: "expected a positive integer".to_string(),
        }),
    }
}
