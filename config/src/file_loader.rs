//! # Configuration File Loading
//!
//! Loads run configurations from JSON, YAML or TOML files.
//!
//! The format is detected from the file extension.

use crate::config::RunConfiguration;
use errors::MolforgeError;
use std::path::Path;

/// Configuration file loading error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigFileError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(String),

    #[error("Failed to parse TOML: {0}")]
    TomlParse(String),

    #[error("Failed to parse YAML: {0}")]
    YamlParse(String),

    #[error("Config file has no extension")]
    NoExtension,

    #[error("Unsupported config file format: {0}")]
    UnsupportedFormat(String),
}

impl From<ConfigFileError> for MolforgeError {
    fn from(err: ConfigFileError) -> Self {
        match err {
            ConfigFileError::FileNotFound(path) => {
                MolforgeError::resource(path, "configuration file not found")
            }
            ConfigFileError::Io(e) => MolforgeError::Io(e),
            other => MolforgeError::configuration("<document>", other.to_string()),
        }
    }
}

fn read(path: &Path) -> Result<String, ConfigFileError> {
    std::fs::read_to_string(path)
        .map_err(|_e| ConfigFileError::FileNotFound(path.display().to_string()))
}

/// Load a run configuration from a JSON file.
///
/// # M-CANONICAL-DOCS
///
/// ## Purpose
/// Loads a complete run configuration from a JSON document, the format the
/// run writes back as `input.json`.
///
/// ## Usage
/// ```rust,no_run
/// use config::load_from_json;
/// use std::path::Path;
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = load_from_json(Path::new("run.json"))?;
///     println!("Run type: {}", config.run_type);
///     Ok(())
/// }
/// ```
///
/// ## Error Handling
/// Returns `ConfigFileError` for:
/// - File not found
/// - Invalid JSON syntax
/// - Missing required or unknown fields
pub fn load_from_json(path: &Path) -> Result<RunConfiguration, ConfigFileError> {
    let contents = read(path)?;
    serde_json::from_str(&contents).map_err(|e| ConfigFileError::JsonParse(e.to_string()))
}

/// Load a run configuration from a TOML file.
pub fn load_from_toml(path: &Path) -> Result<RunConfiguration, ConfigFileError> {
    let contents = read(path)?;
    toml::from_str(&contents).map_err(|e| ConfigFileError::TomlParse(e.to_string()))
}

/// Load a run configuration from a YAML file.
pub fn load_from_yaml(path: &Path) -> Result<RunConfiguration, ConfigFileError> {
    let contents = read(path)?;
    serde_yaml::from_str(&contents).map_err(|e| ConfigFileError::YamlParse(e.to_string()))
}

/// Load a run configuration, detecting the format from the extension.
///
/// ## Supported Formats
/// - `.json`: JSON format
/// - `.toml`: TOML format
/// - `.yaml` / `.yml`: YAML format
pub fn load_from_file(path: &Path) -> Result<RunConfiguration, ConfigFileError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .ok_or(ConfigFileError::NoExtension)?;

    match extension.to_ascii_lowercase().as_str() {
        "json" => load_from_json(path),
        "toml" => load_from_toml(path),
        "yaml" | "yml" => load_from_yaml(path),
        other => Err(ConfigFileError::UnsupportedFormat(other.to_string())),
    }
}
