use serde::{Deserialize, Serialize};
use std::{fs::File, io::BufReader, path::Path, path::PathBuf};

use crate::{InternalResult, JsonLangError, DEFAULT_MAX_CALL_DEPTH};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RuntimeConfig {
    #[serde(default = "default_import_root")]
    pub import_root: PathBuf,

    #[serde(default = "default_import_extension")]
    pub import_extension: String,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default = "default_max_call_depth")]
    pub max_call_depth: usize,

    #[serde(default)]
    pub repl: ReplConfig,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            import_root: default_import_root(),
            import_extension: default_import_extension(),
            log_level: default_log_level(),
            max_call_depth: default_max_call_depth(),
            repl: ReplConfig::default(),
        }
    }
}

impl RuntimeConfig {
    /// Reads `path` if it exists, otherwise returns defaults.
    pub fn load_or_default<P: AsRef<Path>>(path: Option<P>) -> InternalResult<Self> {
        match path {
            Some(path) if path.as_ref().exists() => from_file(path),
            _ => Ok(Self::default()),
        }
    }
}

/// Initial shell environment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReplConfig {
    #[serde(default = "default_prompt")]
    pub prompt: String,

    #[serde(default = "default_true")]
    pub colors: bool,

    #[serde(default)]
    pub debug: bool,
}

impl Default for ReplConfig {
    fn default() -> Self {
        Self {
            prompt: default_prompt(),
            colors: default_true(),
            debug: false,
        }
    }
}

pub fn from_file<T: for<'de> Deserialize<'de>, P: AsRef<Path>>(path: P) -> InternalResult<T> {
    let file = File::open(path.as_ref()).map_err(|e| {
        JsonLangError::Config(format!(
            "Failed to open config file {}: {}",
            path.as_ref().display(),
            e
        ))
    })?;
    let reader = BufReader::new(file);
    let config = serde_json::from_reader(reader)
        .map_err(|e| JsonLangError::Config(format!("Failed to parse config file: {}", e)))?;
    Ok(config)
}

pub fn from_str<T: for<'de> Deserialize<'de>>(s: &str) -> InternalResult<T> {
    let config = serde_json::from_str(s)
        .map_err(|e| JsonLangError::Config(format!("Failed to parse config: {}", e)))?;
    Ok(config)
}

fn default_import_root() -> PathBuf {
    PathBuf::from(".")
}
fn default_import_extension() -> String {
    "json".to_string()
}
fn default_log_level() -> String {
    "warn".to_string()
}
fn default_max_call_depth() -> usize {
    DEFAULT_MAX_CALL_DEPTH
}
fn default_prompt() -> String {
    "#".to_string()
}
fn default_true() -> bool {
    true
}
