//! Host capability that turns an import reference into unit text.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::config::RuntimeConfig;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("unit '{0}' not found")]
    NotFound(String),
    #[error("failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[mockall::automock]
pub trait UnitLoader {
    fn load_unit_text(&self, reference: &str) -> Result<String, LoadError>;
}

/// Reads units from disk relative to a root directory.
#[derive(Debug, Clone)]
pub struct FsLoader {
    root: PathBuf,
    extension: String,
}

impl FsLoader {
    pub fn new(root: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            extension: extension.into(),
        }
    }

    pub fn from_config(config: &RuntimeConfig) -> Self {
        Self::new(&config.import_root, &config.import_extension)
    }

    /// `lib` → `<root>/lib.json`; references with an extension or an absolute
    /// path are taken as they are.
    pub fn resolve(&self, reference: &str) -> PathBuf {
        let mut path = self.root.join(reference);
        if Path::new(reference).extension().is_none() && !self.extension.is_empty() {
            path.set_extension(&self.extension);
        }
        path
    }
}

impl Default for FsLoader {
    fn default() -> Self {
        Self::from_config(&RuntimeConfig::default())
    }
}

impl UnitLoader for FsLoader {
    fn load_unit_text(&self, reference: &str) -> Result<String, LoadError> {
        let path = self.resolve(reference);
        debug!(reference, path = %path.display(), "load unit");
        std::fs::read_to_string(&path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => LoadError::NotFound(reference.to_string()),
            _ => LoadError::Io { path, source },
        })
    }
}

/// Serves unit texts from memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryLoader {
    units: HashMap<String, String>,
}

impl MemoryLoader {
    pub fn with_unit(mut self, reference: impl Into<String>, text: impl Into<String>) -> Self {
        self.insert(reference, text);
        self
    }

    pub fn insert(&mut self, reference: impl Into<String>, text: impl Into<String>) {
        self.units.insert(reference.into(), text.into());
    }
}

impl UnitLoader for MemoryLoader {
    fn load_unit_text(&self, reference: &str) -> Result<String, LoadError> {
        self.units
            .get(reference)
            .cloned()
            .ok_or_else(|| LoadError::NotFound(reference.to_string()))
    }
}
