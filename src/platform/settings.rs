// Settings store - Persisted key-value settings
//
// Values live in a flat JSON object. Every write is committed to disk
// immediately so a crash does not lose the last selection.

use serde_json::{Map, Value};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

/// Errors raised while persisting settings
#[derive(Debug, Error)]
pub enum SettingsError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Malformed settings file
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Persisted key-value storage
pub trait SettingsStore {
    /// Read a number, falling back to `default` when absent or not numeric
    fn get_number(&self, key: &str, default: i64) -> i64;

    /// Store a number
    fn set_number(&mut self, key: &str, value: i64) -> Result<(), SettingsError>;
}

/// Settings backed by a JSON file (or kept in memory only)
#[derive(Debug, Default)]
pub struct JsonSettingsStore {
    path: Option<PathBuf>,
    values: Map<String, Value>,
}

impl JsonSettingsStore {
    /// Store that never touches the filesystem
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Open the store at `path`
    ///
    /// A missing file yields an empty store. A corrupt file is an error.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref().to_path_buf();
        let values = match fs::read_to_string(&path) {
            Ok(contents) if contents.trim().is_empty() => Map::new(),
            Ok(contents) => serde_json::from_str(&contents)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => Map::new(),
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            path: Some(path),
            values,
        })
    }

    /// Open the store, starting empty if the file cannot be read
    pub fn open_or_empty<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        Self::open(path).unwrap_or_else(|e| {
            warn!(path = %path.display(), error = %e, "could not read settings, starting empty");
            Self {
                path: Some(path.to_path_buf()),
                values: Map::new(),
            }
        })
    }

    fn commit(&self) -> Result<(), SettingsError> {
        if let Some(path) = &self.path {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent)?;
                }
            }
            let contents = serde_json::to_string_pretty(&self.values)?;
            fs::write(path, contents)?;
        }
        Ok(())
    }
}

impl SettingsStore for JsonSettingsStore {
    fn get_number(&self, key: &str, default: i64) -> i64 {
        self.values
            .get(key)
            .and_then(Value::as_i64)
            .unwrap_or(default)
    }

    fn set_number(&mut self, key: &str, value: i64) -> Result<(), SettingsError> {
        self.values.insert(key.to_string(), Value::from(value));
        self.commit()
    }
}
