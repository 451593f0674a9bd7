//! Manifest persistence
//!
//! The reconciler only needs "load the prior manifest" and "store the final
//! one", so persistence sits behind [`ManifestStore`]. [`JsonManifestStore`]
//! is the on-disk implementation.

use crate::errors::ManifestError;
use crate::signature::decode_latin1;
use crate::types::Manifest;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default manifest file name, relative to the working directory
pub const DEFAULT_MANIFEST_FILE: &str = "manifest.json";

/// Load/store capability consumed by the reconciler
pub trait ManifestStore {
    /// The stored manifest, or `None` when nothing has been stored yet
    fn load(&self) -> Result<Option<Manifest>, ManifestError>;

    /// Replace the stored manifest
    fn save(&self, manifest: &Manifest) -> Result<(), ManifestError>;

    /// Human-readable location for messages
    fn location(&self) -> String;
}

/// Manifest stored as a pretty-printed JSON document
#[derive(Debug, Clone)]
pub struct JsonManifestStore {
    path: PathBuf,
}

impl Default for JsonManifestStore {
    fn default() -> Self {
        JsonManifestStore::new(DEFAULT_MANIFEST_FILE)
    }
}

impl JsonManifestStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonManifestStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut temp = self.path.as_os_str().to_owned();
        temp.push(".tmp");
        PathBuf::from(temp)
    }

    fn corrupted(&self, reason: impl ToString) -> ManifestError {
        ManifestError::Corrupted {
            path: self.path.clone(),
            reason: reason.to_string(),
        }
    }
}

impl ManifestStore for JsonManifestStore {
    fn load(&self) -> Result<Option<Manifest>, ManifestError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let bytes = fs::read(&self.path).map_err(|source| ManifestError::Unreadable {
            path: self.path.clone(),
            source,
        })?;

        // Older manifests were not always written as UTF-8
        let content = match String::from_utf8(bytes) {
            Ok(content) => content,
            Err(err) => {
                debug!("Manifest is not UTF-8, decoding as Latin-1: {:?}", self.path);
                decode_latin1(err.as_bytes())
            }
        };

        let manifest: Manifest =
            serde_json::from_str(&content).map_err(|err| self.corrupted(err))?;
        manifest
            .validate_versions()
            .map_err(|err| self.corrupted(err))?;

        debug!(
            "Loaded manifest {:?} with {} entries",
            self.path,
            manifest.len()
        );
        Ok(Some(manifest))
    }

    fn save(&self, manifest: &Manifest) -> Result<(), ManifestError> {
        let write_err = |source: std::io::Error| ManifestError::Write {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_err)?;
        }

        let content = manifest.to_json_string()?;

        // Atomic write: write to temp file then rename
        let temp_path = self.temp_path();
        {
            let file = fs::File::create(&temp_path).map_err(write_err)?;
            let mut writer = std::io::BufWriter::new(file);
            writer.write_all(content.as_bytes()).map_err(write_err)?;
            writer.flush().map_err(write_err)?;
        }
        fs::rename(&temp_path, &self.path).map_err(write_err)?;

        debug!(
            "Manifest written to {:?} ({} entries)",
            self.path,
            manifest.len()
        );
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}
