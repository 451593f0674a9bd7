//! Error type for the tunecat command-line front end

use std::path::PathBuf;
use thiserror::Error;
use tunecat_config::ConfigError;
use tunecat_manifest::ManifestError;

#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("No manifest found at {}", .0.display())]
    NoManifest(PathBuf),

    #[error("Signature '{0}' not found in manifest")]
    UnknownSignature(String),
}
