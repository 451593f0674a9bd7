use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Coarse classification of a failure, one handling path per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A required file, section or key does not exist
    Missing,
    /// The input exists but its content is unusable
    Malformed,
    /// The input exists but could not be read
    Unreadable,
    /// The persisted manifest could not be decoded
    Corrupted,
    /// Nothing sensible can continue after this
    Fatal,
}

/// Errors produced while extracting a signature from descriptor text
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignatureError {
    #[error("section [{0}] not found")]
    MissingSection(String),

    #[error("key '{key}' not found in section [{section}]")]
    MissingKey { section: String, key: String },

    #[error("signature is empty after normalization")]
    Empty,
}

/// Errors produced by decimal version arithmetic
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VersionError {
    #[error("invalid version '{0}'")]
    Invalid(String),

    #[error("version {value} does not fit in {precision} significant digits")]
    PrecisionExceeded { value: String, precision: u32 },
}

/// Errors that can occur while reconciling the manifest
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("{}: {what}", .path.display())]
    Missing { path: PathBuf, what: String },

    #[error("malformed {}: {reason}", .path.display())]
    Malformed { path: PathBuf, reason: String },

    #[error("unable to read {}: {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("corrupted manifest {}: {reason}", .path.display())]
    Corrupted { path: PathBuf, reason: String },

    #[error("unable to scan root directory {}: {source}", .path.display())]
    RootScan {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write manifest {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to serialize manifest: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error(transparent)]
    Version(#[from] VersionError),
}

impl ManifestError {
    /// Attach the descriptor path to a signature extraction failure
    pub fn from_signature(path: PathBuf, err: SignatureError) -> Self {
        match err {
            SignatureError::Empty => ManifestError::Malformed {
                path,
                reason: err.to_string(),
            },
            SignatureError::MissingSection(_) | SignatureError::MissingKey { .. } => {
                ManifestError::Missing {
                    path,
                    what: err.to_string(),
                }
            }
        }
    }

    /// A version that cannot be allocated for one package
    pub fn from_version(path: PathBuf, err: VersionError) -> Self {
        ManifestError::Malformed {
            path,
            reason: err.to_string(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ManifestError::Missing { .. } => ErrorKind::Missing,
            ManifestError::Malformed { .. } => ErrorKind::Malformed,
            ManifestError::Unreadable { .. } => ErrorKind::Unreadable,
            ManifestError::Corrupted { .. } => ErrorKind::Corrupted,
            ManifestError::RootScan { .. }
            | ManifestError::Write { .. }
            | ManifestError::Serialize(_)
            | ManifestError::Version(_) => ErrorKind::Fatal,
        }
    }

    /// Whether a run can carry on past this error
    pub fn is_recoverable(&self) -> bool {
        self.kind() != ErrorKind::Fatal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_errors_map_to_kinds() {
        let path = PathBuf::from("cfg/engine.ini");

        let missing = ManifestError::from_signature(
            path.clone(),
            SignatureError::MissingKey {
                section: "TunerStudio".to_string(),
                key: "signature".to_string(),
            },
        );
        assert_eq!(missing.kind(), ErrorKind::Missing);
        assert_eq!(
            missing.to_string(),
            "cfg/engine.ini: key 'signature' not found in section [TunerStudio]"
        );

        let empty = ManifestError::from_signature(path, SignatureError::Empty);
        assert_eq!(empty.kind(), ErrorKind::Malformed);
        assert!(empty.is_recoverable());
    }

    #[test]
    fn test_version_errors_for_a_package_are_malformed() {
        let err = ManifestError::from_version(
            PathBuf::from("a_v123456_x/a.ini"),
            VersionError::PrecisionExceeded {
                value: "123456".to_string(),
                precision: 5,
            },
        );
        assert_eq!(err.kind(), ErrorKind::Malformed);
        assert!(err.to_string().contains("5 significant digits"));
    }

    #[test]
    fn test_root_scan_is_fatal() {
        let err = ManifestError::RootScan {
            path: PathBuf::from("/nope"),
            source: io::Error::new(io::ErrorKind::NotFound, "gone"),
        };
        assert_eq!(err.kind(), ErrorKind::Fatal);
        assert!(!err.is_recoverable());
    }
}
