//! tunecat manifest engine
//!
//! Scans a root directory of configuration packages, pulls a signature out of
//! each package's INI descriptor, and keeps a JSON manifest of every distinct
//! signature with an allocated decimal version, environment tag, descriptor
//! path, timestamp and changelog.
//!
//! The entry point is [`Reconciler`]; persistence goes through [`ManifestStore`].

pub mod discovery;
pub mod entry;
pub mod errors;
pub mod manifest;
pub mod reconcile;
pub mod signature;
pub mod store;
pub mod types;
pub mod version;

pub use types::{Environment, Manifest, ManifestEntry};

pub use errors::{ErrorKind, ManifestError, SignatureError, VersionError};

pub use discovery::{PackageFolder, PackageScanner};
pub use reconcile::{PriorState, ReconcileOptions, ReconcileReport, Reconciler, SkippedPackage};
pub use signature::{extract_signature, SignatureExtractor, SignatureRule};
pub use store::{JsonManifestStore, ManifestStore};
pub use version::{next_version, DecimalContext};
