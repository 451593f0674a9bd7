//! Manifest reconciliation - the run that turns a package tree into manifest entries
//!
//! A run loads the prior manifest, walks every package folder once, accepts
//! packages whose signature is not yet known, allocates their versions in
//! discovery order and merges them into the manifest. Problems with a single
//! package are recorded in the report and never stop the run.

use crate::discovery::{PackageFolder, PackageScanner, DEFAULT_CHANGELOG_FILE, DEFAULT_DESCRIPTOR_EXTENSION};
use crate::entry::{build_entry, forced_major, EntryInput};
use crate::errors::{ErrorKind, ManifestError};
use crate::signature::{SignatureExtractor, SignatureRule, DEFAULT_LINES_TO_READ};
use crate::store::ManifestStore;
use crate::types::{Manifest, ManifestEntry};
use crate::version::{next_version, DecimalContext, EMPTY_MANIFEST_VERSION};
use ahash::AHashSet;
use std::path::PathBuf;
use tracing::{debug, info, warn};

// =============================================================================
// OPTIONS
// =============================================================================

/// Tunables for a reconciliation run
#[derive(Debug, Clone)]
pub struct ReconcileOptions {
    pub rule: SignatureRule,
    pub lines_to_read: usize,
    pub descriptor_extension: String,
    pub changelog_file: String,
    pub context: DecimalContext,
    /// Compute everything but leave the store untouched
    pub dry_run: bool,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        ReconcileOptions {
            rule: SignatureRule::default(),
            lines_to_read: DEFAULT_LINES_TO_READ,
            descriptor_extension: DEFAULT_DESCRIPTOR_EXTENSION.to_string(),
            changelog_file: DEFAULT_CHANGELOG_FILE.to_string(),
            context: DecimalContext::default(),
            dry_run: false,
        }
    }
}

// =============================================================================
// REPORT
// =============================================================================

/// What was found where the prior manifest should be
#[derive(Debug)]
pub enum PriorState {
    Loaded,
    Missing,
    /// Unreadable or corrupted; replaced by an empty manifest
    Recovered(ManifestError),
}

/// A package that could not be processed
#[derive(Debug)]
pub struct SkippedPackage {
    pub folder: String,
    pub reason: ManifestError,
}

/// Result of a reconciliation run
#[derive(Debug)]
pub struct ReconcileReport {
    /// Resulting manifest; the prior one when nothing was added
    pub manifest: Manifest,
    /// Entries accepted in this run, in discovery order
    pub added: Vec<ManifestEntry>,
    pub skipped: Vec<SkippedPackage>,
    /// Packages whose signature was already catalogued
    pub already_known: usize,
    pub prior_state: PriorState,
    pub written: bool,
}

impl ReconcileReport {
    pub fn has_changes(&self) -> bool {
        !self.added.is_empty()
    }
}

// =============================================================================
// RECONCILER
// =============================================================================

/// Drives discovery, extraction, version allocation and merging
pub struct Reconciler<S: ManifestStore> {
    store: S,
    scanner: PackageScanner,
    extractor: SignatureExtractor,
    context: DecimalContext,
    dry_run: bool,
}

impl<S: ManifestStore> Reconciler<S> {
    pub fn new(root: impl Into<PathBuf>, store: S, options: ReconcileOptions) -> Self {
        let scanner = PackageScanner::new(root)
            .with_descriptor_extension(options.descriptor_extension)
            .with_changelog_file(options.changelog_file);

        Reconciler {
            store,
            scanner,
            extractor: SignatureExtractor::new(options.rule, options.lines_to_read),
            context: options.context,
            dry_run: options.dry_run,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Run one full pass over the package root.
    ///
    /// Only a root that cannot be listed, a stored version that cannot be
    /// parsed or a failed write end the run with an error. A package whose
    /// version cannot be represented is skipped like any other bad package.
    pub fn reconcile(&self) -> Result<ReconcileReport, ManifestError> {
        let (prior, prior_state) = self.load_prior();
        let mut known: AHashSet<String> = prior.known_signatures();
        let mut current = prior
            .highest_version()?
            .map_or_else(|| EMPTY_MANIFEST_VERSION.to_string(), |v| v.to_string());

        let mut added = Vec::new();
        let mut skipped = Vec::new();
        let mut already_known = 0;

        for folder in self.scanner.package_folders()? {
            let descriptor = match self.scanner.locate_descriptor(&folder) {
                Ok(Some(path)) => path,
                Ok(None) => {
                    debug!("No descriptor in '{}', ignoring", folder.name);
                    continue;
                }
                Err(reason) => {
                    skipped.push(Self::skip(&folder, reason));
                    continue;
                }
            };

            let signature = match self.extractor.extract_file(&descriptor) {
                Ok(signature) => signature,
                Err(reason) => {
                    skipped.push(Self::skip(&folder, reason));
                    continue;
                }
            };

            if known.contains(&signature) {
                debug!("Signature '{}' already catalogued", signature);
                already_known += 1;
                continue;
            }

            let version =
                match next_version(Some(&current), forced_major(&folder.name), &self.context) {
                    Ok(version) => version,
                    Err(err) => {
                        let reason = ManifestError::from_version(descriptor, err);
                        skipped.push(Self::skip(&folder, reason));
                        continue;
                    }
                };
            current = version;

            info!("New configuration found! Signature: {}", signature);

            let changelog = self.changelog_for(&folder);

            added.push(build_entry(EntryInput {
                folder_name: &folder.name,
                descriptor_path: &descriptor,
                signature: &signature,
                changelog: &changelog,
                version: &current,
            }));
            known.insert(signature);
        }

        if added.is_empty() {
            info!("No new configurations found. Manifest is already up to date.");
            return Ok(ReconcileReport {
                manifest: prior,
                added,
                skipped,
                already_known,
                prior_state,
                written: false,
            });
        }

        let manifest = prior.merge(added.clone())?;
        let written = if self.dry_run {
            debug!("Dry run, not writing {}", self.store.location());
            false
        } else {
            self.store.save(&manifest)?;
            info!(
                "Manifest '{}' updated with {} new entr{}",
                self.store.location(),
                added.len(),
                if added.len() == 1 { "y" } else { "ies" }
            );
            true
        };

        Ok(ReconcileReport {
            manifest,
            added,
            skipped,
            already_known,
            prior_state,
            written,
        })
    }

    fn load_prior(&self) -> (Manifest, PriorState) {
        match self.store.load() {
            Ok(Some(manifest)) => (manifest, PriorState::Loaded),
            Ok(None) => {
                info!(
                    "Manifest '{}' not found. Starting a new one.",
                    self.store.location()
                );
                (Manifest::default(), PriorState::Missing)
            }
            Err(err) => {
                warn!(
                    "Existing manifest could not be used and will be replaced by a new one: {}",
                    err
                );
                (Manifest::default(), PriorState::Recovered(err))
            }
        }
    }

    fn changelog_for(&self, folder: &PackageFolder) -> String {
        match self.scanner.read_changelog(folder) {
            Ok(changelog) => changelog.unwrap_or_default(),
            Err(err) => {
                warn!("Could not read changelog in '{}': {}", folder.name, err);
                String::new()
            }
        }
    }

    fn skip(folder: &PackageFolder, reason: ManifestError) -> SkippedPackage {
        match reason.kind() {
            ErrorKind::Missing => {
                warn!("Skipping '{}', no signature: {}", folder.name, reason);
            }
            ErrorKind::Malformed => {
                warn!("Skipping '{}', unusable signature: {}", folder.name, reason);
            }
            ErrorKind::Unreadable => {
                warn!("Skipping '{}', unreadable: {}", folder.name, reason);
            }
            ErrorKind::Corrupted | ErrorKind::Fatal => {
                warn!("Skipping '{}': {}", folder.name, reason);
            }
        }

        SkippedPackage {
            folder: folder.name.clone(),
            reason,
        }
    }
}
