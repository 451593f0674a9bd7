//! Manifest operations - lookup, merging and index maintenance
//!
//! Entries are only ever appended. A merge re-sorts the combined list by
//! decimal version (highest first, ties keep their prior order) and derives the
//! signature index from the sorted list.

use crate::errors::VersionError;
use crate::types::{Environment, Manifest, ManifestEntry};
use crate::version::parse_version;
use ahash::AHashSet;
use rust_decimal::Decimal;

impl Manifest {
    /// Check if manifest has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Signatures already catalogued, from the index and the entries
    pub fn known_signatures(&self) -> AHashSet<String> {
        self.signature_index
            .keys()
            .cloned()
            .chain(self.entries.iter().map(|entry| entry.signature.clone()))
            .collect()
    }

    /// Entry for a signature, resolved through the index
    pub fn lookup(&self, signature: &str) -> Option<&ManifestEntry> {
        let path = self.signature_index.get(signature)?;
        self.entries
            .iter()
            .find(|entry| entry.signature == signature && &entry.descriptor_path == path)
    }

    /// Entries for one environment, in manifest order
    pub fn entries_for(&self, environment: Environment) -> impl Iterator<Item = &ManifestEntry> {
        self.entries
            .iter()
            .filter(move |entry| entry.environment == environment)
    }

    /// Fail on the first entry whose version is not a decimal
    pub fn validate_versions(&self) -> Result<(), VersionError> {
        for entry in &self.entries {
            parse_version(&entry.version)?;
        }
        Ok(())
    }

    /// Highest version by decimal value, `None` for an empty manifest
    pub fn highest_version(&self) -> Result<Option<Decimal>, VersionError> {
        let mut highest: Option<Decimal> = None;
        for entry in &self.entries {
            let version = parse_version(&entry.version)?;
            if highest.map_or(true, |current| version > current) {
                highest = Some(version);
            }
        }
        Ok(highest)
    }

    /// Rebuild `signature_index` from `entries`; later entries win on collision
    pub fn rebuild_index(&mut self) {
        self.signature_index = self
            .entries
            .iter()
            .map(|entry| (entry.signature.clone(), entry.descriptor_path.clone()))
            .collect();
    }

    /// Sort entries by decimal version, highest first
    pub fn sort_entries(&mut self) -> Result<(), VersionError> {
        let mut keyed = self
            .entries
            .drain(..)
            .map(|entry| parse_version(&entry.version).map(|version| (version, entry)))
            .collect::<Result<Vec<_>, _>>()?;

        keyed.sort_by(|a, b| b.0.cmp(&a.0));
        self.entries = keyed.into_iter().map(|(_, entry)| entry).collect();
        Ok(())
    }

    /// Append new entries and produce the re-sorted, re-indexed manifest
    pub fn merge(&self, new_entries: Vec<ManifestEntry>) -> Result<Manifest, VersionError> {
        let mut merged = Manifest {
            entries: self.entries.iter().cloned().chain(new_entries).collect(),
            signature_index: Default::default(),
            extra: self.extra.clone(),
        };
        merged.sort_entries()?;
        merged.rebuild_index();
        Ok(merged)
    }

    /// True when the index holds exactly the entries' signatures and paths
    pub fn is_index_consistent(&self) -> bool {
        let signatures: AHashSet<&str> = self
            .entries
            .iter()
            .map(|entry| entry.signature.as_str())
            .collect();

        signatures.len() == self.signature_index.len()
            && self.entries.iter().all(|entry| {
                self.signature_index.get(&entry.signature) == Some(&entry.descriptor_path)
            })
    }

    /// Serialize this Manifest to a pretty JSON string
    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
