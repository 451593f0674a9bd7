//! Package folder discovery
//!
//! Every non-hidden directory directly under the root is a candidate package.
//! Folders and descriptor file names are sorted lexically so the outcome does
//! not depend on filesystem listing order.

use crate::errors::ManifestError;
use std::fs;
use std::path::PathBuf;
use tracing::debug;

/// Default descriptor file extension
pub const DEFAULT_DESCRIPTOR_EXTENSION: &str = ".ini";

/// Default changelog file name inside a package folder
pub const DEFAULT_CHANGELOG_FILE: &str = "changelog.txt";

/// A directory under the root that may hold a package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageFolder {
    /// Directory name (lossy UTF-8)
    pub name: String,
    pub path: PathBuf,
}

/// Lists package folders and the files inside them
#[derive(Debug, Clone)]
pub struct PackageScanner {
    root: PathBuf,
    descriptor_extension: String,
    changelog_file: String,
}

impl PackageScanner {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        PackageScanner {
            root: root.into(),
            descriptor_extension: DEFAULT_DESCRIPTOR_EXTENSION.to_string(),
            changelog_file: DEFAULT_CHANGELOG_FILE.to_string(),
        }
    }

    pub fn with_descriptor_extension(mut self, extension: impl Into<String>) -> Self {
        self.descriptor_extension = extension.into();
        self
    }

    pub fn with_changelog_file(mut self, file_name: impl Into<String>) -> Self {
        self.changelog_file = file_name.into();
        self
    }

    /// Non-hidden directories under the root, sorted by name.
    ///
    /// Failing to list the root is the one fatal discovery error.
    pub fn package_folders(&self) -> Result<Vec<PackageFolder>, ManifestError> {
        debug!("Scanning package root: {:?}", self.root);

        let entries = fs::read_dir(&self.root).map_err(|source| ManifestError::RootScan {
            path: self.root.clone(),
            source,
        })?;

        let mut folders: Vec<PackageFolder> = entries
            .flatten()
            .filter_map(|entry| {
                let name = entry.file_name().to_string_lossy().to_string();
                if name.starts_with('.') {
                    return None;
                }
                // follows symlinks, so linked package folders count
                let path = self.root.join(&name);
                path.is_dir().then_some(PackageFolder { name, path })
            })
            .collect();

        folders.sort_by(|a, b| a.name.cmp(&b.name));
        debug!("Found {} package folder(s)", folders.len());
        Ok(folders)
    }

    /// First descriptor file in the folder by lexical name, if any
    pub fn locate_descriptor(&self, folder: &PackageFolder) -> Result<Option<PathBuf>, ManifestError> {
        let entries = fs::read_dir(&folder.path).map_err(|source| ManifestError::Unreadable {
            path: folder.path.clone(),
            source,
        })?;

        let mut names: Vec<String> = entries
            .flatten()
            .map(|entry| entry.file_name().to_string_lossy().to_string())
            .filter(|name| name.ends_with(self.descriptor_extension.as_str()))
            .filter(|name| folder.path.join(name).is_file())
            .collect();

        if names.len() > 1 {
            names.sort();
            debug!(
                "Folder '{}' has {} descriptor files, using '{}'",
                folder.name,
                names.len(),
                names[0]
            );
        }

        Ok(names.first().map(|name| folder.path.join(name)))
    }

    /// Trimmed changelog text, `None` when the folder has no changelog file
    pub fn read_changelog(&self, folder: &PackageFolder) -> Result<Option<String>, ManifestError> {
        let path = folder.path.join(&self.changelog_file);
        if !path.exists() {
            return Ok(None);
        }

        fs::read_to_string(&path)
            .map(|content| Some(content.trim().to_string()))
            .map_err(|source| ManifestError::Unreadable { path, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use std::path::Path;
    use tempfile::TempDir;

    fn touch(path: &Path, content: &[u8]) {
        if let Some(parent) = path.parent() {
            assert!(fs::create_dir_all(parent).is_ok());
        }
        assert!(fs::write(path, content).is_ok());
    }

    #[test]
    fn test_package_folders_sorted_and_filtered() {
        let Ok(temp_dir) = TempDir::new() else {
            return;
        };
        let root = temp_dir.path();
        for name in ["zeta", "alpha", ".git", "mid"] {
            assert!(fs::create_dir_all(root.join(name)).is_ok());
        }
        touch(&root.join("loose.ini"), b"");

        let scanner = PackageScanner::new(root);
        let folders = scanner.package_folders().unwrap_or_default();
        let names: Vec<_> = folders.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["alpha", "mid", "zeta"]);
    }

    #[test]
    fn test_missing_root_is_fatal() {
        let Ok(temp_dir) = TempDir::new() else {
            return;
        };
        let scanner = PackageScanner::new(temp_dir.path().join("absent"));
        assert!(scanner
            .package_folders()
            .is_err_and(|e| e.kind() == ErrorKind::Fatal));
    }

    #[test]
    fn test_locate_descriptor_picks_lexically_first() {
        let Ok(temp_dir) = TempDir::new() else {
            return;
        };
        let root = temp_dir.path();
        touch(&root.join("pkg").join("b.ini"), b"");
        touch(&root.join("pkg").join("a.ini"), b"");
        touch(&root.join("pkg").join("notes.txt"), b"");
        assert!(fs::create_dir_all(root.join("pkg").join("dir.ini")).is_ok());

        let scanner = PackageScanner::new(root);
        let folder = PackageFolder {
            name: "pkg".to_string(),
            path: root.join("pkg"),
        };
        let descriptor = scanner.locate_descriptor(&folder);
        assert!(descriptor.is_ok_and(|d| d == Some(root.join("pkg").join("a.ini"))));
    }

    #[test]
    fn test_locate_descriptor_none_and_custom_extension() {
        let Ok(temp_dir) = TempDir::new() else {
            return;
        };
        let root = temp_dir.path();
        touch(&root.join("pkg").join("engine.INI"), b"");
        touch(&root.join("pkg").join("engine.cfg"), b"");
        let folder = PackageFolder {
            name: "pkg".to_string(),
            path: root.join("pkg"),
        };

        let scanner = PackageScanner::new(root);
        assert!(scanner.locate_descriptor(&folder).is_ok_and(|d| d.is_none()));

        let scanner = PackageScanner::new(root).with_descriptor_extension(".cfg");
        assert!(scanner
            .locate_descriptor(&folder)
            .is_ok_and(|d| d == Some(root.join("pkg").join("engine.cfg"))));
    }

    #[test]
    fn test_read_changelog() {
        let Ok(temp_dir) = TempDir::new() else {
            return;
        };
        let root = temp_dir.path();
        let folder = PackageFolder {
            name: "pkg".to_string(),
            path: root.join("pkg"),
        };
        assert!(fs::create_dir_all(&folder.path).is_ok());

        let scanner = PackageScanner::new(root);
        assert!(scanner.read_changelog(&folder).is_ok_and(|c| c.is_none()));

        touch(&folder.path.join("changelog.txt"), b"\n  Added boost control \n\n");
        assert!(scanner
            .read_changelog(&folder)
            .is_ok_and(|c| c.as_deref() == Some("Added boost control")));

        touch(&folder.path.join("changelog.txt"), b"caf\xE9");
        assert!(scanner
            .read_changelog(&folder)
            .is_err_and(|e| e.kind() == ErrorKind::Unreadable));
    }
}
