//! Building manifest entries for newly accepted packages

use crate::types::{Environment, ManifestEntry};
use chrono::{DateTime, SecondsFormat, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

static FORCED_MAJOR: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"_v(\d+)_").ok());

/// Forced major version encoded in a folder name as `_v<digits>_`.
///
/// The leftmost match wins. Zero and values too large for `u32` are ignored.
pub fn forced_major(folder_name: &str) -> Option<u32> {
    let re = FORCED_MAJOR.as_ref()?;
    let digits = re.captures(folder_name)?.get(1)?.as_str();
    digits.parse::<u32>().ok().filter(|major| *major > 0)
}

/// Path rendered with forward slashes regardless of host separator
pub fn normalize_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Timestamp format stored in `data_adicao`
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, false)
}

/// Inputs describing one accepted package
#[derive(Debug, Clone, Copy)]
pub struct EntryInput<'a> {
    pub folder_name: &'a str,
    pub descriptor_path: &'a Path,
    pub signature: &'a str,
    pub changelog: &'a str,
    pub version: &'a str,
}

/// Build an entry stamped with the current time
pub fn build_entry(input: EntryInput<'_>) -> ManifestEntry {
    build_entry_at(input, Utc::now())
}

/// Build an entry stamped with `at`
pub fn build_entry_at(input: EntryInput<'_>, at: DateTime<Utc>) -> ManifestEntry {
    ManifestEntry {
        signature: input.signature.to_string(),
        version: input.version.to_string(),
        environment: Environment::from_folder(input.folder_name),
        descriptor_path: normalize_path(input.descriptor_path),
        added_at: format_timestamp(at),
        changelog: input.changelog.to_string(),
        extra: Default::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::path::PathBuf;

    #[test]
    fn test_forced_major() {
        assert_eq!(forced_major("cfg_v7_special"), Some(7));
        assert_eq!(forced_major("cfg_dev_v2_test"), Some(2));
        assert_eq!(forced_major("cfg_v12_a_v3_b"), Some(12));
        assert_eq!(forced_major("cfg_v7"), None);
        assert_eq!(forced_major("cfgv7_"), None);
        assert_eq!(forced_major("cfg_v_x_"), None);
        assert_eq!(forced_major("cfg_v0_x"), None);
        assert_eq!(forced_major("cfg_v99999999999_x"), None);
    }

    #[test]
    fn test_build_entry() {
        let path = PathBuf::from("configs\\cfg_dev_v2_test\\engine.ini");
        let at = Utc
            .with_ymd_and_hms(2024, 5, 1, 12, 30, 0)
            .single()
            .unwrap_or_else(|| unreachable!());

        let entry = build_entry_at(
            EntryInput {
                folder_name: "cfg_dev_v2_test",
                descriptor_path: &path,
                signature: "testecu",
                changelog: "",
                version: "2.0",
            },
            at,
        );

        assert_eq!(entry.signature, "testecu");
        assert_eq!(entry.version, "2.0");
        assert_eq!(entry.environment, Environment::Dev);
        assert_eq!(entry.descriptor_path, "configs/cfg_dev_v2_test/engine.ini");
        assert_eq!(entry.added_at, "2024-05-01T12:30:00.000000+00:00");
        assert!(entry.changelog.is_empty());
    }

    #[test]
    fn test_build_entry_prod_with_changelog() {
        let path = PathBuf::from("./uaefi/uaefi.ini");
        let entry = build_entry(EntryInput {
            folder_name: "uaefi",
            descriptor_path: &path,
            signature: "uaefi.1",
            changelog: "Fixed idle",
            version: "1.3",
        });

        assert_eq!(entry.environment, Environment::Prod);
        assert_eq!(entry.changelog, "Fixed idle");
        assert!(entry.added_at.ends_with("+00:00"));
    }
}
