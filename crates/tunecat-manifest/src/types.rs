//! Persisted manifest types
//!
//! The on-disk field names are Portuguese (`versoes`, `assinaturas`, ...) because
//! existing manifests and the tools that consume them already use them. The Rust
//! side uses English names and maps them with serde renames.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

// =============================================================================
// MANIFEST - Ordered entries plus signature index
// =============================================================================

/// The persisted catalogue of known packages
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Entries sorted by version, highest first
    #[serde(rename = "versoes", default)]
    pub entries: Vec<ManifestEntry>,

    /// signature -> descriptor path, derived from `entries`
    #[serde(rename = "assinaturas", default)]
    pub signature_index: BTreeMap<String, String>,

    /// Top-level keys this tool does not manage, written back unchanged
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// =============================================================================
// ENTRY - One record per discovered package
// =============================================================================

/// A single catalogued package
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    #[serde(rename = "assinatura")]
    pub signature: String,

    /// Decimal string with one fractional digit, e.g. "1.0", "12.3"
    #[serde(rename = "versao")]
    pub version: String,

    #[serde(rename = "ambiente", default)]
    pub environment: Environment,

    /// Forward-slash path to the descriptor the signature came from
    #[serde(rename = "caminho_arquivo")]
    pub descriptor_path: String,

    /// RFC 3339 UTC timestamp with explicit offset
    #[serde(rename = "data_adicao", default)]
    pub added_at: String,

    #[serde(default)]
    pub changelog: String,

    /// Per-entry keys this tool does not manage, written back unchanged
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Deployment environment a package targets
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, Hash, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Dev,
    #[default]
    Prod,
}

impl Environment {
    /// `Dev` when the folder name contains "dev" in any case, otherwise `Prod`
    pub fn from_folder(folder_name: &str) -> Self {
        if folder_name.to_lowercase().contains("dev") {
            Environment::Dev
        } else {
            Environment::Prod
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Dev => "dev",
            Environment::Prod => "prod",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "dev" => Ok(Environment::Dev),
            "prod" => Ok(Environment::Prod),
            other => Err(format!("unknown environment '{}' (expected dev or prod)", other)),
        }
    }
}
