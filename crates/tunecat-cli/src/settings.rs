//! Run settings resolved from the config file, command-line overrides and
//! built-in defaults (in that order of precedence, overrides first)

use std::path::PathBuf;
use tunecat_config::Config;
use tunecat_manifest::store::DEFAULT_MANIFEST_FILE;
use tunecat_manifest::{DecimalContext, JsonManifestStore, ReconcileOptions, SignatureRule};

/// Default package root
pub const DEFAULT_ROOT_DIR: &str = ".";

pub fn root_dir(config: &Config, cli_root: Option<PathBuf>) -> PathBuf {
    cli_root
        .or_else(|| config.root_dir.as_ref().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_ROOT_DIR))
}

pub fn manifest_path(config: &Config, cli_manifest: Option<PathBuf>) -> PathBuf {
    cli_manifest
        .or_else(|| config.manifest_path.as_ref().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_MANIFEST_FILE))
}

pub fn manifest_store(config: &Config, cli_manifest: Option<PathBuf>) -> JsonManifestStore {
    JsonManifestStore::new(manifest_path(config, cli_manifest))
}

pub fn reconcile_options(config: &Config, dry_run: bool) -> ReconcileOptions {
    let defaults = ReconcileOptions::default();
    let default_rule = defaults.rule;

    let rule = SignatureRule {
        section: config
            .signature_section
            .clone()
            .unwrap_or(default_rule.section),
        key: config.signature_key.clone().unwrap_or(default_rule.key),
        comment_delimiter: default_rule.comment_delimiter,
        prefix: config
            .signature_prefix
            .clone()
            .unwrap_or(default_rule.prefix),
    };

    ReconcileOptions {
        rule,
        lines_to_read: config.lines_to_read.unwrap_or(defaults.lines_to_read),
        descriptor_extension: config
            .descriptor_extension
            .clone()
            .unwrap_or(defaults.descriptor_extension),
        changelog_file: config
            .changelog_file
            .clone()
            .unwrap_or(defaults.changelog_file),
        context: config
            .decimal_precision
            .map_or(defaults.context, DecimalContext::new),
        dry_run,
    }
}
