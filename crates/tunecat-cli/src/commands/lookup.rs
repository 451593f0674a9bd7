use crate::errors::CliError;
use crate::settings;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;
use tunecat_config::Config;
use tunecat_manifest::ManifestStore;

#[derive(Args, Debug, Clone, Default)]
pub struct LookupCommand {
    /// Signature to resolve, without the vendor prefix
    pub signature: String,

    /// Manifest file to read
    #[arg(long)]
    pub manifest: Option<PathBuf>,
}

/// Resolve a signature through the manifest's signature index
pub fn handle_lookup(cmd: LookupCommand, config: &Config) -> Result<(), CliError> {
    let store = settings::manifest_store(config, cmd.manifest);
    let manifest = store
        .load()?
        .ok_or_else(|| CliError::NoManifest(store.path().to_path_buf()))?;

    let Some(path) = manifest.signature_index.get(&cmd.signature) else {
        return Err(CliError::UnknownSignature(cmd.signature));
    };

    println!("{}", cmd.signature.cyan().bold());
    println!("  {}: {}", "path".cyan(), path);
    // the index may name a signature whose entry was removed by hand
    if let Some(entry) = manifest.lookup(&cmd.signature) {
        println!("  {}: {}", "version".cyan(), entry.version);
        println!("  {}: {}", "environment".cyan(), entry.environment);
        println!("  {}: {}", "added".cyan(), entry.added_at);
        if !entry.changelog.is_empty() {
            println!("  {}: {}", "changelog".cyan(), entry.changelog);
        }
    }
    Ok(())
}
