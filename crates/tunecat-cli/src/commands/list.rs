use crate::errors::CliError;
use crate::settings;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;
use tunecat_config::Config;
use tunecat_logger as logger;
use tunecat_manifest::{Environment, Manifest, ManifestError, ManifestStore};

#[derive(Args, Debug, Clone, Default)]
pub struct ListCommand {
    /// Only show entries for this environment (dev or prod)
    #[arg(long)]
    pub env: Option<Environment>,

    /// Print the stored manifest as JSON
    #[arg(long)]
    pub json: bool,

    /// Manifest file to read
    #[arg(long)]
    pub manifest: Option<PathBuf>,
}

pub fn handle_list(cmd: ListCommand, config: &Config) -> Result<(), CliError> {
    let store = settings::manifest_store(config, cmd.manifest);
    let Some(manifest) = store.load()? else {
        logger::warn(&format!(
            "No manifest found at {}. Run 'tunecat generate' first.",
            store.path().display()
        ));
        return Ok(());
    };

    if cmd.json {
        let json = manifest.to_json_string().map_err(ManifestError::from)?;
        println!("{}", json);
        return Ok(());
    }

    print_entries(&manifest, cmd.env);
    Ok(())
}

fn print_entries(manifest: &Manifest, env: Option<Environment>) {
    let entries: Vec<_> = match env {
        Some(env) => manifest.entries_for(env).collect(),
        None => manifest.entries.iter().collect(),
    };

    if entries.is_empty() {
        println!("{}", "No entries.".yellow());
        return;
    }

    println!(
        "{:<8} {:<5} {:<40} {}",
        "VERSION".bold(),
        "ENV".bold(),
        "SIGNATURE".bold(),
        "DESCRIPTOR".bold()
    );
    for entry in entries {
        println!(
            "{:<8} {:<5} {:<40} {}",
            entry.version,
            entry.environment.as_str(),
            entry.signature,
            entry.descriptor_path
        );
        if !entry.changelog.is_empty() {
            for line in entry.changelog.lines() {
                println!("{:>15}{}", "", line.dimmed());
            }
        }
    }
}
