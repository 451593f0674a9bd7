use crate::errors::CliError;
use crate::settings;
use crate::GlobalOpts;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;
use tunecat_config::Config;
use tunecat_logger as logger;
use tunecat_manifest::{PriorState, ReconcileReport, Reconciler};

#[derive(Args, Debug, Clone, Default)]
pub struct GenerateCommand {
    /// Directory holding one folder per configuration package
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Manifest file to read and update
    #[arg(long)]
    pub manifest: Option<PathBuf>,

    /// Show what would be added without writing the manifest
    #[arg(long)]
    pub dry_run: bool,
}

/// Reconcile the package root into the manifest and print what changed
pub fn handle_generate(
    cmd: GenerateCommand,
    config: &Config,
    opts: &GlobalOpts,
) -> Result<(), CliError> {
    let root = settings::root_dir(config, cmd.root);
    let store = settings::manifest_store(config, cmd.manifest);
    let options = settings::reconcile_options(config, cmd.dry_run);

    logger::step(&format!(
        "Reconciling {} into {}",
        root.display(),
        store.path().display()
    ));

    let reconciler = Reconciler::new(&root, store, options);
    let report = reconciler.reconcile()?;

    print_report(&report, opts);

    let manifest_path = reconciler.store().path().display();
    if !report.has_changes() {
        logger::success("No new configurations found. Manifest is already up to date.");
    } else if cmd.dry_run {
        logger::success(&format!(
            "Dry run: {} new configuration(s) would be added to {}",
            report.added.len(),
            manifest_path
        ));
    } else {
        logger::success(&format!(
            "Added {} configuration(s) to {} ({} total)",
            report.added.len(),
            manifest_path,
            report.manifest.len()
        ));
    }

    Ok(())
}

fn print_report(report: &ReconcileReport, opts: &GlobalOpts) {
    if let PriorState::Recovered(reason) = &report.prior_state {
        logger::warn(&format!("Previous manifest was replaced: {}", reason));
    }

    for entry in &report.added {
        println!(
            "  {} {} {} [{}] {}",
            "+".green().bold(),
            entry.version.bold(),
            entry.signature.cyan(),
            entry.environment,
            entry.descriptor_path.dimmed()
        );
    }

    if !report.skipped.is_empty() {
        logger::warn(&format!("{} package(s) skipped", report.skipped.len()));
        if opts.verbosity_level() > 0 {
            for skipped in &report.skipped {
                logger::debug(&format!("  {}: {}", skipped.folder, skipped.reason));
            }
        }
    }

    if report.already_known > 0 {
        logger::info(&format!(
            "{} package(s) already catalogued",
            report.already_known
        ));
    }
}
