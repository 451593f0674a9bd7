use clap::{Parser, Subcommand};
use tunecat::{
    commands::{
        config::{self, ConfigAction},
        generate::{self, GenerateCommand},
        list::{self, ListCommand},
        lookup::{self, LookupCommand},
    },
    errors::CliError,
    logging, GlobalOpts,
};
use tunecat_config::Config;
use tunecat_logger as logger;

#[derive(Parser)]
#[command(name = "tunecat")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(
    about = "Catalogue TunerStudio configuration packages",
    long_about = "tunecat scans a directory of configuration packages, extracts each descriptor's signature and keeps a versioned JSON manifest of every distinct signature."
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOpts,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan the package root and add new signatures to the manifest
    Generate(GenerateCommand),
    /// List manifest entries
    List(ListCommand),
    /// Resolve a signature to its descriptor path and version
    Lookup(LookupCommand),
    /// Configure the tunecat tool
    #[command(subcommand_required = false, arg_required_else_help = false)]
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Config { action } => config::handle_config(action, &cli.global),
        Commands::Generate(cmd) => {
            let config = Config::load()?;
            generate::handle_generate(cmd, &config, &cli.global)
        }
        Commands::List(cmd) => {
            let config = Config::load()?;
            list::handle_list(cmd, &config)
        }
        Commands::Lookup(cmd) => {
            let config = Config::load()?;
            lookup::handle_lookup(cmd, &config)
        }
    }
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = logger::init_with_verbosity(cli.global.verbosity_level(), cli.global.quiet) {
        eprintln!("Warning: Failed to initialize logger: {}", e);
    }
    logging::init_tracing(&cli.global);

    let verbosity = cli.global.verbosity_level();
    if let Err(e) = run(cli) {
        logger::error(&e.to_string());
        if verbosity > 0 {
            logger::show_log_path();
        }
        std::process::exit(1);
    }
}
