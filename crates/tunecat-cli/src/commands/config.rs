use crate::errors::CliError;
use crate::GlobalOpts;
use clap::Subcommand;
use colored::Colorize;
use tunecat_config::Config;
use tunecat_logger as logger;

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Print the stored configuration
    Show,
    /// Set a configuration key
    Set { key: String, value: String },
    /// Get or set the path to the config file.
    /// If `new_path` is provided, future runs read the config from that path.
    /// If omitted, the current configuration file path is printed.
    Path {
        /// Optional new config path to set
        new_path: Option<String>,
    },
}

pub fn handle_config(action: Option<ConfigAction>, opts: &GlobalOpts) -> Result<(), CliError> {
    match action.unwrap_or(ConfigAction::Show) {
        ConfigAction::Show => {
            let config = Config::load()?;
            println!("{}", "Configuration:".bold().green());
            if config.is_empty() {
                if opts.verbosity_level() > 0 {
                    println!("  {}", "(empty)".yellow());
                }
            } else {
                for (key, value) in config.values_iter() {
                    println!("  {}: {}", key.cyan(), value);
                }
            }
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, value.clone())?;
            let path = config.save()?;
            logger::debug(&format!("Saved config to {}", path.display()));
            logger::success(&format!("Set {} = {}", key, value));
        }
        ConfigAction::Path { new_path } => {
            let config_path = Config::path()?;
            logger::debug(&format!("Reading config from: {}", config_path.display()));

            match new_path {
                Some(p) => {
                    let pointer = Config::set_pointer(&p)?;
                    logger::debug(&format!("Wrote pointer file {}", pointer.display()));
                    logger::success(&format!("Config path set to {}", p.trim()));
                }
                None => println!("{}", config_path.display()),
            }
        }
    }
    Ok(())
}
