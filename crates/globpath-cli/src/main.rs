//! # globpath CLI
//!
//! Command-line interface for glob-based file discovery.
//!
//! ## Commands
//!
//! - `globpath find [BASE]` - List paths matching include/exclude globs
//! - `globpath config` - Show, locate or initialise the configuration file
//!
//! ## Example Usage
//!
//! ```bash
//! # All Java sources under src, skipping tests
//! globpath find . -i 'src/**/*.java' -e '**/test/**'
//!
//! # Absolute globs may point anywhere; unreadable bases are skipped
//! globpath find -i '/var/log/nginx/*.log' -i '/opt/data/' --best-effort
//!
//! # Write the default configuration file
//! globpath config --init
//! ```

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// globpath - Find files by glob across many base directories
#[derive(Parser)]
#[command(name = "globpath")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Find paths matching glob patterns
    #[command(alias = "f")]
    Find(commands::find::FindArgs),

    /// Show or initialise the configuration file
    Config {
        /// Write the default configuration file
        #[arg(long)]
        init: bool,

        /// Overwrite an existing file with --init
        #[arg(long, requires = "init")]
        force: bool,

        /// Print the configuration file location
        #[arg(long, conflicts_with = "init")]
        path: bool,
    },
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown output format: {}", s)),
        }
    }
}

/// Pick the log filter: flags win over the configured level.
fn log_level(cli: &Cli, configured: &str) -> String {
    if cli.quiet {
        "error".to_string()
    } else {
        match cli.verbose {
            0 => configured.to_string(),
            1 => "debug".to_string(),
            _ => "trace".to_string(),
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = match &cli.config {
        Some(path) => globpath_core::Config::load_from(path)?,
        None => globpath_core::Config::load()?,
    };

    // Setup logging
    let level = log_level(&cli, &config.general.log_level);
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .init();

    // Execute command
    match cli.command {
        Commands::Find(args) => commands::find::run(config, args),
        Commands::Config { init, force, path } => {
            commands::config::run(config, cli.config, init, force, path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_log_level_precedence() {
        let cli = Cli::try_parse_from(["globpath", "config"]).unwrap();
        assert_eq!(log_level(&cli, "warn"), "warn");

        let cli = Cli::try_parse_from(["globpath", "-vv", "config"]).unwrap();
        assert_eq!(log_level(&cli, "warn"), "trace");

        let cli = Cli::try_parse_from(["globpath", "-q", "-v", "config"]).unwrap();
        assert_eq!(log_level(&cli, "warn"), "error");
    }

    #[test]
    fn test_output_format_parse() {
        assert_eq!("JSON".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert_eq!("text".parse::<OutputFormat>(), Ok(OutputFormat::Text));
        assert!("yaml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_find_arguments() {
        let cli = Cli::try_parse_from([
            "globpath", "find", "/srv", "-i", "**/*.rs", "-i", "docs", "-e", "**/target/**",
            "-x", "rs", "-d", "-1", "--dirs", "--best-effort", "-o", "json",
        ])
        .unwrap();

        let Commands::Find(args) = cli.command else {
            panic!("expected find");
        };
        assert_eq!(args.base, Some(PathBuf::from("/srv")));
        assert_eq!(args.include, vec!["**/*.rs", "docs"]);
        assert_eq!(args.exclude, vec!["**/target/**"]);
        assert_eq!(args.max_depth, Some(-1));
        assert!(args.dirs);
        assert!(args.best_effort);
        assert!(!args.no_follow);
        assert_eq!(args.output, OutputFormat::Json);
    }
}
