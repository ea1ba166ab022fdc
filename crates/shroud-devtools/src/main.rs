//! blindedpath: create and unwrap blinded onion-message paths.
//!
//! Results go to stdout; logs and errors go to stderr. Any failure exits 1.

mod commands;
mod config;
mod output;

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::error::ErrorKind;
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::config::{LoggingConfig, ToolConfig};

/// Blinded path tool for onion messages
#[derive(Parser)]
#[command(name = "blindedpath")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a blinded path through the given nodes
    Create {
        /// Node ids in path order, each `<hex>[/<short channel id>]`
        #[arg(required = true, value_name = "NODE")]
        nodes: Vec<String>,
    },

    /// Unwrap one hop of a blinded onion
    Unwrap {
        /// This node's private key (hex)
        privkey: String,

        /// The received onion packet (hex)
        onion: String,

        /// The received blinding point (hex)
        blinding: String,

        /// This node is the entry of the path and was addressed unblinded
        #[arg(long)]
        first_node: bool,
    },
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::FAILURE,
            };
        }
    };

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("blindedpath: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = ToolConfig::load(cli.config.as_deref())?;
    init_logging(&config.logging, cli.verbose)?;
    debug!(?config, "loaded config");

    let out = match &cli.command {
        Commands::Create { nodes } => commands::create(nodes, &config.create)?,
        Commands::Unwrap {
            privkey,
            onion,
            blinding,
            first_node,
        } => commands::unwrap(privkey, onion, blinding, *first_node)?,
    };

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(out.as_bytes()).context("writing output")?;
    stdout.flush().context("writing output")?;
    Ok(())
}

fn init_logging(logging: &LoggingConfig, verbose: bool) -> anyhow::Result<()> {
    let filter = if verbose {
        EnvFilter::try_new("shroud=debug")?
    } else {
        match EnvFilter::try_from_default_env() {
            Ok(filter) => filter,
            Err(_) => EnvFilter::try_new(logging.directive())
                .with_context(|| format!("invalid log level {:?}", logging.level))?,
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(logging.ansi)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to set tracing subscriber: {e}"))
}
