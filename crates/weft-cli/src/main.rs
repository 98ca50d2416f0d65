//! Weft command-line tool
//!
//! Weaves compiled modules for the host runtime, prints the processing
//! order of a batch, and inspects how a module's types are classified.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

mod commands;
mod logging;
mod output;

#[derive(Parser)]
#[command(name = "weft")]
#[command(about = "Post-compilation weaver for weft modules", long_about = None)]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// When to use colored output
    #[arg(long, value_parser = ["auto", "always", "never"], global = true)]
    color: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Weave a batch of modules into an output directory
    Weave {
        /// Output directory
        #[arg(short, long)]
        output: PathBuf,
        /// Reference module path (repeatable)
        #[arg(short, long = "reference")]
        references: Vec<String>,
        /// Target modules, in input order
        #[arg(required = true)]
        targets: Vec<String>,
        /// Configuration file (defaults to ./weft.toml when present)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Module name suffix of pass-through glue modules
        #[arg(long)]
        glue_suffix: Option<String>,
        /// Ignore symbol files next to the targets
        #[arg(long)]
        no_symbols: bool,
    },

    /// Print the processing order of a batch
    Order {
        /// Reference module path (repeatable)
        #[arg(short, long = "reference")]
        references: Vec<String>,
        /// Target modules, in input order
        #[arg(required = true)]
        targets: Vec<String>,
    },

    /// Show how each type of a module is classified
    Inspect {
        /// Module file
        module: PathBuf,
        /// Configuration file (defaults to ./weft.toml when present)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    let color = output::resolve_color_choice(cli.color.as_deref());

    let result = match cli.command {
        Commands::Weave {
            output,
            references,
            targets,
            config,
            glue_suffix,
            no_symbols,
        } => commands::weave::execute(commands::weave::WeaveArgs {
            output,
            references,
            targets,
            config,
            glue_suffix,
            no_symbols,
            color,
        }),

        Commands::Order {
            references,
            targets,
        } => commands::order::execute(references, targets, color),

        Commands::Inspect { module, config } => commands::inspect::execute(module, config, color),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
