//! drillrun CLI — timed disaster-preparedness drills in the terminal.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "drillrun", version, about = "Timed, gamified disaster-preparedness drills")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a drill interactively
    Run {
        /// Path to a .toml scenario file
        #[arg(long)]
        scenario: PathBuf,

        /// Seed for the question order
        #[arg(long)]
        seed: Option<u64>,

        /// Output directory (defaults to output_dir from the config)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Output format: json, html, all, none
        #[arg(long, default_value = "json")]
        format: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,

        /// Disable the terminal bell
        #[arg(long)]
        no_sound: bool,
    },

    /// Validate scenario TOML files
    Validate {
        /// Path to scenario file or directory
        #[arg(long)]
        scenario: PathBuf,
    },

    /// List scenarios in a directory
    List {
        /// Directory to search
        #[arg(long, default_value = "./scenarios")]
        scenarios: PathBuf,
    },

    /// Summarise saved score reports
    Summary {
        /// Directory of report JSON files
        #[arg(long, default_value = "./drillrun-results")]
        reports: PathBuf,
    },

    /// Create starter config and example scenario
    Init,
}

#[tokio::main]
async fn main() {
    let filter = tracing_subscriber::EnvFilter::from_default_env();
    let filter = match "drillrun=info".parse() {
        Ok(directive) => filter.add_directive(directive),
        Err(_) => filter,
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            scenario,
            seed,
            output,
            format,
            config,
            no_sound,
        } => commands::run::execute(scenario, seed, output, format, config, no_sound).await,
        Commands::Validate { scenario } => commands::validate::execute(scenario),
        Commands::List { scenarios } => commands::list::execute(scenarios),
        Commands::Summary { reports } => commands::summary::execute(reports),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
