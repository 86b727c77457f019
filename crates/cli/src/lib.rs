pub mod commands;
pub mod config;
pub mod logging;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use crate::config::{AppConfig, LoadOptions};

#[derive(Debug, Parser)]
#[command(
    name = "vitrine",
    about = "Vitrine recommendation CLI",
    long_about = "Rank catalog items around a reference item, inspect keyword extraction, and show effective configuration.",
    after_help = "Examples:\n  vitrine recommend --catalog catalog.json --reference sku-1 --seed 7\n  vitrine keywords --title \"Smartphone Tecno Spark\"\n  vitrine config"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Build placement lists for one reference item and print them as JSON")]
    Recommend {
        #[arg(long, help = "Path to a JSON array of catalog items")]
        catalog: PathBuf,
        #[arg(long, help = "Id of the item being viewed")]
        reference: String,
        #[arg(
            long = "placement",
            help = "Placement to compute; repeat for several (default: all)"
        )]
        placements: Vec<String>,
        #[arg(long, default_value_t = 1, help = "1-indexed page number")]
        page: usize,
        #[arg(long, help = "Items per page (default: recommendations.default_page_size)")]
        page_size: Option<usize>,
        #[arg(long, help = "Seed for the diversity shuffle")]
        seed: Option<u64>,
    },
    #[command(about = "Print the keyword set extracted from a title and description")]
    Keywords {
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let config = AppConfig::load(LoadOptions::default()).unwrap_or_default();
    logging::init_logging(&config);

    let result = match cli.command {
        Command::Recommend { catalog, reference, placements, page, page_size, seed } => {
            commands::recommend::run(&commands::recommend::RecommendArgs {
                catalog,
                reference,
                placements,
                page,
                page_size,
                seed,
            })
        }
        Command::Keywords { title, description } => commands::keywords::run(&title, &description),
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
