mod commands;
mod input;
mod output;
mod render;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use commands::project_cost::ProjectCostArgs;
use commands::scenarios::{ScenariosArgs, ScheduleArgs};

/// Development loan scenario comparisons
#[derive(Parser)]
#[command(
    name = "devloan",
    version,
    about = "Development loan scenario comparisons",
    long_about = "Models the repayment of a development loan against the revenue of the \
                  finished project across every combination of principal, interest rate, \
                  loan term, lead time and revenue level, with decimal precision."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log debug detail to stderr (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare every combination of the given parameter ranges
    Scenarios(ScenariosArgs),
    /// Month-by-month schedule of a single scenario
    Schedule(ScheduleArgs),
    /// Summarise a project cost CSV by category
    ProjectCost(ProjectCostArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    debug!(output = ?cli.output, "Starting devloan");

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Scenarios(args) => commands::scenarios::run_scenarios(args),
        Commands::Schedule(args) => commands::scenarios::run_schedule(args),
        Commands::ProjectCost(args) => commands::project_cost::run_project_cost(args),
        Commands::Version => {
            println!("devloan {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result.and_then(|value| output::format_output(&cli.output, &value)) {
        Ok(()) => process::exit(0),
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
