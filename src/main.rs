//! rdice command line
//!
//! ```bash
//! rdice regional --config rdice.toml --output results.csv
//! rdice info gdp_baseline
//! rdice charts --until 2100 --dir solutions/
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use rdice::{load_config, run_regional, save_results, variable_info, write_charts};
use rdice_core::Year;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "rdice")]
#[command(about = "Regional data and scenario reporting for a DICE-style climate-economy model")]
struct Args {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Calculate GDP, emissions and population for the configured regions
    Regional {
        /// Output file, JSON if it ends in .json and CSV otherwise. Defaults to stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show the metadata of a regional variable
    Info { variable: String },
    /// Build chart data from the scenario solution files
    Charts {
        /// Last year shown
        #[arg(long, default_value_t = 2100)]
        until: Year,

        /// Directory holding the solution files
        #[arg(long, default_value = ".")]
        dir: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;

    match args.command {
        Command::Regional { output } => {
            let table = run_regional(&config)?;
            save_results(&table, output.as_deref())?;
        }
        Command::Info { variable } => {
            let info = variable_info(&config, &variable)?;
            println!("{}", info);
        }
        Command::Charts { until, dir } => {
            let out = write_charts(&config, &dir, until)?;
            info!(path = %out.display(), "charts written");
        }
    }
    Ok(())
}
