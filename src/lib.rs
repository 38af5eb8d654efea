//! Command line and Python entry points of rdice.
//!
//! The heavy lifting lives in `rdice-core` (regional data and calculations) and
//! `rdice-report` (solution files and chart data). This crate wires them to a
//! configuration file and output files.

use anyhow::{Context, Result};
use log::info;
use rdice_core::calculator::RegionalCalculator;
use rdice_core::config::RdiceConfig;
use rdice_core::results::RegionalResultTable;
use rdice_core::store::RegionalDataStore;
use rdice_core::variable::VariableMetadata;
use rdice_core::Year;
use rdice_report::charts::ChartBuilder;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[cfg(feature = "python")]
mod python;

/// Configuration file read when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "rdice.toml";

/// Load the run configuration.
///
/// An explicit path must exist. Without one, [`DEFAULT_CONFIG_FILE`] is read if present
/// and the defaults are used otherwise.
pub fn load_config(path: Option<&Path>) -> Result<RdiceConfig> {
    let path = match path {
        Some(path) => path,
        None if Path::new(DEFAULT_CONFIG_FILE).exists() => Path::new(DEFAULT_CONFIG_FILE),
        None => {
            info!("No {} found, using defaults", DEFAULT_CONFIG_FILE);
            return Ok(RdiceConfig::default());
        }
    };
    RdiceConfig::from_file(path)
        .with_context(|| format!("Could not load configuration from {}", path.display()))
}

/// Run the regional calculations of a configuration.
pub fn run_regional(config: &RdiceConfig) -> Result<RegionalResultTable> {
    let store = Arc::new(RegionalDataStore::new(config.data.clone()));
    let mut calculator = RegionalCalculator::new(store, config.calculation.clone());
    calculator
        .run_all()
        .context("Regional calculation failed")?;
    Ok(calculator.into_results())
}

/// Format of a written result table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Csv,
    Json,
}

impl OutputFormat {
    /// JSON for `.json` files, CSV for anything else.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => OutputFormat::Json,
            _ => OutputFormat::Csv,
        }
    }
}

pub fn write_results<W: Write>(
    table: &RegionalResultTable,
    format: OutputFormat,
    writer: W,
) -> Result<()> {
    match format {
        OutputFormat::Csv => table.write_csv(writer)?,
        OutputFormat::Json => serde_json::to_writer_pretty(writer, table)?,
    }
    Ok(())
}

/// Write the result table to `output`, or as CSV to stdout.
pub fn save_results(table: &RegionalResultTable, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Could not create {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            write_results(table, OutputFormat::from_path(path), &mut writer)?;
            writer.flush()?;
            info!("Results written to {}", path.display());
        }
        None => write_results(table, OutputFormat::Csv, std::io::stdout().lock())?,
    }
    Ok(())
}

/// Metadata of a regional variable.
pub fn variable_info(config: &RdiceConfig, variable: &str) -> Result<VariableMetadata> {
    let store = RegionalDataStore::new(config.data.clone());
    let info = store
        .get_regional_info(variable)
        .context("Could not load regional metadata")?
        .cloned();
    info.with_context(|| format!("Unknown variable '{}'", variable))
}

/// Build chart data from the solution files in `dir` and write it to `dir/graphs{until}`.
pub fn write_charts(config: &RdiceConfig, dir: &Path, until: Year) -> Result<PathBuf> {
    let builder = ChartBuilder::new(config.time, until)
        .with_context(|| format!("Cannot chart until {}", until))?;
    let charts = builder
        .from_dir(dir)
        .with_context(|| format!("Could not read solutions from {}", dir.display()))?;
    let out = dir.join(format!("graphs{}", until));
    charts.write_json(&out)?;
    Ok(out)
}
