//! Chart data from scenario solution files.
//!
//! Reads the solution file of every scenario, keeps the variables that have a chart,
//! checks them and cuts them to the plotting horizon. The result is a [`ChartSet`]
//! holding one [`Chart`] per variable with a styled series per scenario.
//!
//! Two invariants are enforced:
//! - every charted variable has exactly one value per step of the [`TimeGrid`]
//! - every charted variable appears in every scenario, except methane variables in the
//!   reference scenario and `population` outside of it

use crate::scenario::{is_reference, ScenarioStyle};
use crate::solution::solution_file_name;
use log::{debug, info};
use rdice_core::config::TimeGrid;
use rdice_core::errors::{RdiceError, RdiceResult};
use rdice_core::{FloatValue, Year};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// A chart to draw: variable, title and y-axis label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphSpec {
    pub variable: &'static str,
    pub header: &'static str,
    pub ylabel: &'static str,
}

const fn graph(variable: &'static str, header: &'static str, ylabel: &'static str) -> GraphSpec {
    GraphSpec {
        variable,
        header,
        ylabel,
    }
}

pub const REQUIRED_GRAPHS: [GraphSpec; 32] = [
    graph("co2_emission_control", "Carbon emission control", "Emission control ratio"),
    graph("ch4_emission_control", "Methane emission control", "Emission control ratio"),
    graph("carbon_price", "Carbon price", "USD per ton of CO2"),
    graph("co2_reservoir", "Atmospheric carbon", "GtC"),
    graph("ch4_reservoir", "Atmospheric methane", "Tg"),
    graph("land_co2_emissions", "Natural CO2 emissions", "GtC"),
    graph("industrial_co2_emissions", "Industrial CO2 emissions", "GtC"),
    graph("co2_emissions", "Total CO2 emissions", "GtC"),
    graph("land_ch4_emissions", "Natural methane emissions", "Tg"),
    graph("industrial_ch4_emissions", "Industrial methane emissions", "Tg"),
    graph("ch4_emissions", "Total methane emissions", "Tg"),
    graph("t_atm", "Temperature change since 1750", "℃"),
    graph("nonco2_forcings", "Non-CO2 forcings", "W/m²"),
    graph("ch4_forcings", "Methane forcings", "W/m²"),
    graph("co2_forcings", "CO2 forcings", "W/m²"),
    graph("forcings", "Total forcings", "W/m²"),
    graph("damage_frac", "Damage fraction", "Damage/GDP ratio"),
    graph("abatement_frac", "Abatement fraction", "Abatement/GDP ratio"),
    graph("consumption", "Global consumption", "$ trillions"),
    graph("cpc", "Consumption per capita", "$ thousands"),
    graph("capital", "Global capital", "$ trillions"),
    graph("investment", "Global investment", "$ trillions"),
    graph("saving_rate", "Saving rate", "Investment/GDP ratio"),
    graph("gross_output", "World GDP", "$ trillions"),
    graph("growth", "Global growth", "%"),
    graph("damages", "Damages", "$ trillions"),
    graph("abatecost", "Abatement costs", "$ trillions"),
    graph("output", "Global income", "$ trillions"),
    graph("income", "Income per capita", "$ thousands"),
    graph("population", "Global population", "billions"),
    graph("scc", "Social cost of CO2", "$ per ton"),
    graph("scch4", "Social cost of methane", "$ per ton"),
];

/// Solution files of the five SSP scenarios followed by the reference run.
pub fn scenario_files() -> Vec<String> {
    (1..=5)
        .map(solution_file_name)
        .chain(std::iter::once("reference.txt".to_string()))
        .collect()
}

/// Whether a charted variable may be missing from a scenario.
fn may_be_unused(variable: &str, scenario: &str) -> bool {
    if is_reference(scenario) {
        variable.contains("ch4")
    } else {
        variable == "population"
    }
}

/// Values of one scenario in a chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub scenario: String,
    pub style: ScenarioStyle,
    pub values: Vec<FloatValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chart {
    pub variable: String,
    pub header: String,
    pub ylabel: String,
    pub xlabel: String,
    pub series: Vec<ChartSeries>,
}

/// All charts up to a final year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSet {
    pub until: Year,
    pub years: Vec<Year>,
    pub charts: Vec<Chart>,
}

impl ChartSet {
    pub fn chart(&self, variable: &str) -> Option<&Chart> {
        self.charts.iter().find(|chart| chart.variable == variable)
    }

    /// Write one JSON file per chart into `dir`, replacing any previous contents.
    pub fn write_json(&self, dir: &Path) -> RdiceResult<Vec<PathBuf>> {
        if dir.exists() {
            fs::remove_dir_all(dir)?;
        }
        fs::create_dir_all(dir)?;

        let mut written = Vec::with_capacity(self.charts.len());
        for chart in &self.charts {
            let path = dir.join(format!("{}.json", chart.variable));
            let content = serde_json::to_string_pretty(&ChartFile {
                years: &self.years,
                chart,
            })
            .map_err(|e| RdiceError::Error(format!("Could not serialise {}: {}", chart.variable, e)))?;
            fs::write(&path, content)?;
            written.push(path);
        }
        info!("Wrote {} charts to {}", written.len(), dir.display());
        Ok(written)
    }
}

#[derive(Serialize)]
struct ChartFile<'a> {
    years: &'a [Year],
    #[serde(flatten)]
    chart: &'a Chart,
}

/// Charted values of one scenario.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioValues {
    pub scenario: String,
    pub values: HashMap<String, Vec<FloatValue>>,
}

/// Builds chart data for a time grid and a final year.
#[derive(Debug, Clone)]
pub struct ChartBuilder {
    grid: TimeGrid,
    until: Year,
    variables: HashSet<&'static str>,
}

impl ChartBuilder {
    /// Fails unless `until` lies between the first and the last year of `grid`.
    pub fn new(grid: TimeGrid, until: Year) -> RdiceResult<Self> {
        let (first, last) = (grid.start_year, grid.last_year());
        if until < first || until > last {
            return Err(RdiceError::HorizonOutOfRange { until, first, last });
        }
        Ok(Self {
            grid,
            until,
            variables: REQUIRED_GRAPHS.iter().map(|g| g.variable).collect(),
        })
    }

    /// Years shown on the x axis.
    pub fn years(&self) -> Vec<Year> {
        self.grid.years_until(self.until)
    }

    /// Read the charted variables of a scenario's solution file.
    ///
    /// Lines of variables without a chart are skipped.
    pub fn read_scenario<R: BufRead>(&self, scenario: &str, reader: R) -> RdiceResult<ScenarioValues> {
        let expected = self.grid.value_count();
        let shown = self.years().len();
        let mut values = HashMap::new();

        for line in reader.lines() {
            let line = line?;
            let mut fields = line.trim().split(',');
            let variable = fields.next().unwrap_or_default();
            if !self.variables.contains(variable) {
                continue;
            }

            let parsed = fields
                .map(|value| {
                    value
                        .trim()
                        .parse::<FloatValue>()
                        .map_err(|_| RdiceError::InvalidNumber {
                            variable: variable.to_string(),
                            scenario: scenario.to_string(),
                            value: value.to_string(),
                        })
                })
                .collect::<RdiceResult<Vec<_>>>()?;
            if parsed.len() != expected {
                return Err(RdiceError::LengthMismatch {
                    variable: variable.to_string(),
                    scenario: scenario.to_string(),
                    expected,
                    found: parsed.len(),
                });
            }

            let mut parsed = parsed;
            parsed.truncate(shown);
            values.insert(variable.to_string(), parsed);
        }

        for graph in REQUIRED_GRAPHS {
            if !values.contains_key(graph.variable) && !may_be_unused(graph.variable, scenario) {
                return Err(RdiceError::UnusedVariable {
                    variable: graph.variable.to_string(),
                    scenario: scenario.to_string(),
                });
            }
        }

        debug!("Read {} charted variables from {}", values.len(), scenario);
        Ok(ScenarioValues {
            scenario: scenario.to_string(),
            values,
        })
    }

    /// Read a scenario's solution file from disk.
    pub fn read_scenario_file(&self, path: &Path) -> RdiceResult<ScenarioValues> {
        let file = fs::File::open(path).map_err(|source| RdiceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let scenario = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        self.read_scenario(&scenario, BufReader::new(file))
    }

    /// Assemble charts from the scenarios, keeping the scenario order.
    pub fn build(&self, scenarios: &[ScenarioValues]) -> ChartSet {
        let charts = REQUIRED_GRAPHS
            .iter()
            .map(|graph| Chart {
                variable: graph.variable.to_string(),
                header: graph.header.to_string(),
                ylabel: graph.ylabel.to_string(),
                xlabel: "Years".to_string(),
                series: scenarios
                    .iter()
                    .filter_map(|scenario| {
                        scenario.values.get(graph.variable).map(|values| ChartSeries {
                            scenario: scenario.scenario.clone(),
                            style: ScenarioStyle::for_scenario(&scenario.scenario),
                            values: values.clone(),
                        })
                    })
                    .collect(),
            })
            .collect();

        ChartSet {
            until: self.until,
            years: self.years(),
            charts,
        }
    }

    /// Read every scenario file in `dir` and assemble the charts.
    pub fn from_dir(&self, dir: &Path) -> RdiceResult<ChartSet> {
        let scenarios = scenario_files()
            .iter()
            .map(|name| self.read_scenario_file(&dir.join(name)))
            .collect::<RdiceResult<Vec<_>>>()?;
        Ok(self.build(&scenarios))
    }
}
