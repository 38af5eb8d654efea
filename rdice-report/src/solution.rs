//! Solution files
//!
//! A solved scenario is written as one text record per tracked variable, each a
//! comma-separated list of the variable's values at every step of the [`TimeGrid`]:
//!
//! ```text
//! (run1: eta=1.4500000; rho=0.0150000)
//! saving_rate,0.250000000000,0.251000000000,...
//! capital,223.000000,241.124000,...
//! welfare,4512.133
//!
//! co2_emissions_dual,...
//! ch4_emissions_dual,...
//! consumption_dual,...
//! scc,...
//! scch4,...
//! ```
//!
//! The social costs of CO2 and methane are ratios of the emissions duals and the
//! consumption dual:
//!
//! $$ SCC = -1000 \cdot \frac{\lambda_{CO2}}{\epsilon + \lambda_{C}} $$
//! $$ SCCH4 = -10^6 \cdot \frac{\lambda_{CH4}}{\epsilon + \lambda_{C}} $$
//!
//! with $\epsilon = 10^{-5}$ keeping the ratio finite when the consumption dual vanishes.

use log::info;
use rdice_core::config::TimeGrid;
use rdice_core::errors::{RdiceError, RdiceResult};
use rdice_core::{FloatValue, Year};
use std::collections::{BTreeMap, HashMap};
use std::io::Write;

/// Variables written to a solution file, in order.
pub const TRACKED_VARIABLES: [&str; 33] = [
    "saving_rate",
    "co2_emission_control",
    "ch4_emission_control",
    "carbon_price",
    "capital",
    "gross_output",
    "growth",
    "land_co2_emissions",
    "industrial_co2_emissions",
    "co2_emissions",
    "co2_reservoir",
    "land_ch4_emissions",
    "industrial_ch4_emissions",
    "ch4_emissions",
    "ch4_reservoir",
    "ch4_forcings",
    "nonco2_forcings",
    "co2_forcings",
    "forcings",
    "t_atm",
    "t_ocean",
    "alpha",
    "cumulative_co2_emissions",
    "damage_frac",
    "damages",
    "abatement_frac",
    "abatecost",
    "output",
    "income",
    "investment",
    "consumption",
    "cpc",
    "utility",
];

pub const CO2_EMISSIONS_CONSTRAINT: &str = "co2_emissions_constr";
pub const CH4_EMISSIONS_CONSTRAINT: &str = "ch4_emissions_constr";
pub const CONSUMPTION_CONSTRAINT: &str = "consumption_constr";

/// Added to the consumption dual before dividing by it.
pub const DUAL_EPSILON: FloatValue = 0.00001;

/// Termination status reported by the solver.
#[derive(Debug, Clone, PartialEq)]
pub enum SolveStatus {
    Optimal,
    LocallyOptimal,
    Infeasible,
    IterationLimit,
    Other(String),
}

impl SolveStatus {
    pub fn is_optimal(&self) -> bool {
        matches!(self, SolveStatus::Optimal | SolveStatus::LocallyOptimal)
    }

    /// Fail unless the solver terminated optimally.
    pub fn ensure_optimal(&self) -> RdiceResult<()> {
        if self.is_optimal() {
            Ok(())
        } else {
            Err(RdiceError::NotOptimal(format!("{:?}", self)))
        }
    }
}

/// Read access to a solved optimisation model.
pub trait SolvedModel {
    /// Value of a time-indexed variable.
    fn value(&self, variable: &str, year: Year) -> Option<FloatValue>;
    /// Dual value of a time-indexed constraint.
    fn dual(&self, constraint: &str, year: Year) -> Option<FloatValue>;
    /// Value of a scalar parameter or objective.
    fn scalar(&self, name: &str) -> Option<FloatValue>;
}

/// A [`SolvedModel`] held in memory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SolutionValues {
    pub values: HashMap<String, BTreeMap<Year, FloatValue>>,
    pub duals: HashMap<String, BTreeMap<Year, FloatValue>>,
    pub scalars: HashMap<String, FloatValue>,
}

impl SolutionValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_value(&mut self, variable: &str, year: Year, value: FloatValue) {
        self.values
            .entry(variable.to_string())
            .or_default()
            .insert(year, value);
    }

    pub fn set_dual(&mut self, constraint: &str, year: Year, value: FloatValue) {
        self.duals
            .entry(constraint.to_string())
            .or_default()
            .insert(year, value);
    }

    pub fn set_scalar(&mut self, name: &str, value: FloatValue) {
        self.scalars.insert(name.to_string(), value);
    }
}

impl SolvedModel for SolutionValues {
    fn value(&self, variable: &str, year: Year) -> Option<FloatValue> {
        self.values.get(variable)?.get(&year).copied()
    }

    fn dual(&self, constraint: &str, year: Year) -> Option<FloatValue> {
        self.duals.get(constraint)?.get(&year).copied()
    }

    fn scalar(&self, name: &str) -> Option<FloatValue> {
        self.scalars.get(name).copied()
    }
}

/// File name of the solution of an SSP scenario.
pub fn solution_file_name(scenario: u8) -> String {
    format!("ssp{}_solution.txt", scenario)
}

/// Decimal places used for a tracked variable.
fn precision(variable: &str) -> usize {
    match variable {
        "saving_rate" | "co2_emission_control" => 12,
        _ => 6,
    }
}

/// Formats solved models as solution files.
#[derive(Debug, Clone, Copy, Default)]
pub struct SolutionWriter {
    grid: TimeGrid,
}

impl SolutionWriter {
    pub fn new(grid: TimeGrid) -> Self {
        Self { grid }
    }

    pub fn grid(&self) -> &TimeGrid {
        &self.grid
    }

    /// Collect a value for every step of the grid.
    fn collect<F>(&self, name: &str, lookup: F) -> RdiceResult<Vec<FloatValue>>
    where
        F: Fn(Year) -> Option<FloatValue>,
    {
        self.grid
            .years()
            .map(|year| {
                lookup(year).ok_or_else(|| RdiceError::MissingSolutionValue {
                    name: name.to_string(),
                    year,
                })
            })
            .collect()
    }

    fn scalar(model: &dyn SolvedModel, name: &str) -> RdiceResult<FloatValue> {
        model
            .scalar(name)
            .ok_or_else(|| RdiceError::MissingScalar(name.to_string()))
    }

    fn write_line<W: Write>(
        out: &mut W,
        name: &str,
        values: &[FloatValue],
        precision: usize,
    ) -> RdiceResult<()> {
        let formatted: Vec<String> = values
            .iter()
            .map(|value| format!("{:.*}", precision, value))
            .collect();
        writeln!(out, "{},{}", name, formatted.join(","))?;
        Ok(())
    }

    /// Write the solution file of a solved model.
    ///
    /// Fails without writing anything if the solver did not terminate optimally.
    pub fn write<W: Write>(
        &self,
        model: &dyn SolvedModel,
        status: &SolveStatus,
        out: &mut W,
    ) -> RdiceResult<()> {
        status.ensure_optimal()?;

        let eta = Self::scalar(model, "utility_elasticity")?;
        let rho = Self::scalar(model, "pure_time_preference")?;
        writeln!(out, "(run1: eta={:.7}; rho={:.7})", eta, rho)?;

        for variable in TRACKED_VARIABLES {
            let values = self.collect(variable, |year| model.value(variable, year))?;
            Self::write_line(out, variable, &values, precision(variable))?;
        }
        writeln!(out, "welfare,{:.3}", Self::scalar(model, "welfare")?)?;
        writeln!(out)?;

        let co2 = self.collect(CO2_EMISSIONS_CONSTRAINT, |year| {
            model.dual(CO2_EMISSIONS_CONSTRAINT, year)
        })?;
        let ch4 = self.collect(CH4_EMISSIONS_CONSTRAINT, |year| {
            model.dual(CH4_EMISSIONS_CONSTRAINT, year)
        })?;
        let consumption = self.collect(CONSUMPTION_CONSTRAINT, |year| {
            model.dual(CONSUMPTION_CONSTRAINT, year)
        })?;

        Self::write_line(out, "co2_emissions_dual", &co2, 6)?;
        Self::write_line(out, "ch4_emissions_dual", &ch4, 6)?;
        Self::write_line(out, "consumption_dual", &consumption, 6)?;
        Self::write_line(out, "scc", &social_cost(&co2, &consumption, 1000.0), 6)?;
        Self::write_line(out, "scch4", &social_cost(&ch4, &consumption, 1_000_000.0), 6)?;

        info!("Solution written");
        Ok(())
    }
}

/// Social cost per step from an emissions dual and the consumption dual.
pub fn social_cost(
    emissions_dual: &[FloatValue],
    consumption_dual: &[FloatValue],
    scale: FloatValue,
) -> Vec<FloatValue> {
    emissions_dual
        .iter()
        .zip(consumption_dual)
        .map(|(emissions, consumption)| -scale * emissions / (DUAL_EPSILON + consumption))
        .collect()
}
