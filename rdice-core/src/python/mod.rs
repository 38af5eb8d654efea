//! Python bindings for the regional data store and calculator.
//!
//! This module provides Python access to:
//! - [`PyVariableMetadata`] for variable metadata
//! - [`PyRegionalDataStore`] for lazily loaded regional data
//! - [`PyRegionalCalculator`] for the derived regional series

use crate::calculator::RegionalCalculator;
use crate::config::CalculationConfig;
use crate::errors::RdiceError;
use crate::results::Metric;
use crate::source::{CsvSource, DEFAULT_DATA_FILE, DEFAULT_INFO_FILE};
use crate::store::{LoadState, RegionalDataStore};
use crate::variable::VariableMetadata;
use crate::{FloatValue, Year};
use numpy::PyArray1;
use pyo3::exceptions::{PyIOError, PyKeyError, PyValueError};
use pyo3::prelude::*;
use std::sync::Arc;

fn to_py_err(err: RdiceError) -> PyErr {
    if err.is_load_failure() {
        PyIOError::new_err(err.to_string())
    } else {
        PyValueError::new_err(err.to_string())
    }
}

/// Configuration from optional overrides, falling back to [`CalculationConfig::default`].
fn calculation_config(
    regions: Option<Vec<String>>,
    start_year: Option<Year>,
    end_year: Option<Year>,
) -> CalculationConfig {
    let defaults = CalculationConfig::default();
    CalculationConfig {
        regions: regions.unwrap_or(defaults.regions),
        start_year: start_year.unwrap_or(defaults.start_year),
        end_year: end_year.unwrap_or(defaults.end_year),
    }
}

fn parse_metric(metric: &str) -> PyResult<Metric> {
    Metric::from_name(metric).ok_or_else(|| PyKeyError::new_err(format!("Unknown metric: {}", metric)))
}

/// Python wrapper for VariableMetadata.
#[pyclass(name = "VariableMetadata", module = "rdice.regional")]
#[derive(Clone)]
pub struct PyVariableMetadata(pub VariableMetadata);

#[pymethods]
impl PyVariableMetadata {
    #[new]
    pub fn new(name: String, external_name: String, description: String, unit: String) -> Self {
        PyVariableMetadata(VariableMetadata::new(name, external_name, description, unit))
    }

    #[getter]
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Name of the variable in the external modelling system.
    #[getter]
    pub fn external_name(&self) -> &str {
        &self.0.external_name
    }

    #[getter]
    pub fn description(&self) -> &str {
        &self.0.description
    }

    #[getter]
    pub fn unit(&self) -> &str {
        &self.0.unit
    }

    fn __repr__(&self) -> String {
        format!(
            "VariableMetadata(name='{}', external_name='{}', description='{}', unit='{}')",
            self.0.name, self.0.external_name, self.0.description, self.0.unit
        )
    }
}

/// Regional data read from two CSV files on first access.
#[pyclass(name = "RegionalDataStore", module = "rdice.regional")]
pub struct PyRegionalDataStore(pub Arc<RegionalDataStore<CsvSource>>);

#[pymethods]
impl PyRegionalDataStore {
    #[new]
    #[pyo3(signature = (info_path=DEFAULT_INFO_FILE.to_string(), data_path=DEFAULT_DATA_FILE.to_string()))]
    pub fn new(info_path: String, data_path: String) -> Self {
        PyRegionalDataStore(Arc::new(RegionalDataStore::new(CsvSource::new(
            info_path, data_path,
        ))))
    }

    /// Whether both tables have been loaded.
    #[getter]
    pub fn loaded(&self) -> bool {
        self.0.state() == LoadState::Loaded
    }

    /// Get the value of `field` for `region` in `year`, or None if there is no data.
    pub fn get_regional_data(
        &self,
        region: &str,
        year: Year,
        field: &str,
    ) -> PyResult<Option<FloatValue>> {
        self.0
            .get_regional_data(region, year, field)
            .map_err(to_py_err)
    }

    /// Get the metadata of a variable, or None if it is unknown.
    pub fn get_regional_info(&self, field: &str) -> PyResult<Option<PyVariableMetadata>> {
        self.0
            .get_regional_info(field)
            .map(|info| info.cloned().map(PyVariableMetadata))
            .map_err(to_py_err)
    }

    pub fn regions(&self) -> PyResult<Vec<String>> {
        self.0
            .regions()
            .map(|regions| regions.into_iter().map(str::to_string).collect())
            .map_err(to_py_err)
    }
}

/// Regional GDP, emissions and population over a fixed horizon.
#[pyclass(name = "RegionalCalculator", module = "rdice.regional")]
pub struct PyRegionalCalculator(pub RegionalCalculator<CsvSource>);

#[pymethods]
impl PyRegionalCalculator {
    #[new]
    #[pyo3(signature = (store, regions=None, start_year=None, end_year=None))]
    pub fn new(
        store: PyRef<'_, PyRegionalDataStore>,
        regions: Option<Vec<String>>,
        start_year: Option<Year>,
        end_year: Option<Year>,
    ) -> Self {
        PyRegionalCalculator(RegionalCalculator::new(
            Arc::clone(&store.0),
            calculation_config(regions, start_year, end_year),
        ))
    }

    pub fn calculate_gdp(&self, region: &str, year: Year) -> PyResult<FloatValue> {
        self.0.calculate_gdp(region, year).map_err(to_py_err)
    }

    pub fn calculate_emissions(&self, region: &str, year: Year) -> PyResult<FloatValue> {
        self.0.calculate_emissions(region, year).map_err(to_py_err)
    }

    pub fn run_all(&mut self) -> PyResult<()> {
        self.0.run_all().map_err(to_py_err)
    }

    /// Get a result series as a list of (year, value) tuples.
    pub fn series(&self, region: &str, metric: &str) -> PyResult<Vec<(Year, FloatValue)>> {
        let metric = parse_metric(metric)?;
        self.0
            .results()
            .series(region, metric)
            .map(|series| series.to_vec())
            .ok_or_else(|| PyKeyError::new_err(format!("Unknown region: {}", region)))
    }

    /// Get the values of a result series as a numpy array.
    pub fn values<'py>(
        &self,
        py: Python<'py>,
        region: &str,
        metric: &str,
    ) -> PyResult<Bound<'py, PyArray1<FloatValue>>> {
        let values = self
            .series(region, metric)?
            .into_iter()
            .map(|(_, value)| value)
            .collect::<Vec<_>>();
        Ok(PyArray1::from_vec_bound(py, values))
    }
}

#[pymodule]
pub fn regional(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyVariableMetadata>()?;
    m.add_class::<PyRegionalDataStore>()?;
    m.add_class::<PyRegionalCalculator>()?;
    Ok(())
}
