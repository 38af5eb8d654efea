//! Derived regional quantities
//!
//! The calculator derives net GDP and emissions for every configured region and year
//! from the [`RegionalDataStore`] and collects them in a [`RegionalResultTable`]:
//!
//! $$ GDP = GDP_{baseline} \cdot (1 - \mu) $$
//! $$ E = P \cdot \sigma_{ind} $$
//!
//! Where:
//! - $\mu$ is the mitigation rate
//! - $P$ is the population
//! - $\sigma_{ind}$ is the industrial emission intensity
//!
//! Missing inputs are never replaced by a default value.
//! Any lookup that finds no data fails with [`RdiceError::DataAbsent`].

use crate::config::CalculationConfig;
use crate::errors::{RdiceError, RdiceResult};
use crate::record::RegionalField;
use crate::results::{Metric, RegionResults, RegionalResultTable};
use crate::source::{CsvSource, RegionalSource};
use crate::store::RegionalDataStore;
use crate::{FloatValue, Year};
use log::{debug, info};
use std::sync::Arc;

/// Calculates regional GDP, emissions and population over a fixed horizon.
pub struct RegionalCalculator<S = CsvSource> {
    store: Arc<RegionalDataStore<S>>,
    config: CalculationConfig,
    results: RegionalResultTable,
}

impl<S: RegionalSource> RegionalCalculator<S> {
    /// Create a calculator with an empty result table for the configured regions.
    pub fn new(store: Arc<RegionalDataStore<S>>, config: CalculationConfig) -> Self {
        let results = RegionalResultTable::new(config.regions.iter().cloned());
        Self {
            store,
            config,
            results,
        }
    }

    pub fn config(&self) -> &CalculationConfig {
        &self.config
    }

    pub fn store(&self) -> &RegionalDataStore<S> {
        &self.store
    }

    pub fn results(&self) -> &RegionalResultTable {
        &self.results
    }

    pub fn into_results(self) -> RegionalResultTable {
        self.results
    }

    fn require(&self, region: &str, year: Year, field: RegionalField) -> RdiceResult<FloatValue> {
        self.store
            .get_field(region, year, field)?
            .ok_or_else(|| RdiceError::DataAbsent {
                region: region.to_string(),
                year,
                field: field.name().to_string(),
            })
    }

    /// GDP net of mitigation costs.
    pub fn calculate_gdp(&self, region: &str, year: Year) -> RdiceResult<FloatValue> {
        let gdp_baseline = self.require(region, year, RegionalField::GdpBaseline)?;
        let mitigation = self.require(region, year, RegionalField::Mitigation)?;
        Ok(gdp_baseline * (1.0 - mitigation))
    }

    /// Industrial emissions.
    pub fn calculate_emissions(&self, region: &str, year: Year) -> RdiceResult<FloatValue> {
        let pop = self.require(region, year, RegionalField::Pop)?;
        let emi_ind = self.require(region, year, RegionalField::EmiInd)?;
        Ok(pop * emi_ind)
    }

    pub fn population(&self, region: &str, year: Year) -> RdiceResult<FloatValue> {
        self.require(region, year, RegionalField::Pop)
    }

    /// Calculate all metrics of one region over the horizon.
    pub fn calculate_region(&self, region: &str) -> RdiceResult<RegionResults> {
        let mut results = RegionResults::new(region);
        for year in self.config.years() {
            results.push(Metric::Gdp, year, self.calculate_gdp(region, year)?)?;
            results.push(Metric::Emissions, year, self.calculate_emissions(region, year)?)?;
            results.push(Metric::Population, year, self.population(region, year)?)?;
        }
        Ok(results)
    }

    /// Calculate every configured region and append the series to the result table.
    ///
    /// Stops at the first region that cannot be calculated.
    /// Regions are committed to the table whole, so the table never holds a partial region.
    pub fn run_all(&mut self) -> RdiceResult<()> {
        info!(
            "Calculating {} regions for {}..{}",
            self.config.regions.len(),
            self.config.start_year,
            self.config.end_year
        );
        for region in &self.config.regions {
            let results = self.calculate_region(region)?;
            debug!("Calculated region '{}'", region);
            self.results.extend(results)?;
        }
        Ok(())
    }
}
