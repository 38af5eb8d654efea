//! Run configuration
//!
//! Configuration is read from a TOML file. Every section and key is optional and
//! falls back to the defaults below.
//!
//! ```toml
//! [data]
//! info_path = "CBA_regional_info.csv"
//! data_path = "CBA_regional_data.csv"
//!
//! [calculation]
//! regions = ["region1", "region2", "region3"]
//! start_year = 2015
//! end_year = 2100
//!
//! [time]
//! start_year = 2015
//! year_step = 5
//! total_steps = 100
//! ```

use crate::errors::{RdiceError, RdiceResult};
use crate::source::CsvSource;
use crate::Year;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Regions and horizon of the regional calculations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalculationConfig {
    /// Regions to calculate, in output order
    pub regions: Vec<String>,
    /// First year of the horizon (inclusive)
    pub start_year: Year,
    /// End of the horizon (exclusive)
    pub end_year: Year,
}

impl Default for CalculationConfig {
    fn default() -> Self {
        Self {
            regions: vec![
                "region1".to_string(),
                "region2".to_string(),
                "region3".to_string(),
            ],
            start_year: 2015,
            end_year: 2100,
        }
    }
}

impl CalculationConfig {
    /// Years of the horizon, ascending.
    pub fn years(&self) -> std::ops::Range<Year> {
        self.start_year..self.end_year
    }

    /// Number of years in the horizon.
    pub fn horizon_len(&self) -> usize {
        self.years().len()
    }
}

/// Time grid of the optimisation model.
///
/// Each solved variable has `total_steps + 1` values, one per step starting at `start_year`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeGrid {
    pub start_year: Year,
    pub year_step: Year,
    pub total_steps: usize,
}

impl Default for TimeGrid {
    fn default() -> Self {
        Self {
            start_year: 2015,
            year_step: 5,
            total_steps: 100,
        }
    }
}

impl TimeGrid {
    /// Calendar year of a step.
    pub fn year(&self, step: usize) -> Year {
        self.start_year + self.year_step * step as Year
    }

    /// Number of values per variable.
    pub fn value_count(&self) -> usize {
        self.total_steps + 1
    }

    /// Years of every step.
    pub fn years(&self) -> impl Iterator<Item = Year> + '_ {
        (0..self.value_count()).map(|step| self.year(step))
    }

    /// Calendar year of the last step.
    pub fn last_year(&self) -> Year {
        self.year(self.total_steps)
    }

    /// Step years up to and including `until`, never past the last step.
    pub fn years_until(&self, until: Year) -> Vec<Year> {
        self.years().take_while(|year| *year <= until).collect()
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RdiceConfig {
    pub data: CsvSource,
    pub calculation: CalculationConfig,
    pub time: TimeGrid,
}

impl RdiceConfig {
    pub fn from_toml(content: &str) -> RdiceResult<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> RdiceResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| RdiceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RdiceConfig::default();

        assert_eq!(config.calculation.regions, vec!["region1", "region2", "region3"]);
        assert_eq!(config.calculation.horizon_len(), 85);
        assert_eq!(config.time.value_count(), 101);
        assert_eq!(config.data, CsvSource::default());
    }

    #[test]
    fn test_partial_toml() {
        let config = RdiceConfig::from_toml(
            r#"
            [calculation]
            regions = ["usa", "eu"]

            [data]
            data_path = "data/regional.csv"
            "#,
        )
        .unwrap();

        assert_eq!(config.calculation.regions, vec!["usa", "eu"]);
        assert_eq!(config.calculation.start_year, 2015);
        assert_eq!(config.data.data_path, Path::new("data/regional.csv"));
        assert_eq!(config.data.info_path, CsvSource::default().info_path);
        assert_eq!(config.time, TimeGrid::default());
    }

    #[test]
    fn test_invalid_toml() {
        let err = RdiceConfig::from_toml("[calculation]\nstart_year = \"soon\"").unwrap_err();
        assert!(matches!(err, RdiceError::Config(_)));
    }

    #[test]
    fn test_time_grid() {
        let grid = TimeGrid::default();

        assert_eq!(grid.year(0), 2015);
        assert_eq!(grid.year(100), 2515);
        assert_eq!(grid.years().last(), Some(2515));
        assert_eq!(grid.years_until(2100).len(), 18);
        assert_eq!(grid.years_until(2100).last(), Some(&2100));
        assert_eq!(grid.years_until(2515).len(), 101);
        assert_eq!(grid.last_year(), 2515);
    }

    #[test]
    fn test_years_until_is_bounded_by_grid() {
        let grid = TimeGrid::default();

        assert_eq!(grid.years_until(2103), grid.years_until(2100));
        assert_eq!(grid.years_until(i32::MAX).len(), 101);
        assert!(grid.years_until(2014).is_empty());
    }
}
