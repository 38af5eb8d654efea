//! Per-region result series produced by the regional calculations.

use crate::errors::{RdiceError, RdiceResult};
use crate::{FloatValue, Year};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Write;

/// Quantity tracked for each region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Metric {
    /// GDP net of mitigation costs
    #[serde(rename = "GDP")]
    Gdp,
    #[serde(rename = "emissions")]
    Emissions,
    #[serde(rename = "population")]
    Population,
}

impl Metric {
    pub const ALL: [Metric; 3] = [Metric::Gdp, Metric::Emissions, Metric::Population];

    pub fn name(&self) -> &'static str {
        match self {
            Metric::Gdp => "GDP",
            Metric::Emissions => "emissions",
            Metric::Population => "population",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Metric::ALL.into_iter().find(|metric| metric.name() == name)
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A sequence of `(year, value)` pairs with strictly increasing years.
pub type Series = Vec<(Year, FloatValue)>;

/// Series of a single region, one per metric.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegionResults {
    pub region: String,
    pub series: BTreeMap<Metric, Series>,
}

impl RegionResults {
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            series: Metric::ALL.iter().map(|m| (*m, Series::new())).collect(),
        }
    }

    /// Append a value to a metric's series.
    ///
    /// Fails if `year` does not come strictly after the last year of that series.
    pub fn push(&mut self, metric: Metric, year: Year, value: FloatValue) -> RdiceResult<()> {
        let series = self.series.entry(metric).or_default();
        if let Some(&(last, _)) = series.last() {
            if year <= last {
                return Err(RdiceError::NonAscendingYear {
                    region: self.region.clone(),
                    metric: metric.to_string(),
                    last,
                    year,
                });
            }
        }
        series.push((year, value));
        Ok(())
    }

    pub fn get(&self, metric: Metric) -> &[(Year, FloatValue)] {
        self.series.get(&metric).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Results of all configured regions.
///
/// Regions keep the order they were configured in.
/// The table is only ever appended to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegionalResultTable {
    regions: Vec<RegionResults>,
}

impl RegionalResultTable {
    /// Create an empty table for a fixed set of regions.
    pub fn new<I, R>(regions: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<String>,
    {
        Self {
            regions: regions.into_iter().map(RegionResults::new).collect(),
        }
    }

    pub fn regions(&self) -> impl Iterator<Item = &str> {
        self.regions.iter().map(|r| r.region.as_str())
    }

    pub fn region(&self, region: &str) -> Option<&RegionResults> {
        self.regions.iter().find(|r| r.region == region)
    }

    fn region_mut(&mut self, region: &str) -> RdiceResult<&mut RegionResults> {
        self.regions
            .iter_mut()
            .find(|r| r.region == region)
            .ok_or_else(|| RdiceError::UnknownRegion(region.to_string()))
    }

    pub fn push(
        &mut self,
        region: &str,
        metric: Metric,
        year: Year,
        value: FloatValue,
    ) -> RdiceResult<()> {
        self.region_mut(region)?.push(metric, year, value)
    }

    /// Append every series of `results` to the matching region.
    pub fn extend(&mut self, results: RegionResults) -> RdiceResult<()> {
        let target = self.region_mut(&results.region)?;
        for (metric, series) in results.series {
            for (year, value) in series {
                target.push(metric, year, value)?;
            }
        }
        Ok(())
    }

    pub fn series(&self, region: &str, metric: Metric) -> Option<&[(Year, FloatValue)]> {
        self.region(region).map(|r| r.get(metric))
    }

    pub fn iter(&self) -> impl Iterator<Item = &RegionResults> {
        self.regions.iter()
    }

    /// Write the table in long format (`region,metric,year,value`).
    pub fn write_csv<W: Write>(&self, writer: W) -> csv::Result<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record(["region", "metric", "year", "value"])?;
        for region in &self.regions {
            for (metric, series) in &region.series {
                for (year, value) in series {
                    let year = year.to_string();
                    let value = value.to_string();
                    wtr.write_record([
                        region.region.as_str(),
                        metric.name(),
                        year.as_str(),
                        value.as_str(),
                    ])?;
                }
            }
        }
        wtr.flush()?;
        Ok(())
    }
}
