//! Per-region, per-year records of the regional dataset.

use crate::{FloatValue, Year};
use serde::{Deserialize, Serialize};

/// Identifier of the pseudo-region used for rows without a region.
pub const GLOBAL_REGION: &str = "global";

/// Numeric fields carried by every [`RegionalRecord`].
///
/// The names match the column headers of the regional data table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionalField {
    /// Baseline GDP without mitigation costs
    GdpBaseline,
    /// Mitigation rate (fraction of GDP)
    Mitigation,
    /// Population
    Pop,
    /// Industrial emission intensity
    EmiInd,
    GdpNet,
    GdpGross,
    Capital,
    Investments,
    Savings,
    Consumption,
}

impl RegionalField {
    pub const ALL: [RegionalField; 10] = [
        RegionalField::GdpBaseline,
        RegionalField::Mitigation,
        RegionalField::Pop,
        RegionalField::EmiInd,
        RegionalField::GdpNet,
        RegionalField::GdpGross,
        RegionalField::Capital,
        RegionalField::Investments,
        RegionalField::Savings,
        RegionalField::Consumption,
    ];

    /// Column name of the field.
    pub fn name(&self) -> &'static str {
        match self {
            RegionalField::GdpBaseline => "gdp_baseline",
            RegionalField::Mitigation => "mitigation",
            RegionalField::Pop => "pop",
            RegionalField::EmiInd => "emi_ind",
            RegionalField::GdpNet => "gdp_net",
            RegionalField::GdpGross => "gdp_gross",
            RegionalField::Capital => "capital",
            RegionalField::Investments => "investments",
            RegionalField::Savings => "savings",
            RegionalField::Consumption => "consumption",
        }
    }

    /// Look up a field by its column name.
    ///
    /// Returns `None` for names that are not regional fields.
    pub fn from_name(name: &str) -> Option<Self> {
        RegionalField::ALL
            .into_iter()
            .find(|field| field.name() == name)
    }
}

impl std::fmt::Display for RegionalField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Values of one region for one year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionalRecord {
    pub region: String,
    pub year: Year,
    pub gdp_baseline: FloatValue,
    pub mitigation: FloatValue,
    pub pop: FloatValue,
    pub emi_ind: FloatValue,
    pub gdp_net: FloatValue,
    pub gdp_gross: FloatValue,
    pub capital: FloatValue,
    pub investments: FloatValue,
    pub savings: FloatValue,
    pub consumption: FloatValue,
}

impl RegionalRecord {
    /// Get the value of a field.
    pub fn get(&self, field: RegionalField) -> FloatValue {
        match field {
            RegionalField::GdpBaseline => self.gdp_baseline,
            RegionalField::Mitigation => self.mitigation,
            RegionalField::Pop => self.pop,
            RegionalField::EmiInd => self.emi_ind,
            RegionalField::GdpNet => self.gdp_net,
            RegionalField::GdpGross => self.gdp_gross,
            RegionalField::Capital => self.capital,
            RegionalField::Investments => self.investments,
            RegionalField::Savings => self.savings,
            RegionalField::Consumption => self.consumption,
        }
    }

    /// Get the value of a field by column name.
    pub fn get_by_name(&self, name: &str) -> Option<FloatValue> {
        RegionalField::from_name(name).map(|field| self.get(field))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// A record with every field set to zero.
    pub(crate) fn zero_record(region: &str, year: Year) -> RegionalRecord {
        RegionalRecord {
            region: region.to_string(),
            year,
            gdp_baseline: 0.0,
            mitigation: 0.0,
            pop: 0.0,
            emi_ind: 0.0,
            gdp_net: 0.0,
            gdp_gross: 0.0,
            capital: 0.0,
            investments: 0.0,
            savings: 0.0,
            consumption: 0.0,
        }
    }

    #[test]
    fn test_field_names_round_trip() {
        for field in RegionalField::ALL {
            assert_eq!(RegionalField::from_name(field.name()), Some(field));
        }
    }

    #[test]
    fn test_unknown_field_name() {
        assert_eq!(RegionalField::from_name("temperature"), None);
        assert_eq!(RegionalField::from_name("GDP_BASELINE"), None);
    }

    #[test]
    fn test_field_serialization_matches_column_name() {
        let json = serde_json::to_string(&RegionalField::EmiInd).unwrap();
        assert_eq!(json, "\"emi_ind\"");
    }

    #[test]
    fn test_get_by_name() {
        let mut record = zero_record("r1", 2020);
        record.pop = 7.5;

        assert_eq!(record.get(RegionalField::Pop), 7.5);
        assert_eq!(record.get_by_name("pop"), Some(7.5));
        // Zero is a value, not an absence
        assert_eq!(record.get_by_name("savings"), Some(0.0));
        assert_eq!(record.get_by_name("unknown"), None);
    }
}
