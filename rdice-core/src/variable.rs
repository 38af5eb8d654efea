//! Variable metadata for regional data.
//!
//! Every numeric column of the regional dataset is described by one row of the
//! metadata table (`CBA_regional_info.csv`):
//! - the variable name used by this crate (e.g. `gdp_baseline`)
//! - the name of the same quantity in the external modelling system (`gdx_variable`)
//! - a human-readable description
//! - the unit of measure
//!
//! # Example
//!
//! ```rust
//! use rdice_core::variable::VariableMetadata;
//!
//! let pop = VariableMetadata::new("pop", "POP", "Population", "million people");
//! assert_eq!(pop.external_name, "POP");
//! ```

use serde::{Deserialize, Serialize};

/// Metadata describing a single regional variable.
///
/// Created in bulk when the metadata table is loaded and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableMetadata {
    /// Unique identifier for the variable (e.g., "gdp_baseline")
    #[serde(rename = "variable")]
    pub name: String,
    /// Name of the variable in the external modelling system
    #[serde(rename = "gdx_variable")]
    pub external_name: String,
    /// Human-readable description
    pub description: String,
    /// Unit of measure (e.g., "trillion USD")
    pub unit: String,
}

impl VariableMetadata {
    /// Create a new variable metadata entry.
    ///
    /// # Arguments
    ///
    /// * `name` - Unique identifier for the variable
    /// * `external_name` - Name of the variable in the external modelling system
    /// * `description` - Human-readable description
    /// * `unit` - Unit of measure
    pub fn new(
        name: impl Into<String>,
        external_name: impl Into<String>,
        description: impl Into<String>,
        unit: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            external_name: external_name.into(),
            description: description.into(),
            unit: unit.into(),
        }
    }
}

impl std::fmt::Display for VariableMetadata {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({}) [{}]: {}",
            self.name, self.external_name, self.unit, self.description
        )
    }
}
