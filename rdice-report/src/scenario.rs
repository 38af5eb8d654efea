//! Chart styling per scenario.
//!
//! Scenarios are recognised by a substring of their file name, checked in the order
//! `reference`, `ssp1` .. `ssp5`. Anything else gets a faint black line and an
//! `unknown_` legend.

use serde::{Deserialize, Serialize};

/// Line colour, opacity and legend label of a scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioStyle {
    pub color: String,
    pub alpha: f64,
    pub legend: String,
}

/// (substring, colour, alpha, legend)
const KNOWN_SCENARIOS: [(&str, &str, f64, &str); 6] = [
    ("reference", "k", 1.0, "DICE-2020"),
    ("ssp1", "g", 0.7, "SSP1-1.9"),
    ("ssp2", "gold", 0.7, "SSP1-2.6"),
    ("ssp3", "orange", 0.7, "SSP2-4.5"),
    ("ssp4", "r", 0.7, "SSP3-7.0"),
    ("ssp5", "m", 0.7, "SSP5-8.5"),
];

impl ScenarioStyle {
    pub fn for_scenario(scenario: &str) -> Self {
        KNOWN_SCENARIOS
            .iter()
            .find(|(pattern, ..)| scenario.contains(pattern))
            .map(|(_, color, alpha, legend)| ScenarioStyle {
                color: color.to_string(),
                alpha: *alpha,
                legend: legend.to_string(),
            })
            .unwrap_or_else(|| ScenarioStyle {
                color: "k".to_string(),
                alpha: 0.2,
                legend: format!("unknown_{}", scenario),
            })
    }
}

/// Whether a scenario is the reference run.
pub fn is_reference(scenario: &str) -> bool {
    scenario.contains("reference")
}
