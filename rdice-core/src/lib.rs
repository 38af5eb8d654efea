//! Regional data handling for DICE-style climate-economy models.
//!
//! - [`store::RegionalDataStore`] lazily loads the regional metadata and records once
//!   and serves every later lookup from memory.
//! - [`calculator::RegionalCalculator`] derives GDP, emissions and population series
//!   for a fixed set of regions and years.

pub mod calculator;
pub mod config;
pub mod errors;
#[cfg(feature = "python")]
pub mod python;
pub mod record;
pub mod results;
pub mod source;
pub mod store;
pub mod variable;

pub type FloatValue = f64;
pub type Year = i32;
