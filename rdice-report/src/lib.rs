//! Reporting for DICE-style scenario runs.
//!
//! Solved scenarios are written as solution files ([`solution`], [`driver`]) which are
//! then read back into chart data ([`charts`]) styled per scenario ([`scenario`]).

pub mod charts;
pub mod driver;
pub mod scenario;
pub mod solution;
