//! Solve the SSP scenarios and write their solution files.

use crate::solution::{solution_file_name, SolveStatus, SolutionWriter, SolvedModel};
use log::info;
use rdice_core::errors::RdiceResult;
use std::fs;
use std::path::{Path, PathBuf};

/// Scenarios solved by [`run_scenarios`], in order.
pub const SCENARIOS: std::ops::RangeInclusive<u8> = 1..=5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolverOptions {
    pub max_iter: usize,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self { max_iter: 5000 }
    }
}

/// A solved model and how the solver terminated.
pub struct SolverOutcome {
    pub model: Box<dyn SolvedModel>,
    pub status: SolveStatus,
}

/// An optimisation backend able to solve a numbered SSP scenario.
pub trait Solver {
    fn solve(&mut self, scenario: u8, options: &SolverOptions) -> RdiceResult<SolverOutcome>;
}

/// Solve every scenario and write `ssp{n}_solution.txt` into `out_dir`.
///
/// Stops at the first scenario that fails to solve or to write.
/// Files of the scenarios before it are kept. A scenario's file is only created once
/// its solution has been formatted in full.
pub fn run_scenarios<S: Solver + ?Sized>(
    solver: &mut S,
    options: &SolverOptions,
    writer: &SolutionWriter,
    out_dir: &Path,
) -> RdiceResult<Vec<PathBuf>> {
    let mut written = Vec::new();
    for scenario in SCENARIOS {
        info!("Solving scenario SSP{}", scenario);
        let outcome = solver.solve(scenario, options)?;

        let mut content = Vec::new();
        writer.write(outcome.model.as_ref(), &outcome.status, &mut content)?;

        let path = out_dir.join(solution_file_name(scenario));
        fs::write(&path, content)?;
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solution::tests::{complete_solution, small_grid};
    use crate::solution::SolutionValues;
    use rdice_core::errors::RdiceError;
    use tempfile::tempdir;

    struct FakeSolver {
        calls: Vec<u8>,
        fail_at: Option<u8>,
        incomplete_at: Option<u8>,
    }

    impl FakeSolver {
        fn new(fail_at: Option<u8>) -> Self {
            Self {
                calls: Vec::new(),
                fail_at,
                incomplete_at: None,
            }
        }
    }

    impl Solver for FakeSolver {
        fn solve(&mut self, scenario: u8, options: &SolverOptions) -> RdiceResult<SolverOutcome> {
            assert_eq!(options.max_iter, 5000);
            self.calls.push(scenario);
            let status = if self.fail_at == Some(scenario) {
                SolveStatus::Infeasible
            } else {
                SolveStatus::Optimal
            };
            let mut model: SolutionValues = complete_solution(&small_grid());
            if self.incomplete_at == Some(scenario) {
                // Last tracked variable, so every line before it is formatted
                model.values.remove("utility");
            }
            Ok(SolverOutcome {
                model: Box::new(model),
                status,
            })
        }
    }

    #[test]
    fn test_writes_every_scenario() {
        let dir = tempdir().unwrap();
        let mut solver = FakeSolver::new(None);
        let writer = SolutionWriter::new(small_grid());

        let written =
            run_scenarios(&mut solver, &SolverOptions::default(), &writer, dir.path()).unwrap();

        assert_eq!(solver.calls, vec![1, 2, 3, 4, 5]);
        assert_eq!(written.len(), 5);
        let text = fs::read_to_string(dir.path().join("ssp3_solution.txt")).unwrap();
        assert!(text.starts_with("(run1: eta=1.4500000; rho=0.0150000)\n"));
    }

    #[test]
    fn test_stops_at_first_failure() {
        let dir = tempdir().unwrap();
        let mut solver = FakeSolver::new(Some(3));
        let writer = SolutionWriter::new(small_grid());

        let err = run_scenarios(&mut solver, &SolverOptions::default(), &writer, dir.path())
            .unwrap_err();

        assert!(matches!(err, RdiceError::NotOptimal(_)));
        assert_eq!(solver.calls, vec![1, 2, 3]);
        assert!(dir.path().join("ssp2_solution.txt").exists());
        assert!(!dir.path().join("ssp3_solution.txt").exists());
        assert!(!dir.path().join("ssp4_solution.txt").exists());
    }

    #[test]
    fn test_incomplete_solution_writes_no_file() {
        let dir = tempdir().unwrap();
        let mut solver = FakeSolver::new(None);
        solver.incomplete_at = Some(2);
        let writer = SolutionWriter::new(small_grid());

        let err = run_scenarios(&mut solver, &SolverOptions::default(), &writer, dir.path())
            .unwrap_err();

        assert!(matches!(
            err,
            RdiceError::MissingSolutionValue { ref name, year: 2015 } if name == "utility"
        ));
        assert_eq!(solver.calls, vec![1, 2]);
        assert!(dir.path().join("ssp1_solution.txt").exists());
        assert!(!dir.path().join("ssp2_solution.txt").exists());
    }

    #[test]
    fn test_missing_output_dir() {
        let dir = tempdir().unwrap();
        let mut solver = FakeSolver::new(None);
        let writer = SolutionWriter::new(small_grid());

        let err = run_scenarios(
            &mut solver,
            &SolverOptions::default(),
            &writer,
            &dir.path().join("missing"),
        )
        .unwrap_err();
        assert!(matches!(err, RdiceError::Output(_)));
        assert!(!err.is_load_failure());
        assert_eq!(solver.calls, vec![1]);
    }
}
