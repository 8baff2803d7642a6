//! The Solver Driver (spec.md §4.1, §4.3): dispatches a built [`Problem`]
//! to either an in-process CBC solve via `good_lp` or an external solver
//! binary (`glpsol`, `gurobi_cl`, a standalone `cbc`) invoked as a
//! time-limited subprocess.
//!
//! `cbc` is the only solver with two paths: without a configured
//! `cbc_path` it runs in-process through `good_lp` (the teacher's own
//! `MilpOptimizer::solve_lp` shape); with one configured it runs the same
//! way `glpk`/`gurobi` do, as an external binary writing LP-format text.

pub mod inprocess;
pub mod lp_format;
pub mod process;

use crate::config::SolverBinaries;
use crate::domain::result::Optimality;
use crate::error::{CoreError, CoreResult};
use crate::model::ir::Problem;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverKind {
    Cbc,
    Glpk,
    Gurobi,
}

impl SolverKind {
    pub fn parse(name: &str) -> CoreResult<Self> {
        match name.to_ascii_lowercase().as_str() {
            "cbc" => Ok(Self::Cbc),
            "glpk" => Ok(Self::Glpk),
            "gurobi" => Ok(Self::Gurobi),
            other => Err(CoreError::SolverError(format!(
                "unknown solver {other:?}, expected one of: cbc, glpk, gurobi"
            ))),
        }
    }

    /// The command-line flag each solver uses for a wall-clock time limit
    /// (spec.md §4.3, transcribed from the source's per-solver dispatch).
    pub fn timelimit_flag(self, secs: u64) -> Vec<String> {
        match self {
            SolverKind::Glpk => vec!["--tmlim".to_string(), secs.to_string()],
            SolverKind::Gurobi => vec![format!("TimeLimit={secs}")],
            SolverKind::Cbc => vec!["sec".to_string(), secs.to_string()],
        }
    }
}

#[derive(Debug, Clone)]
pub struct SolveOptions {
    pub kind: SolverKind,
    pub timelimit_secs: u64,
    pub verbose: bool,
}

/// One value per [`crate::model::ir::VarId`], plus whether the search ran
/// to a proven optimum or was cut short by the time limit (spec.md §5).
#[derive(Debug, Clone)]
pub struct Solution {
    pub values: Vec<f64>,
    pub optimality: Optimality,
}

pub fn solve(problem: &Problem, options: &SolveOptions, binaries: &SolverBinaries) -> CoreResult<Solution> {
    match options.kind {
        SolverKind::Cbc => match &binaries.cbc_path {
            None => inprocess::solve(problem, options),
            Some(path) => process::solve(problem, options, path),
        },
        SolverKind::Glpk => {
            let binary = binaries
                .glpsol_path
                .as_deref()
                .ok_or_else(|| CoreError::SolverError("glpk selected but no glpsol_path configured".into()))?;
            process::solve(problem, options, binary)
        }
        SolverKind::Gurobi => {
            let binary = binaries
                .gurobi_cl_path
                .as_deref()
                .ok_or_else(|| CoreError::SolverError("gurobi selected but no gurobi_cl_path configured".into()))?;
            process::solve(problem, options, binary)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_solver_names_case_insensitively() {
        assert_eq!(SolverKind::parse("CBC").unwrap(), SolverKind::Cbc);
        assert_eq!(SolverKind::parse("glpk").unwrap(), SolverKind::Glpk);
        assert_eq!(SolverKind::parse("Gurobi").unwrap(), SolverKind::Gurobi);
    }

    #[test]
    fn rejects_unknown_solver_name() {
        assert!(SolverKind::parse("highs").is_err());
    }

    #[test]
    fn translates_timelimit_flag_per_solver() {
        assert_eq!(SolverKind::Glpk.timelimit_flag(30), vec!["--tmlim", "30"]);
        assert_eq!(SolverKind::Gurobi.timelimit_flag(30), vec!["TimeLimit=30"]);
        assert_eq!(SolverKind::Cbc.timelimit_flag(30), vec!["sec", "30"]);
    }
}
