//! Solver backend interface.

use super::model::BinaryProgram;
use super::{ExactError, IlpConfig};
use crate::solution::SolveStatus;

/// What a backend returns for one [`BinaryProgram`]
#[derive(Debug, Clone)]
pub struct BackendOutcome {
    /// `Optimal`, `Feasible` (stopped by the time limit with an incumbent),
    /// `Infeasible` or `TimeLimit` (stopped with nothing usable)
    pub status: SolveStatus,
    /// Rounded 0/1 assignment, when the solver produced one
    pub values: Option<Vec<bool>>,
    /// Wall-clock time spent in the solver, seconds
    pub solve_time: f64,
}

impl BackendOutcome {
    pub fn infeasible(solve_time: f64) -> Self {
        BackendOutcome {
            status: SolveStatus::Infeasible,
            values: None,
            solve_time,
        }
    }

    pub fn timed_out(solve_time: f64) -> Self {
        BackendOutcome {
            status: SolveStatus::TimeLimit,
            values: None,
            solve_time,
        }
    }
}

/// A MIP solver able to minimise a [`BinaryProgram`]
pub trait IlpBackend: Send + Sync {
    fn solve(&self, program: &BinaryProgram, config: &IlpConfig) -> Result<BackendOutcome, ExactError>;

    fn name(&self) -> &str;
}

/// The backend compiled into this build
#[cfg(feature = "highs")]
pub fn default_backend() -> Result<Box<dyn IlpBackend>, ExactError> {
    Ok(Box::new(super::highs::HighsBackend::new()))
}

#[cfg(not(feature = "highs"))]
pub fn default_backend() -> Result<Box<dyn IlpBackend>, ExactError> {
    Err(ExactError::SolverUnavailable(
        "no MIP backend enabled in this build (enable the `highs` feature)".to_string(),
    ))
}
