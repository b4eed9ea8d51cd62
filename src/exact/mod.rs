//! Exact solvers module.
//!
//! Both problems are posed as 0/1 integer programs ([`model::BinaryProgram`])
//! and handed to a MIP backend. With the default `highs` feature the backend
//! is HiGHS through `good_lp`; without it every exact entry point reports
//! [`ExactError::SolverUnavailable`].

pub mod backend;
pub mod burning;
pub mod dominating;
pub mod model;

#[cfg(feature = "highs")]
mod highs;
#[cfg(feature = "highs")]
pub use highs::HighsBackend;

pub use backend::{default_backend, BackendOutcome, IlpBackend};
pub use burning::{BurningIlp, SearchStrategy};
pub use dominating::DistanceDominatingSetIlp;

use crate::solution::{Solution, SolveStatus};
use std::time::Duration;

/// Errors raised by the exact solvers
#[derive(Debug, thiserror::Error)]
pub enum ExactError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Solver not available: {0}")]
    SolverUnavailable(String),

    #[error("Solver execution failed: {0}")]
    Backend(String),
}

/// MIP solver configuration
#[derive(Debug, Clone)]
pub struct IlpConfig {
    /// Wall-clock budget; `None` (or zero) means no limit
    pub time_limit: Option<Duration>,
    /// Solver worker threads (0 = solver default)
    pub threads: u32,
    /// Relative MIP gap tolerance
    pub mip_gap: f64,
    /// Let the backend print its log
    pub verbose: bool,
}

impl Default for IlpConfig {
    fn default() -> Self {
        IlpConfig {
            time_limit: Some(Duration::from_millis(1000)),
            threads: 0,
            mip_gap: 1e-6,
            verbose: false,
        }
    }
}

impl IlpConfig {
    /// Config with a time limit in milliseconds (0 = unlimited)
    pub fn with_timeout_ms(timeout_ms: u64) -> Self {
        IlpConfig {
            time_limit: timeout_from_ms(timeout_ms),
            ..Default::default()
        }
    }

    /// Time limit in seconds, if one is set
    pub fn time_limit_secs(&self) -> Option<f64> {
        self.time_limit
            .filter(|limit| !limit.is_zero())
            .map(|limit| limit.as_secs_f64())
    }
}

/// `0` means "no limit"
pub fn timeout_from_ms(timeout_ms: u64) -> Option<Duration> {
    if timeout_ms == 0 {
        None
    } else {
        Some(Duration::from_millis(timeout_ms))
    }
}

/// Result of exact solving
#[derive(Debug, Clone)]
pub struct ExactResult {
    /// Best solution found (check `solution.feasible`)
    pub solution: Solution,
    /// Whether optimality was proven
    pub optimal: bool,
    /// Best proven lower bound on the optimum
    pub lower_bound: usize,
    /// Size of the solution, if one was found
    pub upper_bound: Option<usize>,
    /// Number of integer programs handed to the backend
    pub models_solved: usize,
}

impl ExactResult {
    pub fn status(&self) -> SolveStatus {
        self.solution.status
    }

    /// Relative gap between bounds, `None` without a solution
    pub fn gap(&self) -> Option<f64> {
        self.upper_bound.map(|ub| {
            if ub == 0 {
                0.0
            } else {
                (ub - self.lower_bound.min(ub)) as f64 / ub as f64
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_time_limit() {
        assert_eq!(IlpConfig::default().time_limit_secs(), Some(1.0));
        assert_eq!(IlpConfig::with_timeout_ms(0).time_limit_secs(), None);
        assert_eq!(IlpConfig::with_timeout_ms(250).time_limit_secs(), Some(0.25));
    }
}
