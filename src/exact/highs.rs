//! HiGHS backend through `good_lp`.
//!
//! Binary variables become integer columns in `[0, 1]`; rows are added as
//! `good_lp` constraints. The time limit, thread count, MIP gap and verbosity
//! of [`IlpConfig`] are forwarded as HiGHS options.

use super::backend::{BackendOutcome, IlpBackend};
use super::model::{BinaryProgram, ConstraintSense};
use super::{ExactError, IlpConfig};
use crate::solution::SolveStatus;
use good_lp::solvers::highs::highs;
use good_lp::{
    variable, Expression, ProblemVariables, ResolutionError, Solution as GoodLpSolutionTrait, SolutionStatus,
    SolverModel, Variable as GoodLpVariable,
};
use std::time::Instant;

pub struct HighsBackend;

impl HighsBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for HighsBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Status of an assignment HiGHS returned, given the program's objective value
fn solved_status(status: SolutionStatus, program: &BinaryProgram, objective: f64, mip_gap: f64) -> SolveStatus {
    match status {
        SolutionStatus::Optimal => SolveStatus::Optimal,
        SolutionStatus::TimeLimit => SolveStatus::Feasible,
        // With integral costs a relative gap below 1 / objective leaves no room
        // for a strictly better integer objective.
        SolutionStatus::GapLimit if program.has_integral_objective() && mip_gap * objective < 1.0 => {
            SolveStatus::Optimal
        }
        SolutionStatus::GapLimit => SolveStatus::Feasible,
    }
}

/// Outcome for a solve that returned no assignment
fn failed_outcome(error: ResolutionError, solve_time: f64) -> Result<BackendOutcome, ExactError> {
    match error {
        ResolutionError::Infeasible => Ok(BackendOutcome::infeasible(solve_time)),
        // HiGHS stopped (time, iteration or memory limit) before any incumbent
        ResolutionError::Other("NoSolutionFound") => Ok(BackendOutcome::timed_out(solve_time)),
        e => Err(ExactError::Backend(e.to_string())),
    }
}

impl IlpBackend for HighsBackend {
    fn solve(&self, program: &BinaryProgram, config: &IlpConfig) -> Result<BackendOutcome, ExactError> {
        let mut vars = ProblemVariables::new();
        let lp_variables: Vec<GoodLpVariable> = program
            .var_names
            .iter()
            .map(|name| vars.add(variable().binary().name(name.clone())))
            .collect();

        let mut objective: Expression = 0.into();
        for &(i, coeff) in &program.objective {
            objective += coeff * lp_variables[i];
        }

        let mut lp_model = vars.minimise(objective).using(highs);
        lp_model.set_verbose(config.verbose);
        let mut lp_model = lp_model
            .set_mip_rel_gap(config.mip_gap as f32)
            .map_err(|e| ExactError::InvalidInput(format!("MIP gap {}: {}", config.mip_gap, e)))?;

        if config.threads > 0 {
            lp_model = lp_model.set_threads(config.threads);
        }
        if let Some(seconds) = config.time_limit_secs() {
            lp_model = lp_model.set_time_limit(seconds);
        }

        for constraint in &program.constraints {
            let mut lhs: Expression = 0.into();
            for &(i, coeff) in &constraint.terms {
                lhs += coeff * lp_variables[i];
            }

            lp_model = match constraint.sense {
                ConstraintSense::LessOrEqual => lp_model.with(lhs.leq(constraint.rhs)),
                ConstraintSense::Equal => lp_model.with(lhs.eq(constraint.rhs)),
                ConstraintSense::GreaterOrEqual => lp_model.with(lhs.geq(constraint.rhs)),
            };
        }

        log::debug!(
            "HiGHS: solving '{}' ({} vars, {} rows)",
            program.name,
            program.num_vars(),
            program.num_constraints()
        );

        let start = Instant::now();
        let result = lp_model.solve();
        let solve_time = start.elapsed().as_secs_f64();

        let sol = match result {
            Ok(sol) => sol,
            Err(e) => return failed_outcome(e, solve_time),
        };

        let values: Vec<bool> = lp_variables.iter().map(|&var| sol.value(var) > 0.5).collect();
        if !program.is_satisfied_by(&values) {
            log::debug!("HiGHS: rounded assignment for '{}' violates a row", program.name);
            return Ok(BackendOutcome::timed_out(solve_time));
        }

        let status = solved_status(sol.status(), program, program.objective_value(&values), config.mip_gap);
        Ok(BackendOutcome {
            status,
            values: Some(values),
            solve_time,
        })
    }

    fn name(&self) -> &str {
        "HiGHS"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counting_program() -> BinaryProgram {
        let mut program = BinaryProgram::new("count");
        let x: Vec<usize> = (0..3).map(|i| program.add_var(format!("x_{}", i))).collect();
        program.add_sum_geq(&x, 1.0);
        program.minimise_count(&x);
        program
    }

    #[test]
    fn test_solution_status_mapping() {
        let program = counting_program();
        assert_eq!(solved_status(SolutionStatus::Optimal, &program, 1.0, 1e-6), SolveStatus::Optimal);
        assert_eq!(solved_status(SolutionStatus::TimeLimit, &program, 1.0, 1e-6), SolveStatus::Feasible);
        assert_eq!(solved_status(SolutionStatus::GapLimit, &program, 5.0, 1e-6), SolveStatus::Optimal);
        assert_eq!(solved_status(SolutionStatus::GapLimit, &program, 5.0, 0.5), SolveStatus::Feasible);
    }

    #[test]
    fn test_no_incumbent_is_a_timeout() {
        let outcome = failed_outcome(ResolutionError::Other("NoSolutionFound"), 0.5).unwrap();
        assert_eq!(outcome.status, SolveStatus::TimeLimit);
        assert!(outcome.values.is_none());

        let outcome = failed_outcome(ResolutionError::Infeasible, 0.5).unwrap();
        assert_eq!(outcome.status, SolveStatus::Infeasible);

        assert!(matches!(
            failed_outcome(ResolutionError::Other("SolveError"), 0.5),
            Err(ExactError::Backend(_))
        ));
    }

    #[test]
    fn test_solves_small_program() {
        let program = counting_program();
        let outcome = HighsBackend::new().solve(&program, &IlpConfig::default()).unwrap();
        assert_eq!(outcome.status, SolveStatus::Optimal);
        let values = outcome.values.unwrap();
        assert_eq!(values.iter().filter(|&&v| v).count(), 1);
    }

    #[test]
    fn test_options_are_accepted() {
        let config = IlpConfig {
            threads: 1,
            verbose: true,
            ..IlpConfig::with_timeout_ms(5_000)
        };
        let outcome = HighsBackend::new().solve(&counting_program(), &config).unwrap();
        assert!(outcome.values.is_some());
    }
}
