//! Exact minimum distance-k dominating set.
//!
//! The formulation uses:
//! - Binary variables x[v]: vertex v is in the dominating set
//! - One covering row per vertex v: Σ x[u] >= 1 over u in N_k[v]
//! - Objective: minimise Σ x[v]

use super::backend::{default_backend, IlpBackend};
use super::model::BinaryProgram;
use super::{ExactError, ExactResult, IlpConfig};
use crate::graph::Graph;
use crate::solution::{DominatingSetOutput, Problem, Solution, SolveStatus};
use std::time::{Duration, Instant};

/// ILP solver for the distance dominating set problem
pub struct DistanceDominatingSetIlp {
    config: IlpConfig,
    backend: Box<dyn IlpBackend>,
}

impl DistanceDominatingSetIlp {
    pub fn new(config: IlpConfig) -> Result<Self, ExactError> {
        Ok(Self::with_backend(config, default_backend()?))
    }

    pub fn with_backend(config: IlpConfig, backend: Box<dyn IlpBackend>) -> Self {
        DistanceDominatingSetIlp { config, backend }
    }

    pub fn config(&self) -> &IlpConfig {
        &self.config
    }

    /// Build the covering program; variable `v` is vertex `v`
    pub fn build_program(graph: &Graph, distance: usize) -> BinaryProgram {
        let n = graph.num_nodes();
        let mut program = BinaryProgram::new(&format!("dom_{}_k{}", graph.name, distance));

        let x: Vec<usize> = (0..n).map(|i| program.add_var(format!("x_{}", i))).collect();

        for v in 0..n {
            let cover: Vec<usize> = graph.ball(v, distance).into_iter().map(|u| x[u]).collect();
            program.add_sum_geq(&cover, 1.0);
        }

        program.minimise_count(&x);
        program
    }

    /// Solve to optimality (or until the time limit)
    pub fn solve(&self, graph: &Graph, distance: usize) -> Result<ExactResult, ExactError> {
        let start = Instant::now();
        let problem = Problem::DistanceDomination { distance };
        let algorithm = format!("ILP-{}", self.backend.name());

        if graph.is_empty() {
            let mut solution = Solution::from_indices(graph, problem, &[], &algorithm);
            solution.status = SolveStatus::Optimal;
            return Ok(ExactResult {
                solution,
                optimal: true,
                lower_bound: 0,
                upper_bound: Some(0),
                models_solved: 0,
            });
        }

        let program = Self::build_program(graph, distance);
        log::debug!(
            "Dominating set ILP for '{}' (k={}): {} vars, {} rows",
            graph.name,
            distance,
            program.num_vars(),
            program.num_constraints()
        );

        let outcome = self.backend.solve(&program, &self.config)?;

        let mut solution = match &outcome.values {
            Some(values) => {
                let chosen: Vec<usize> = (0..graph.num_nodes()).filter(|&v| values[v]).collect();
                Solution::from_indices(graph, problem, &chosen, &algorithm)
            }
            None => Solution::new(problem, &algorithm),
        };

        solution.status = if solution.feasible {
            outcome.status
        } else if outcome.status == SolveStatus::Infeasible {
            SolveStatus::Infeasible
        } else {
            SolveStatus::TimeLimit
        };
        solution.computation_time = start.elapsed().as_secs_f64();

        let optimal = solution.feasible && solution.status == SolveStatus::Optimal;
        let size = solution.feasible.then(|| solution.size());
        let lower_bound = if optimal { solution.size() } else { 1 };
        solution.lower_bound = Some(lower_bound);

        log::info!(
            "Dominating set (k={}) on '{}': status {}, size {:?}, {:.3}s",
            distance,
            graph.name,
            solution.status,
            size,
            solution.computation_time
        );

        Ok(ExactResult {
            solution,
            optimal,
            lower_bound,
            upper_bound: size,
            models_solved: 1,
        })
    }
}

/// Solve the distance dominating set ILP and return `{"dom_set": [...]}`.
///
/// Returns `None` when the solver times out, the model is infeasible, or no
/// backend is available.
pub fn run_ilp(graph: &Graph, distance: usize, timeout: Option<Duration>) -> Option<DominatingSetOutput> {
    let config = IlpConfig {
        time_limit: timeout,
        ..Default::default()
    };

    let solver = match DistanceDominatingSetIlp::new(config) {
        Ok(solver) => solver,
        Err(e) => {
            log::warn!("Dominating set ILP unavailable: {}", e);
            return None;
        }
    };

    match solver.solve(graph, distance) {
        Ok(result) if result.solution.feasible => result.solution.to_dominating_output(),
        Ok(result) => {
            log::debug!("No dominating set found: {}", result.status());
            None
        }
        Err(e) => {
            log::warn!("Dominating set ILP failed: {}", e);
            None
        }
    }
}

#[cfg(all(test, feature = "highs"))]
mod tests {
    use super::*;
    use crate::graph::GraphSpec;
    use crate::heuristics::{GreedyDominatingSet, Heuristic, MultiStartDominatingSet};
    use crate::solution::distance_dominates;
    use rstest::rstest;

    fn solve(graph: &Graph, k: usize) -> DominatingSetOutput {
        run_ilp(graph, k, Some(Duration::from_secs(30))).expect("solver should finish on small graphs")
    }

    #[test]
    fn test_program_shape() {
        let program = DistanceDominatingSetIlp::build_program(&Graph::path(6), 1);
        assert_eq!(program.num_vars(), 6);
        assert_eq!(program.num_constraints(), 6);
        assert_eq!(program.constraints[0].terms.len(), 2);
        assert_eq!(program.constraints[2].terms.len(), 3);
    }

    #[rstest]
    #[case(1, 2)]
    #[case(2, 2)]
    #[case(5, 1)]
    fn test_path_graphs(#[case] k: usize, #[case] expected: usize) {
        let path = Graph::path(6);
        let result = solve(&path, k);
        assert!(distance_dominates(&path, &result.dom_set, k));
        assert!(result.dom_set.len() <= expected);
    }

    #[rstest]
    #[case(1)]
    #[case(2)]
    #[case(3)]
    fn test_complete_graphs(#[case] k: usize) {
        let complete = Graph::complete(6);
        let result = solve(&complete, k);
        assert!(distance_dominates(&complete, &result.dom_set, k));
        assert_eq!(result.dom_set.len(), 1);
    }

    #[rstest]
    #[case(1, 3)]
    #[case(2, 1)]
    #[case(3, 1)]
    fn test_grid_graphs(#[case] k: usize, #[case] optimum: usize) {
        let grid = Graph::grid_2d(3, 3);
        let result = solve(&grid, k);
        assert!(distance_dominates(&grid, &result.dom_set, k));
        assert_eq!(result.dom_set.len(), optimum);
    }

    #[test]
    fn test_distance_zero_selects_everything() {
        let cycle = Graph::cycle(5);
        assert_eq!(solve(&cycle, 0).dom_set.len(), 5);
    }

    #[test]
    fn test_disconnected_graph_needs_one_per_component() {
        let mut graph = Graph::complete(4);
        graph.add_edge("a", "b");
        graph.add_node("lonely");
        let result = solve(&graph, 1);
        assert_eq!(result.dom_set.len(), 3);
        assert!(distance_dominates(&graph, &result.dom_set, 1));
    }

    #[test]
    fn test_empty_graph() {
        let result = run_ilp(&Graph::new("empty"), 1, None).unwrap();
        assert!(result.dom_set.is_empty());
    }

    #[test]
    fn test_short_timeout_returns_valid_or_nothing() {
        let grid = Graph::grid_2d(10, 10);
        if let Some(result) = run_ilp(&grid, 1, Some(Duration::from_millis(1))) {
            assert!(distance_dominates(&grid, &result.dom_set, 1));
        }
    }

    #[test]
    fn test_solver_reports_optimality() {
        let solver = DistanceDominatingSetIlp::new(IlpConfig::with_timeout_ms(30_000)).unwrap();
        let result = solver.solve(&Graph::path(7), 1).unwrap();
        assert!(result.optimal);
        assert_eq!(result.upper_bound, Some(3));
        assert_eq!(result.gap(), Some(0.0));
    }

    #[rstest]
    #[case("path:12", 1)]
    #[case("cycle:11", 2)]
    #[case("grid:4x5", 1)]
    #[case("grid:4x5", 2)]
    #[case("gnp:25:0.12:4", 1)]
    #[case("gnp:25:0.12:4", 2)]
    fn test_heuristics_never_beat_the_optimum(#[case] spec: &str, #[case] k: usize) {
        let graph = spec.parse::<GraphSpec>().unwrap().build();
        let exact = DistanceDominatingSetIlp::new(IlpConfig::with_timeout_ms(30_000))
            .unwrap()
            .solve(&graph, k)
            .unwrap();
        assert!(exact.optimal, "{} k={}", spec, k);
        let optimum = exact.solution.size();

        for greedy in [
            GreedyDominatingSet::new(k).solve(&graph),
            MultiStartDominatingSet::new(k, 5).solve(&graph),
        ] {
            assert!(greedy.feasible, "{} on {}", greedy.algorithm, spec);
            assert!(greedy.size() >= optimum, "{} on {}", greedy.algorithm, spec);
        }
    }
}
