//! Exact graph burning.
//!
//! For a fixed number of rounds B the formulation uses:
//! - Binary variables d[i][j]: vertex i is ignited at round j (1..=B)
//! - Binary variables b[i][j]: vertex i is burned by the end of round j (0..=B)
//!
//! The burning number is then found by searching over B, each step being a
//! pure feasibility model.

use super::backend::{default_backend, IlpBackend};
use super::model::{BinaryProgram, ConstraintSense};
use super::{ExactError, ExactResult, IlpConfig};
use crate::graph::Graph;
use crate::heuristics::GreedyBurning;
use crate::solution::{is_burning_sequence, BurningOutput, Problem, Solution, SolveStatus};
use std::collections::HashSet;
use std::time::{Duration, Instant};

/// How the number of rounds is searched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStrategy {
    /// Bisect between the lower and upper bound
    Binary,
    /// Try B = lower, lower + 1, ... and stop at the first feasible one
    Ascending,
}

/// Result of one fixed-B model
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoundsOutcome {
    /// Ignition order (vertex indices), one per round
    Feasible(Vec<usize>),
    /// Proven impossible in B rounds
    Infeasible,
    /// The solver stopped without an answer
    Unknown,
}

/// Bounds on the burning number used to seed the search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundBounds {
    /// max(2, number of components) when n >= 2
    pub lower: usize,
    /// First search window ends here: min(ceil(sqrt(n)), greedy) on connected graphs
    pub window: usize,
    /// Length of the greedy sequence, always achievable
    pub upper: usize,
}

/// Decision variable indices of a fixed-B model
#[derive(Debug, Clone)]
pub struct BurningVariables {
    /// `ignite[i][j - 1]` is d[i][j]
    pub ignite: Vec<Vec<usize>>,
    /// `burned[i][j]` is b[i][j]
    pub burned: Vec<Vec<usize>>,
}

enum Probe {
    Feasible,
    NotFeasible,
    OutOfTime,
}

#[derive(Default)]
struct SearchState {
    best: Option<Vec<usize>>,
    proven_infeasible: HashSet<usize>,
    models_solved: usize,
    timed_out: bool,
}

/// ILP solver for the burning number
pub struct BurningIlp {
    config: IlpConfig,
    strategy: SearchStrategy,
    backend: Box<dyn IlpBackend>,
}

impl BurningIlp {
    pub fn new(config: IlpConfig) -> Result<Self, ExactError> {
        Ok(Self::with_backend(config, default_backend()?))
    }

    pub fn with_backend(config: IlpConfig, backend: Box<dyn IlpBackend>) -> Self {
        BurningIlp {
            config,
            strategy: SearchStrategy::Binary,
            backend,
        }
    }

    pub fn with_strategy(mut self, strategy: SearchStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Build the feasibility model for `rounds` rounds
    pub fn build_program(graph: &Graph, rounds: usize) -> (BinaryProgram, BurningVariables) {
        let n = graph.num_nodes();
        let mut program = BinaryProgram::new(&format!("burn_{}_B{}", graph.name, rounds));

        let ignite: Vec<Vec<usize>> = (0..n)
            .map(|i| {
                (1..=rounds)
                    .map(|j| program.add_var(format!("decision_{}_{}", i, j)))
                    .collect()
            })
            .collect();
        let burned: Vec<Vec<usize>> = (0..n)
            .map(|i| {
                (0..=rounds)
                    .map(|j| program.add_var(format!("burned_{}_{}", i, j)))
                    .collect()
            })
            .collect();

        // Nothing burns before the first round
        for i in 0..n {
            program.fix(burned[i][0], false);
        }

        for i in 0..n {
            for j in 1..=rounds {
                let d = ignite[i][j - 1];
                let prev = burned[i][j - 1];
                let cur = burned[i][j];

                // stays burned
                program.add_implication(prev, cur);
                // ignition burns
                program.add_implication(d, cur);
                // spread from every burned neighbour
                for &k in graph.neighbors(i) {
                    program.add_implication(burned[k][j - 1], cur);
                }

                // no spontaneous combustion
                let mut terms = vec![(cur, 1.0), (prev, -1.0), (d, -1.0)];
                terms.extend(graph.neighbors(i).iter().map(|&k| (burned[k][j - 1], -1.0)));
                program.add_constraint(terms, ConstraintSense::LessOrEqual, 0.0);
            }
        }

        // exactly one ignition per round
        for j in 1..=rounds {
            let round: Vec<usize> = (0..n).map(|i| ignite[i][j - 1]).collect();
            program.add_sum_eq(&round, 1.0);
        }

        // everything burned at the end
        let last: Vec<usize> = (0..n).map(|i| burned[i][rounds]).collect();
        program.add_sum_eq(&last, n as f64);

        for i in 0..n {
            // ignited at most once
            program.add_sum_leq(&ignite[i], 1.0);

            // only unburned vertices are ignited, except in the last round
            for j in 1..rounds {
                program.add_sum_leq(&[ignite[i][j - 1], burned[i][j - 1]], 1.0);
            }
        }

        (program, BurningVariables { ignite, burned })
    }

    /// Lower and upper bounds on the burning number of a non-empty graph
    pub fn bounds(graph: &Graph) -> RoundBounds {
        let n = graph.num_nodes();
        // one round burns a single vertex, and every component needs its own ignition
        let lower = graph.num_components().max(n.min(2));
        let greedy = GreedyBurning::new().sequence(graph).len().max(lower);

        let window = if graph.is_connected() {
            ceil_sqrt(n).min(greedy).max(lower)
        } else {
            greedy
        };

        RoundBounds {
            lower,
            window,
            upper: greedy,
        }
    }

    /// Solve the fixed-B model under this solver's time limit
    pub fn solve_for_rounds(&self, graph: &Graph, rounds: usize) -> Result<RoundsOutcome, ExactError> {
        self.solve_rounds_with(graph, rounds, &self.config)
    }

    fn solve_rounds_with(&self, graph: &Graph, rounds: usize, config: &IlpConfig) -> Result<RoundsOutcome, ExactError> {
        if rounds == 0 {
            return Err(ExactError::InvalidInput("number of rounds must be positive".to_string()));
        }
        if graph.is_empty() {
            return Ok(RoundsOutcome::Feasible(Vec::new()));
        }

        let (program, vars) = Self::build_program(graph, rounds);
        let outcome = self.backend.solve(&program, config)?;

        let values = match (outcome.status, outcome.values) {
            (SolveStatus::Infeasible, _) => return Ok(RoundsOutcome::Infeasible),
            (_, Some(values)) => values,
            (_, None) => return Ok(RoundsOutcome::Unknown),
        };

        let mut seq = Vec::with_capacity(rounds);
        for j in 0..rounds {
            match (0..graph.num_nodes()).find(|&i| values[vars.ignite[i][j]]) {
                Some(i) => seq.push(i),
                None => return Ok(RoundsOutcome::Unknown),
            }
        }

        Ok(RoundsOutcome::Feasible(seq))
    }

    /// Find the burning number (or the best sequence found before the deadline)
    pub fn solve(&self, graph: &Graph) -> Result<ExactResult, ExactError> {
        let start = Instant::now();
        let n = graph.num_nodes();
        let algorithm = format!("BurningILP-{}", self.backend.name());

        if n <= 1 {
            let seq: Vec<usize> = (0..n).collect();
            let mut solution = Solution::from_indices(graph, Problem::Burning, &seq, &algorithm);
            solution.status = SolveStatus::Optimal;
            solution.lower_bound = Some(n);
            return Ok(ExactResult {
                solution,
                optimal: true,
                lower_bound: n,
                upper_bound: Some(n),
                models_solved: 0,
            });
        }

        let bounds = Self::bounds(graph);
        log::debug!(
            "Burning '{}': lower {}, window {}, upper {}",
            graph.name,
            bounds.lower,
            bounds.window,
            bounds.upper
        );

        let deadline = self
            .config
            .time_limit
            .filter(|limit| !limit.is_zero())
            .and_then(|limit| start.checked_add(limit));
        let mut state = SearchState::default();

        let mut windows = vec![(bounds.lower, bounds.window)];
        if bounds.window < bounds.upper {
            windows.push((bounds.window + 1, bounds.upper));
        }

        for (lo, hi) in windows {
            match self.strategy {
                SearchStrategy::Binary => self.binary_search(graph, lo, hi, deadline, &mut state)?,
                SearchStrategy::Ascending => self.ascending_search(graph, lo, hi, deadline, &mut state)?,
            }
            if state.best.is_some() || state.timed_out {
                break;
            }
        }

        // Bisection may skip round counts below the incumbent; close the gap so
        // optimality can be proven.
        while let Some(best_len) = state.best.as_ref().map(|seq| seq.len()) {
            let lower_bound = proven_lower_bound(bounds.lower, &state.proven_infeasible, best_len);
            if lower_bound >= best_len || state.timed_out {
                break;
            }
            match self.probe(graph, lower_bound, deadline, &mut state)? {
                Probe::Feasible => {}
                Probe::NotFeasible if state.proven_infeasible.contains(&lower_bound) => {}
                Probe::NotFeasible | Probe::OutOfTime => break,
            }
        }

        let best_len = state.best.as_ref().map(|seq| seq.len());
        let lower_bound = proven_lower_bound(bounds.lower, &state.proven_infeasible, best_len.unwrap_or(usize::MAX));

        let (mut solution, optimal) = match &state.best {
            Some(seq) => {
                let mut solution = Solution::from_indices(graph, Problem::Burning, seq, &algorithm);
                let optimal = seq.len() == lower_bound;
                solution.status = if optimal {
                    SolveStatus::Optimal
                } else {
                    SolveStatus::Feasible
                };
                (solution, optimal)
            }
            None => {
                let mut solution = Solution::new(Problem::Burning, &algorithm);
                solution.status = if state.timed_out {
                    SolveStatus::TimeLimit
                } else {
                    SolveStatus::Infeasible
                };
                (solution, false)
            }
        };
        solution.lower_bound = Some(lower_bound);
        solution.computation_time = start.elapsed().as_secs_f64();

        log::info!(
            "Burning '{}': status {}, rounds {:?}, {} models, {:.3}s",
            graph.name,
            solution.status,
            best_len,
            state.models_solved,
            solution.computation_time
        );

        Ok(ExactResult {
            solution,
            optimal,
            lower_bound,
            upper_bound: best_len,
            models_solved: state.models_solved,
        })
    }

    fn binary_search(
        &self,
        graph: &Graph,
        mut lo: usize,
        mut hi: usize,
        deadline: Option<Instant>,
        state: &mut SearchState,
    ) -> Result<(), ExactError> {
        while lo <= hi {
            let mid = lo + (hi - lo) / 2;
            match self.probe(graph, mid, deadline, state)? {
                Probe::Feasible => {
                    if mid == 0 {
                        break;
                    }
                    hi = mid - 1;
                }
                Probe::NotFeasible => lo = mid + 1,
                Probe::OutOfTime => break,
            }
        }
        Ok(())
    }

    fn ascending_search(
        &self,
        graph: &Graph,
        lo: usize,
        hi: usize,
        deadline: Option<Instant>,
        state: &mut SearchState,
    ) -> Result<(), ExactError> {
        for rounds in lo..=hi {
            match self.probe(graph, rounds, deadline, state)? {
                Probe::Feasible | Probe::OutOfTime => break,
                Probe::NotFeasible => {}
            }
        }
        Ok(())
    }

    /// Solve one fixed-B model with the remaining budget and record the outcome
    fn probe(
        &self,
        graph: &Graph,
        rounds: usize,
        deadline: Option<Instant>,
        state: &mut SearchState,
    ) -> Result<Probe, ExactError> {
        let budget = deadline.map(|d| d.saturating_duration_since(Instant::now()));
        if budget.map(|b| b.is_zero()).unwrap_or(false) {
            state.timed_out = true;
            return Ok(Probe::OutOfTime);
        }

        let config = IlpConfig {
            time_limit: budget,
            ..self.config.clone()
        };
        let outcome = self.solve_rounds_with(graph, rounds, &config)?;
        state.models_solved += 1;

        match outcome {
            RoundsOutcome::Feasible(seq) => {
                let labels: Vec<&str> = seq.iter().map(|&v| graph.label(v)).collect();
                if !is_burning_sequence(graph, &labels) {
                    log::debug!("B={}: decoded sequence does not burn the graph", rounds);
                    return Ok(Probe::NotFeasible);
                }
                log::debug!("B={}: feasible", rounds);
                let better = state.best.as_ref().map(|best| seq.len() < best.len()).unwrap_or(true);
                if better {
                    state.best = Some(seq);
                }
                Ok(Probe::Feasible)
            }
            RoundsOutcome::Infeasible => {
                log::debug!("B={}: infeasible", rounds);
                state.proven_infeasible.insert(rounds);
                Ok(Probe::NotFeasible)
            }
            RoundsOutcome::Unknown => {
                log::debug!("B={}: no answer within the time limit", rounds);
                if deadline.map(|d| Instant::now() >= d).unwrap_or(false) {
                    state.timed_out = true;
                    return Ok(Probe::OutOfTime);
                }
                Ok(Probe::NotFeasible)
            }
        }
    }
}

/// Smallest B >= `lower` not yet proven infeasible, capped at `best`
fn proven_lower_bound(lower: usize, proven_infeasible: &HashSet<usize>, best: usize) -> usize {
    let mut bound = lower;
    while bound < best && proven_infeasible.contains(&bound) {
        bound += 1;
    }
    bound
}

/// Smallest r with r * r >= n
fn ceil_sqrt(n: usize) -> usize {
    let mut r = (n as f64).sqrt().ceil() as usize;
    while r * r < n {
        r += 1;
    }
    while r > 0 && (r - 1) * (r - 1) >= n {
        r -= 1;
    }
    r
}

/// Compute a minimum burning sequence and return `{"burn_seq": [...]}`.
///
/// Returns `None` when no valid sequence was found within `timeout` or no
/// backend is available.
pub fn run_ilp(graph: &Graph, timeout: Option<Duration>) -> Option<BurningOutput> {
    let config = IlpConfig {
        time_limit: timeout,
        ..Default::default()
    };

    let solver = match BurningIlp::new(config) {
        Ok(solver) => solver,
        Err(e) => {
            log::warn!("Burning ILP unavailable: {}", e);
            return None;
        }
    };

    match solver.solve(graph) {
        Ok(result) if result.solution.feasible => result.solution.to_burning_output(),
        Ok(result) => {
            log::debug!("No burning sequence found: {}", result.status());
            None
        }
        Err(e) => {
            log::warn!("Burning ILP failed: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ceil_sqrt() {
        assert_eq!(ceil_sqrt(1), 1);
        assert_eq!(ceil_sqrt(4), 2);
        assert_eq!(ceil_sqrt(5), 3);
        assert_eq!(ceil_sqrt(9), 3);
        assert_eq!(ceil_sqrt(10), 4);
    }

    #[test]
    fn test_program_shape() {
        let (program, vars) = BurningIlp::build_program(&Graph::path(3), 2);
        assert_eq!(program.num_vars(), 3 * 2 + 3 * 3);
        assert_eq!(vars.ignite[0].len(), 2);
        assert_eq!(vars.burned[0].len(), 3);
    }

    #[test]
    fn test_program_accepts_known_sequence() {
        // P4 burned by igniting 1 then 3
        let graph = Graph::path(4);
        let (program, vars) = BurningIlp::build_program(&graph, 2);
        let mut values = vec![false; program.num_vars()];
        values[vars.ignite[1][0]] = true;
        values[vars.ignite[3][1]] = true;
        values[vars.burned[1][1]] = true;
        for i in 0..4 {
            values[vars.burned[i][2]] = true;
        }
        assert!(program.is_satisfied_by(&values));

        values[vars.burned[2][2]] = false;
        assert!(!program.is_satisfied_by(&values));
    }

    #[test]
    fn test_bounds() {
        let bounds = BurningIlp::bounds(&Graph::path(10));
        assert_eq!(bounds.lower, 2);
        assert_eq!(bounds.window, 4);
        assert!(bounds.upper >= 4);

        let mut isolated = Graph::new("isolated");
        for label in ["a", "b", "c"] {
            isolated.add_node(label);
        }
        let bounds = BurningIlp::bounds(&isolated);
        assert_eq!((bounds.lower, bounds.window, bounds.upper), (3, 3, 3));
    }

    #[cfg(feature = "highs")]
    mod with_solver {
        use super::*;
        use crate::graph::GraphSpec;
        use crate::heuristics::Heuristic;
        use rstest::rstest;

        fn burning_number(graph: &Graph) -> usize {
            let output = run_ilp(graph, Some(Duration::from_secs(60))).expect("solver should finish on small graphs");
            assert!(is_burning_sequence(graph, &output.burn_seq));
            output.burn_seq.len()
        }

        #[rstest]
        #[case(2, 2)]
        #[case(4, 2)]
        #[case(5, 3)]
        #[case(9, 3)]
        #[case(10, 4)]
        fn test_paths(#[case] n: usize, #[case] expected: usize) {
            assert_eq!(burning_number(&Graph::path(n)), expected);
        }

        #[test]
        fn test_known_families() {
            assert_eq!(burning_number(&Graph::complete(5)), 2);
            assert_eq!(burning_number(&Graph::star(6)), 2);
            assert_eq!(burning_number(&Graph::cycle(9)), 3);
            assert_eq!(burning_number(&Graph::grid_2d(3, 3)), 3);
        }

        #[test]
        fn test_disconnected() {
            let mut graph = Graph::new("isolated");
            for label in ["a", "b", "c"] {
                graph.add_node(label);
            }
            assert_eq!(burning_number(&graph), 3);
        }

        #[test]
        fn test_trivial_graphs() {
            assert_eq!(run_ilp(&Graph::new("empty"), None).unwrap().burn_seq.len(), 0);
            assert_eq!(run_ilp(&Graph::path(1), None).unwrap().burn_seq, vec!["0".to_string()]);
        }

        #[test]
        fn test_strategies_agree() {
            let graph = Graph::gnp_random(12, 0.25, 9);
            let config = IlpConfig::with_timeout_ms(60_000);
            let binary = BurningIlp::new(config.clone()).unwrap().solve(&graph).unwrap();
            let ascending = BurningIlp::new(config)
                .unwrap()
                .with_strategy(SearchStrategy::Ascending)
                .solve(&graph)
                .unwrap();
            assert!(binary.solution.feasible && ascending.solution.feasible);
            assert_eq!(binary.solution.size(), ascending.solution.size());
        }

        #[test]
        fn test_optimality_is_proven() {
            let solver = BurningIlp::new(IlpConfig::with_timeout_ms(60_000)).unwrap();
            let result = solver.solve(&Graph::path(5)).unwrap();
            assert!(result.optimal);
            assert_eq!(result.lower_bound, 3);
            assert_eq!(result.upper_bound, Some(3));
            assert!(result.models_solved >= 2);
        }

        #[test]
        fn test_fixed_rounds() {
            let solver = BurningIlp::new(IlpConfig::with_timeout_ms(60_000)).unwrap();
            assert_eq!(solver.solve_for_rounds(&Graph::path(5), 2).unwrap(), RoundsOutcome::Infeasible);
            match solver.solve_for_rounds(&Graph::path(5), 3).unwrap() {
                RoundsOutcome::Feasible(seq) => assert_eq!(seq.len(), 3),
                other => panic!("expected a sequence, got {:?}", other),
            }
        }

        #[rstest]
        #[case("path:11")]
        #[case("cycle:10")]
        #[case("grid:3x4")]
        #[case("gnp:12:0.25:9")]
        #[case("gnp:14:0.15:2")]
        fn test_greedy_never_beats_the_optimum(#[case] spec: &str) {
            let graph = spec.parse::<GraphSpec>().unwrap().build();
            let exact = BurningIlp::new(IlpConfig::with_timeout_ms(60_000))
                .unwrap()
                .solve(&graph)
                .unwrap();
            assert!(exact.optimal, "{}", spec);

            let greedy = GreedyBurning::new().solve(&graph);
            assert!(greedy.feasible);
            assert!(greedy.size() >= exact.solution.size(), "{}", spec);
        }

        #[test]
        fn test_short_timeout_returns_valid_or_nothing() {
            let grid = Graph::grid_2d(10, 10);
            if let Some(output) = run_ilp(&grid, Some(Duration::from_millis(1))) {
                assert!(is_burning_sequence(&grid, &output.burn_seq));
            }
        }
    }
}
