//! Solution representation and validation.
//!
//! This module holds the result types shared by the exact and heuristic
//! solvers, the output shapes expected by the grading harness, and the
//! validators that check a dominating set or a burning sequence against a
//! graph.

use crate::graph::Graph;
use serde::{Deserialize, Serialize};

/// Which optimisation problem a solution answers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Problem {
    /// Minimum distance-`distance` dominating set
    DistanceDomination { distance: usize },
    /// Minimum length burning sequence
    Burning,
}

impl std::fmt::Display for Problem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Problem::DistanceDomination { distance } => write!(f, "dominating(k={})", distance),
            Problem::Burning => write!(f, "burning"),
        }
    }
}

/// Outcome reported by a solver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolveStatus {
    /// Proven optimal
    Optimal,
    /// Valid but not proven optimal
    Feasible,
    /// The model has no solution
    Infeasible,
    /// Time limit reached before a valid solution was found
    TimeLimit,
    /// The backend failed
    Error,
}

impl std::fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SolveStatus::Optimal => "Optimal",
            SolveStatus::Feasible => "Feasible",
            SolveStatus::Infeasible => "Infeasible",
            SolveStatus::TimeLimit => "TimeLimit",
            SolveStatus::Error => "Error",
        };
        write!(f, "{}", s)
    }
}

/// A solution to either problem
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Solution {
    /// Problem answered
    pub problem: Problem,
    /// Chosen vertex labels: the dominating set in vertex order, or the
    /// burning sequence in ignition order
    pub vertices: Vec<String>,
    /// Whether the validator accepted `vertices`
    pub feasible: bool,
    /// Solver status
    pub status: SolveStatus,
    /// Algorithm that generated this solution
    pub algorithm: String,
    /// Computation time in seconds
    pub computation_time: f64,
    /// Proven lower bound on the optimum (if known)
    pub lower_bound: Option<usize>,
}

impl Solution {
    /// Create an empty, not yet validated solution
    pub fn new(problem: Problem, algorithm: &str) -> Self {
        Solution {
            problem,
            vertices: Vec::new(),
            feasible: false,
            status: SolveStatus::Infeasible,
            algorithm: algorithm.to_string(),
            computation_time: 0.0,
            lower_bound: None,
        }
    }

    /// Create a solution from vertex indices and validate it
    pub fn from_indices(graph: &Graph, problem: Problem, indices: &[usize], algorithm: &str) -> Self {
        let mut solution = Solution::new(problem, algorithm);
        solution.vertices = indices.iter().map(|&v| graph.label(v).to_string()).collect();
        solution.validate(graph);
        solution.status = if solution.feasible {
            SolveStatus::Feasible
        } else {
            SolveStatus::Infeasible
        };
        solution
    }

    /// Re-run the validator for this solution's problem
    pub fn validate(&mut self, graph: &Graph) {
        self.feasible = match self.problem {
            Problem::DistanceDomination { distance } => distance_dominates(graph, &self.vertices, distance),
            Problem::Burning => is_burning_sequence(graph, &self.vertices),
        };
    }

    /// Size of the dominating set, or length of the burning sequence
    pub fn size(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_optimal(&self) -> bool {
        self.status == SolveStatus::Optimal
    }

    /// Harness shape for a dominating set; `None` for burning solutions
    pub fn to_dominating_output(&self) -> Option<DominatingSetOutput> {
        match self.problem {
            Problem::DistanceDomination { .. } => Some(DominatingSetOutput {
                dom_set: self.vertices.clone(),
            }),
            Problem::Burning => None,
        }
    }

    /// Harness shape for a burning sequence; `None` for dominating sets
    pub fn to_burning_output(&self) -> Option<BurningOutput> {
        match self.problem {
            Problem::Burning => Some(BurningOutput {
                burn_seq: self.vertices.clone(),
            }),
            Problem::DistanceDomination { .. } => None,
        }
    }
}

impl std::fmt::Display for Solution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Solution ({}) for {}", self.algorithm, self.problem)?;
        writeln!(f, "  Status: {}", self.status)?;
        writeln!(f, "  Size: {}", self.size())?;
        writeln!(f, "  Feasible: {}", self.feasible)?;
        if let Some(lb) = self.lower_bound {
            writeln!(f, "  Lower bound: {}", lb)?;
        }
        writeln!(f, "  Time: {:.4}s", self.computation_time)?;
        writeln!(f, "  Vertices: {:?}", self.vertices)
    }
}

/// `{"dom_set": [...]}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DominatingSetOutput {
    pub dom_set: Vec<String>,
}

/// `{"burn_seq": [...]}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BurningOutput {
    pub burn_seq: Vec<String>,
}

/// Check that every vertex is within `distance` of some vertex of `set`.
///
/// Unknown labels make the set invalid.
pub fn distance_dominates<S: AsRef<str>>(graph: &Graph, set: &[S], distance: usize) -> bool {
    match graph.indices_of(set) {
        Some(indices) => dominated_by(graph, &indices, distance).iter().all(|&d| d),
        None => false,
    }
}

/// For each vertex, whether it lies within `distance` of one of `centers`
pub fn dominated_by(graph: &Graph, centers: &[usize], distance: usize) -> Vec<bool> {
    let mut covered = vec![false; graph.num_nodes()];
    for &c in centers {
        for u in graph.ball(c, distance) {
            covered[u] = true;
        }
    }
    covered
}

/// One round of spreading: every vertex adjacent to a burned vertex catches fire
fn spread(graph: &Graph, burned: &mut [bool]) {
    let newly: Vec<usize> = (0..graph.num_nodes())
        .filter(|&v| !burned[v] && graph.neighbors(v).iter().any(|&u| burned[u]))
        .collect();
    for v in newly {
        burned[v] = true;
    }
}

/// Check a burning sequence the way the grading harness does.
///
/// Each round fire first spreads, then the round's vertex is ignited. One
/// extra spread step is allowed after the last ignition. Igniting an already
/// burned vertex is allowed.
pub fn is_burning_sequence<S: AsRef<str>>(graph: &Graph, seq: &[S]) -> bool {
    let Some(indices) = graph.indices_of(seq) else {
        return false;
    };

    let mut burned = vec![false; graph.num_nodes()];
    for &v in &indices {
        spread(graph, &mut burned);
        burned[v] = true;
    }
    spread(graph, &mut burned);

    burned.iter().all(|&b| b)
}

/// Strict burning simulation without the trailing spread step.
///
/// Returns, for each vertex, the (1-based) round at the end of which it is
/// burned, or `None` if it is still unburned after the last round.
pub fn burn_rounds(graph: &Graph, seq: &[usize]) -> Vec<Option<usize>> {
    let mut round_of: Vec<Option<usize>> = vec![None; graph.num_nodes()];
    let mut burned = vec![false; graph.num_nodes()];

    for (round, &v) in seq.iter().enumerate() {
        spread(graph, &mut burned);
        burned[v] = true;
        for (u, &b) in burned.iter().enumerate() {
            if b && round_of[u].is_none() {
                round_of[u] = Some(round + 1);
            }
        }
    }

    round_of
}

/// Whether `seq` burns the whole graph by the end of its last round
pub fn burns_within(graph: &Graph, seq: &[usize]) -> bool {
    burn_rounds(graph, seq).iter().all(|r| r.is_some())
}
