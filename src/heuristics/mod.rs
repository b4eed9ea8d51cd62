//! Heuristics module.
//!
//! Greedy constructions for both problems. They always return valid
//! solutions and serve as baselines and as upper bounds for the exact search.

use crate::graph::Graph;
use crate::solution::Solution;

pub mod burning;
pub mod dominating;

pub use burning::*;
pub use dominating::*;

pub trait Heuristic {
    fn solve(&self, graph: &Graph) -> Solution;
    fn name(&self) -> &str;
}
