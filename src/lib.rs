//! Graph ILP Solver Library
//!
//! Integer programming formulations for two NP-hard graph problems:
//! distance-k dominating set and graph burning.
//!
//! # Features
//!
//! - Graph loading (edge lists, JSON) and generators (paths, cycles, grids, G(n, p), ...)
//! - Exact solvers built on 0/1 integer programs, solved with HiGHS through `good_lp`
//! - Greedy heuristics used as baselines and as upper bounds for the exact search
//! - Validators for dominating sets and burning sequences
//! - Benchmarking tools
//!
//! # Example
//!
//! ```no_run
//! use graph_ilp_solver::graph::Graph;
//! use graph_ilp_solver::exact::{burning, dominating};
//! use std::time::Duration;
//!
//! let graph = Graph::from_file("graph.edges").unwrap();
//!
//! // Minimum distance-2 dominating set
//! if let Some(output) = dominating::run_ilp(&graph, 2, Some(Duration::from_secs(10))) {
//!     println!("dom_set: {:?}", output.dom_set);
//! }
//!
//! // Minimum burning sequence
//! if let Some(output) = burning::run_ilp(&graph, Some(Duration::from_secs(10))) {
//!     println!("burn_seq: {:?}", output.burn_seq);
//! }
//! ```

pub mod graph;
pub mod solution;
pub mod heuristics;
pub mod exact;
pub mod benchmark;

pub use graph::Graph;
pub use solution::Solution;
