//! Benchmarking and experimentation module.
//!
//! Runs the greedy heuristics and the exact ILP solvers over a set of graphs,
//! collects per-run results, aggregates statistics per algorithm and exports
//! CSV files and a text report.

use crate::exact::{BurningIlp, DistanceDominatingSetIlp, ExactResult, IlpConfig};
use crate::graph::{Graph, GraphSpec};
use crate::heuristics::{GreedyBurning, Heuristic, MultiStartDominatingSet};
use crate::solution::{Problem, Solution};

use indicatif::{ProgressBar, ProgressStyle};
use ordered_float::OrderedFloat;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;
use std::time::Duration;

/// Result of running a single algorithm on an instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlgorithmResult {
    /// Algorithm name
    pub algorithm: String,
    /// Instance name
    pub instance: String,
    /// Problem solved, e.g. `dominating(k=1)` or `burning`
    pub problem: String,
    pub nodes: usize,
    pub edges: usize,
    /// Size of the dominating set / length of the burning sequence
    pub size: Option<usize>,
    /// Whether the solution validated
    pub feasible: bool,
    /// Solver status
    pub status: String,
    /// Computation time in seconds
    pub time: f64,
    /// Lower bound (if available)
    pub lower_bound: Option<usize>,
    /// Gap to best known in percent (if available)
    pub gap_to_best: Option<f64>,
}

/// Aggregated statistics for an algorithm on one problem
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlgorithmStatistics {
    pub algorithm: String,
    pub problem: String,
    /// Number of runs
    pub num_runs: usize,
    /// Number of runs with a valid solution
    pub num_feasible: usize,
    pub avg_size: f64,
    pub std_size: f64,
    pub best_size: f64,
    pub worst_size: f64,
    pub avg_time: f64,
    pub total_time: f64,
    /// Average gap to best known
    pub avg_gap: Option<f64>,
}

/// Benchmark configuration
#[derive(Debug, Clone)]
pub struct BenchmarkConfig {
    /// Randomized restarts of the multi-start dominating set heuristic
    pub num_runs: usize,
    /// Time limit per exact solve (`None` = unlimited)
    pub time_limit: Option<Duration>,
    /// Run the exact solvers
    pub run_exact: bool,
    /// Domination distances to benchmark
    pub distances: Vec<usize>,
    /// Benchmark burning as well
    pub run_burning: bool,
    /// Process graphs in parallel
    pub parallel: bool,
    /// Solver threads per exact solve (0 = solver default)
    pub threads: u32,
    /// Output directory
    pub output_dir: String,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        BenchmarkConfig {
            num_runs: 5,
            time_limit: Some(Duration::from_secs(10)),
            run_exact: true,
            distances: vec![1, 2],
            run_burning: true,
            parallel: false,
            threads: 0,
            output_dir: "results".to_string(),
        }
    }
}

/// Benchmarking engine
pub struct Benchmark {
    config: BenchmarkConfig,
    results: Vec<AlgorithmResult>,
    best_known: HashMap<(String, String), usize>,
}

impl Benchmark {
    pub fn new(config: BenchmarkConfig) -> Self {
        Benchmark {
            config,
            results: Vec::new(),
            best_known: HashMap::new(),
        }
    }

    /// Set best known value for an instance and problem
    pub fn set_best_known(&mut self, instance_name: &str, problem: Problem, size: usize) {
        self.best_known
            .insert((instance_name.to_string(), problem.to_string()), size);
    }

    fn ilp_config(&self) -> IlpConfig {
        IlpConfig {
            time_limit: self.config.time_limit,
            threads: self.config.threads,
            ..Default::default()
        }
    }

    /// Run every configured algorithm on one graph, without touching `self`
    fn results_for_graph(&self, graph: &Graph) -> Vec<AlgorithmResult> {
        log::info!("Running benchmark on graph: {}", graph.name);
        let mut rows = Vec::new();

        for &k in &self.config.distances {
            let heuristic = MultiStartDominatingSet::new(k, self.config.num_runs);
            rows.push(Self::heuristic_row(graph, &heuristic.solve(graph)));

            if self.config.run_exact {
                match DistanceDominatingSetIlp::new(self.ilp_config()).and_then(|s| s.solve(graph, k)) {
                    Ok(result) => rows.push(Self::exact_row(graph, &result)),
                    Err(e) => log::error!("Dominating set ILP failed on {}: {}", graph.name, e),
                }
            }
        }

        if self.config.run_burning {
            rows.push(Self::heuristic_row(graph, &GreedyBurning::new().solve(graph)));

            if self.config.run_exact {
                match BurningIlp::new(self.ilp_config()).and_then(|s| s.solve(graph)) {
                    Ok(result) => rows.push(Self::exact_row(graph, &result)),
                    Err(e) => log::error!("Burning ILP failed on {}: {}", graph.name, e),
                }
            }
        }

        rows
    }

    fn heuristic_row(graph: &Graph, solution: &Solution) -> AlgorithmResult {
        AlgorithmResult {
            algorithm: solution.algorithm.clone(),
            instance: graph.name.clone(),
            problem: solution.problem.to_string(),
            nodes: graph.num_nodes(),
            edges: graph.num_edges(),
            size: solution.feasible.then(|| solution.size()),
            feasible: solution.feasible,
            status: solution.status.to_string(),
            time: solution.computation_time,
            lower_bound: solution.lower_bound,
            gap_to_best: None,
        }
    }

    fn exact_row(graph: &Graph, result: &ExactResult) -> AlgorithmResult {
        let mut row = Self::heuristic_row(graph, &result.solution);
        row.size = result.upper_bound;
        row.lower_bound = Some(result.lower_bound);
        row
    }

    /// Run full benchmark on one graph
    pub fn run_full_benchmark(&mut self, graph: &Graph) {
        let rows = self.results_for_graph(graph);
        self.record_results(rows);
    }

    /// Run benchmark on multiple graphs
    pub fn run_on_graphs(&mut self, graphs: &[Graph]) {
        let progress = ProgressBar::new(graphs.len() as u64);
        progress.set_style(
            ProgressStyle::with_template("{bar:40} {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );

        let rows: Vec<AlgorithmResult> = if self.config.parallel {
            graphs
                .par_iter()
                .flat_map_iter(|graph| {
                    let rows = self.results_for_graph(graph);
                    progress.inc(1);
                    rows
                })
                .collect()
        } else {
            graphs
                .iter()
                .flat_map(|graph| {
                    progress.set_message(graph.name.clone());
                    let rows = self.results_for_graph(graph);
                    progress.inc(1);
                    rows
                })
                .collect()
        };

        progress.finish_and_clear();
        self.record_results(rows);
    }

    /// Store results, updating best known values first so gaps are relative to them
    fn record_results(&mut self, rows: Vec<AlgorithmResult>) {
        for row in rows.iter().filter(|r| r.feasible) {
            if let Some(size) = row.size {
                let key = (row.instance.clone(), row.problem.clone());
                let entry = self.best_known.entry(key).or_insert(size);
                *entry = (*entry).min(size);
            }
        }

        for mut row in rows {
            let key = (row.instance.clone(), row.problem.clone());
            if let (Some(size), Some(&best)) = (row.size, self.best_known.get(&key)) {
                row.gap_to_best = Some(if best == 0 {
                    0.0
                } else {
                    (size as f64 - best as f64) / best as f64 * 100.0
                });
            }
            self.results.push(row);
        }
    }

    /// Compute statistics for each (algorithm, problem) pair
    pub fn compute_statistics(&self) -> Vec<AlgorithmStatistics> {
        let mut stats_map: HashMap<(String, String), Vec<&AlgorithmResult>> = HashMap::new();

        for result in &self.results {
            stats_map
                .entry((result.algorithm.clone(), result.problem.clone()))
                .or_default()
                .push(result);
        }

        let mut statistics = Vec::new();

        for ((algorithm, problem), results) in stats_map {
            let feasible_results: Vec<_> = results.iter().filter(|r| r.feasible).collect();

            if feasible_results.is_empty() {
                continue;
            }

            let sizes: Vec<f64> = feasible_results
                .iter()
                .filter_map(|r| r.size)
                .map(|s| s as f64)
                .collect();
            let times: Vec<f64> = feasible_results.iter().map(|r| r.time).collect();
            let gaps: Vec<f64> = feasible_results.iter().filter_map(|r| r.gap_to_best).collect();

            let std_size = if sizes.len() > 1 { sizes.iter().std_dev() } else { 0.0 };

            statistics.push(AlgorithmStatistics {
                algorithm,
                problem,
                num_runs: results.len(),
                num_feasible: feasible_results.len(),
                avg_size: sizes.iter().mean(),
                std_size,
                best_size: sizes.iter().cloned().fold(f64::INFINITY, f64::min),
                worst_size: sizes.iter().cloned().fold(0.0, f64::max),
                avg_time: times.iter().mean(),
                total_time: times.iter().sum::<f64>(),
                avg_gap: if gaps.is_empty() { None } else { Some(gaps.iter().mean()) },
            });
        }

        statistics.sort_by_key(|s| (s.problem.clone(), OrderedFloat(s.avg_size), s.algorithm.clone()));

        statistics
    }

    /// Export results to CSV
    pub fn export_to_csv<P: AsRef<Path>>(&self, path: P) -> Result<(), csv::Error> {
        let file = File::create(path)?;
        let mut writer = csv::Writer::from_writer(file);

        for result in &self.results {
            writer.serialize(result)?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Export statistics to CSV
    pub fn export_statistics_csv<P: AsRef<Path>>(&self, path: P) -> Result<(), csv::Error> {
        let file = File::create(path)?;
        let mut writer = csv::Writer::from_writer(file);

        for stat in self.compute_statistics() {
            writer.serialize(stat)?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Generate summary report
    pub fn generate_report(&self) -> String {
        let mut report = String::new();

        report.push_str("========================================\n");
        report.push_str("   Domination / Burning Benchmark Report\n");
        report.push_str(&format!("   {}\n", chrono::Local::now().format("%Y-%m-%d %H:%M:%S")));
        report.push_str("========================================\n\n");

        let stats = self.compute_statistics();

        report.push_str("Algorithm Performance Summary:\n");
        report.push_str("-".repeat(96).as_str());
        report.push('\n');
        report.push_str(&format!(
            "{:<32} {:<16} {:>10} {:>10} {:>10} {:>10} {:>10}\n",
            "Algorithm", "Problem", "Valid", "Avg Size", "Best", "Avg Gap%", "Avg Time"
        ));
        report.push_str("-".repeat(96).as_str());
        report.push('\n');

        for stat in &stats {
            let gap_str = stat
                .avg_gap
                .map(|g| format!("{:.2}%", g))
                .unwrap_or_else(|| "-".to_string());

            report.push_str(&format!(
                "{:<32} {:<16} {:>10} {:>10.2} {:>10.0} {:>10} {:>10.4}\n",
                stat.algorithm,
                stat.problem,
                format!("{}/{}", stat.num_feasible, stat.num_runs),
                stat.avg_size,
                stat.best_size,
                gap_str,
                stat.avg_time
            ));
        }

        report.push_str("-".repeat(96).as_str());
        report.push('\n');

        report.push_str("\nBest Solutions per Instance:\n");

        let mut keys: Vec<_> = self.best_known.keys().collect();
        keys.sort();
        for key in keys {
            let (instance, problem) = key;
            let best = self.best_known[key];
            let proven = self.results.iter().any(|r| {
                &r.instance == instance && &r.problem == problem && r.size == Some(best) && r.lower_bound == Some(best)
            });
            report.push_str(&format!(
                "  {} / {}: {}{}\n",
                instance,
                problem,
                best,
                if proven { " (optimal)" } else { "" }
            ));
        }

        report
    }

    /// Get all results
    pub fn results(&self) -> &[AlgorithmResult] {
        &self.results
    }

    pub fn config(&self) -> &BenchmarkConfig {
        &self.config
    }
}

/// Helper function to load graphs from a directory
pub fn load_graphs_from_dir<P: AsRef<Path>>(dir: P) -> Vec<Graph> {
    let mut graphs = Vec::new();

    if let Ok(entries) = std::fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            let known = path
                .extension()
                .map(|e| e == "graph" || e == "edges" || e == "txt" || e == "json")
                .unwrap_or(false);
            if !known {
                continue;
            }
            match Graph::from_file(&path) {
                Ok(graph) => graphs.push(graph),
                Err(e) => log::warn!("Skipping {:?}: {}", path, e),
            }
        }
    }

    // Sort by size
    graphs.sort_by_key(|g| (g.num_nodes(), g.num_edges()));

    graphs
}

/// The graph families used to check the solvers against known values
pub fn standard_suite() -> Vec<Graph> {
    [
        GraphSpec::Path(6),
        GraphSpec::Complete(6),
        GraphSpec::Grid(3, 3),
        GraphSpec::Cycle(9),
        GraphSpec::Star(8),
        GraphSpec::Grid(10, 10),
    ]
    .iter()
    .map(|spec| spec.build())
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn heuristics_only() -> BenchmarkConfig {
        BenchmarkConfig {
            run_exact: false,
            num_runs: 2,
            ..Default::default()
        }
    }

    #[test]
    fn test_benchmark_config() {
        let config = BenchmarkConfig::default();
        assert_eq!(config.num_runs, 5);
        assert_eq!(config.distances, vec![1, 2]);
    }

    #[test]
    fn test_heuristic_benchmark_rows() {
        let mut benchmark = Benchmark::new(heuristics_only());
        benchmark.run_on_graphs(&[Graph::path(6), Graph::grid_2d(3, 3)]);

        // two distances + burning, per graph
        assert_eq!(benchmark.results().len(), 6);
        assert!(benchmark.results().iter().all(|r| r.feasible));
        assert!(benchmark.results().iter().all(|r| r.gap_to_best == Some(0.0)));
    }

    #[test]
    fn test_statistics_and_report() {
        let mut benchmark = Benchmark::new(heuristics_only());
        benchmark.run_full_benchmark(&Graph::path(6));
        benchmark.run_full_benchmark(&Graph::path(9));

        let stats = benchmark.compute_statistics();
        let burning = stats.iter().find(|s| s.problem == "burning").unwrap();
        assert_eq!(burning.num_runs, 2);
        assert_eq!(burning.best_size, 3.0);
        assert_eq!(burning.worst_size, 3.0);

        let report = benchmark.generate_report();
        assert!(report.contains("GreedyBurning"));
        assert!(report.contains("path_9 / burning: 3"));
    }

    #[test]
    fn test_best_known_drives_gap() {
        let mut benchmark = Benchmark::new(BenchmarkConfig {
            distances: vec![1],
            run_burning: false,
            ..heuristics_only()
        });
        benchmark.set_best_known("path_6", Problem::DistanceDomination { distance: 1 }, 1);
        benchmark.run_full_benchmark(&Graph::path(6));
        assert_eq!(benchmark.results()[0].gap_to_best, Some(100.0));
    }

    #[test]
    fn test_csv_export() {
        let mut benchmark = Benchmark::new(heuristics_only());
        benchmark.run_full_benchmark(&Graph::star(4));

        let path = std::env::temp_dir().join("graph_ilp_solver_results_test.csv");
        benchmark.export_to_csv(&path).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert!(contents.starts_with("algorithm,instance,problem"));
        assert_eq!(contents.lines().count(), 4);
    }

    #[test]
    fn test_standard_suite() {
        let suite = standard_suite();
        assert_eq!(suite.len(), 6);
        assert_eq!(suite[2].num_nodes(), 9);
    }
}
