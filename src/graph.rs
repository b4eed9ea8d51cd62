//! Module for parsing, generating and querying graph instances.
//!
//! Every graph is simple and undirected: self-loops are dropped and parallel
//! edges collapse into one. Vertices keep the string label they were given in
//! the input file (or by the generator) and are addressed internally by a
//! dense `0..n` index in insertion order.

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;

/// Errors raised while building or loading a graph
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("Cannot read graph file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Invalid JSON graph: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid graph spec '{0}'")]
    InvalidSpec(String),
}

/// A simple undirected graph with labelled vertices
#[derive(Debug, Clone, Default)]
pub struct Graph {
    /// Name of the instance
    pub name: String,
    labels: Vec<String>,
    index: HashMap<String, usize>,
    adjacency: Vec<Vec<usize>>,
}

/// On-disk JSON layout of a graph
#[derive(Debug, Clone, Serialize, Deserialize)]
struct GraphData {
    #[serde(default)]
    name: String,
    #[serde(default)]
    nodes: Vec<String>,
    edges: Vec<(String, String)>,
}

impl Graph {
    /// Create an empty graph
    pub fn new(name: &str) -> Self {
        Graph {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Build a graph from a list of labelled edges
    pub fn from_edges<S: AsRef<str>>(name: &str, edges: &[(S, S)]) -> Self {
        let mut graph = Graph::new(name);
        for (u, v) in edges {
            graph.add_edge(u.as_ref(), v.as_ref());
        }
        graph
    }

    /// Add a vertex, returning its index. Adding an existing label is a no-op.
    pub fn add_node(&mut self, label: &str) -> usize {
        if let Some(&idx) = self.index.get(label) {
            return idx;
        }
        let idx = self.labels.len();
        self.labels.push(label.to_string());
        self.index.insert(label.to_string(), idx);
        self.adjacency.push(Vec::new());
        idx
    }

    /// Add an undirected edge, creating missing endpoints
    pub fn add_edge(&mut self, u: &str, v: &str) {
        let a = self.add_node(u);
        let b = self.add_node(v);
        self.connect(a, b);
    }

    fn connect(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        if let Err(pos) = self.adjacency[a].binary_search(&b) {
            self.adjacency[a].insert(pos, b);
        }
        if let Err(pos) = self.adjacency[b].binary_search(&a) {
            self.adjacency[b].insert(pos, a);
        }
    }

    /// Parse a graph from an edge-list file (or a `.json` file)
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, GraphError> {
        let path = path.as_ref();
        if path.extension().map(|e| e == "json").unwrap_or(false) {
            return Self::from_json(path);
        }

        let file = File::open(path)?;
        let reader = BufReader::new(file);

        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        let mut graph = Graph::new(&stem);

        for (lineno, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim();

            if line.is_empty() || line.starts_with('#') || line.starts_with('%') {
                continue;
            }

            if line.starts_with("NAME:") {
                graph.name = line.replace("NAME:", "").trim().to_string();
                continue;
            }

            let parts: Vec<&str> = line.split_whitespace().collect();
            match parts.as_slice() {
                ["NODE"] => {
                    return Err(GraphError::Parse {
                        line: lineno + 1,
                        message: "NODE needs a label".to_string(),
                    });
                }
                ["NODE", label, ..] => {
                    graph.add_node(label);
                }
                [label] => {
                    graph.add_node(label);
                }
                [u, v, ..] => graph.add_edge(u, v),
                [] => {}
            }
        }

        Ok(graph)
    }

    /// Parse a graph from a JSON file: `{"name": .., "nodes": [..], "edges": [[u, v], ..]}`
    pub fn from_json<P: AsRef<Path>>(path: P) -> Result<Self, GraphError> {
        let file = File::open(path.as_ref())?;
        let data: GraphData = serde_json::from_reader(BufReader::new(file))?;
        let mut graph = Graph::new(&data.name);
        for node in &data.nodes {
            graph.add_node(node);
        }
        for (u, v) in &data.edges {
            graph.add_edge(u, v);
        }
        Ok(graph)
    }

    /// Serialize the graph to pretty JSON
    pub fn to_json(&self) -> Result<String, GraphError> {
        let data = GraphData {
            name: self.name.clone(),
            nodes: self.labels.clone(),
            edges: self
                .edges()
                .map(|(a, b)| (self.labels[a].clone(), self.labels[b].clone()))
                .collect(),
        };
        Ok(serde_json::to_string_pretty(&data)?)
    }

    /// Path on `n` vertices labelled `0..n`
    pub fn path(n: usize) -> Self {
        let mut graph = Self::with_numbered_nodes(&format!("path_{}", n), n);
        for i in 1..n {
            graph.connect(i - 1, i);
        }
        graph
    }

    /// Cycle on `n` vertices labelled `0..n`
    pub fn cycle(n: usize) -> Self {
        let mut graph = Self::with_numbered_nodes(&format!("cycle_{}", n), n);
        for i in 1..n {
            graph.connect(i - 1, i);
        }
        if n > 2 {
            graph.connect(n - 1, 0);
        }
        graph
    }

    /// Complete graph on `n` vertices labelled `0..n`
    pub fn complete(n: usize) -> Self {
        let mut graph = Self::with_numbered_nodes(&format!("complete_{}", n), n);
        for i in 0..n {
            for j in i + 1..n {
                graph.connect(i, j);
            }
        }
        graph
    }

    /// Star with centre `0` and leaves `1..=leaves`
    pub fn star(leaves: usize) -> Self {
        let mut graph = Self::with_numbered_nodes(&format!("star_{}", leaves), leaves + 1);
        for i in 1..=leaves {
            graph.connect(0, i);
        }
        graph
    }

    /// Two dimensional grid; vertex `(r, c)` is labelled `"(r, c)"`
    pub fn grid_2d(rows: usize, cols: usize) -> Self {
        let mut graph = Graph::new(&format!("grid_{}x{}", rows, cols));
        for r in 0..rows {
            for c in 0..cols {
                graph.add_node(&format!("({}, {})", r, c));
            }
        }
        for r in 0..rows {
            for c in 0..cols {
                let id = r * cols + c;
                if r + 1 < rows {
                    graph.connect(id, id + cols);
                }
                if c + 1 < cols {
                    graph.connect(id, id + 1);
                }
            }
        }
        graph
    }

    /// Erdos-Renyi G(n, p) random graph
    pub fn gnp_random(n: usize, p: f64, seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut graph = Self::with_numbered_nodes(&format!("gnp_{}_{}_{}", n, p, seed), n);
        for i in 0..n {
            for j in i + 1..n {
                if rng.gen::<f64>() < p {
                    graph.connect(i, j);
                }
            }
        }
        graph
    }

    fn with_numbered_nodes(name: &str, n: usize) -> Self {
        let mut graph = Graph::new(name);
        for i in 0..n {
            graph.add_node(&i.to_string());
        }
        graph
    }

    pub fn num_nodes(&self) -> usize {
        self.labels.len()
    }

    pub fn num_edges(&self) -> usize {
        self.adjacency.iter().map(|adj| adj.len()).sum::<usize>() / 2
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Sorted neighbour indices of vertex `v`
    #[inline]
    pub fn neighbors(&self, v: usize) -> &[usize] {
        &self.adjacency[v]
    }

    #[inline]
    pub fn degree(&self, v: usize) -> usize {
        self.adjacency[v].len()
    }

    #[inline]
    pub fn label(&self, v: usize) -> &str {
        &self.labels[v]
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.index.get(label).copied()
    }

    /// Resolve a list of labels to indices; `None` if any label is unknown
    pub fn indices_of<S: AsRef<str>>(&self, labels: &[S]) -> Option<Vec<usize>> {
        labels.iter().map(|l| self.index_of(l.as_ref())).collect()
    }

    /// Iterate each edge once as `(a, b)` with `a < b`
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.adjacency
            .iter()
            .enumerate()
            .flat_map(|(a, adj)| adj.iter().filter(move |&&b| a < b).map(move |&b| (a, b)))
    }

    /// Breadth-first distances from `source`, stopping past `cutoff`
    pub fn bfs_distances(&self, source: usize, cutoff: Option<usize>) -> Vec<Option<usize>> {
        let mut dist = vec![None; self.num_nodes()];
        let mut queue = VecDeque::new();
        dist[source] = Some(0);
        queue.push_back(source);

        while let Some(v) = queue.pop_front() {
            let d = dist[v].unwrap_or(0);
            if cutoff.map(|c| d >= c).unwrap_or(false) {
                continue;
            }
            for &u in &self.adjacency[v] {
                if dist[u].is_none() {
                    dist[u] = Some(d + 1);
                    queue.push_back(u);
                }
            }
        }

        dist
    }

    /// All vertices at distance at most `k` from `v`, `v` included, sorted
    pub fn ball(&self, v: usize, k: usize) -> Vec<usize> {
        self.bfs_distances(v, Some(k))
            .iter()
            .enumerate()
            .filter_map(|(u, d)| d.map(|_| u))
            .collect()
    }

    /// Connected components, each sorted, ordered by smallest vertex
    pub fn connected_components(&self) -> Vec<Vec<usize>> {
        let n = self.num_nodes();
        let mut seen = vec![false; n];
        let mut components = Vec::new();

        for start in 0..n {
            if seen[start] {
                continue;
            }
            let mut component = vec![start];
            seen[start] = true;
            let mut stack = vec![start];
            while let Some(v) = stack.pop() {
                for &u in &self.adjacency[v] {
                    if !seen[u] {
                        seen[u] = true;
                        component.push(u);
                        stack.push(u);
                    }
                }
            }
            component.sort_unstable();
            components.push(component);
        }

        components
    }

    pub fn num_components(&self) -> usize {
        self.connected_components().len()
    }

    pub fn is_connected(&self) -> bool {
        !self.is_empty() && self.num_components() == 1
    }

    /// Largest distance from `v`; `None` when some vertex is unreachable
    pub fn eccentricity(&self, v: usize) -> Option<usize> {
        self.bfs_distances(v, None)
            .into_iter()
            .try_fold(0, |acc, d| d.map(|d| acc.max(d)))
    }

    pub fn diameter(&self) -> Option<usize> {
        if self.is_empty() {
            return None;
        }
        (0..self.num_nodes())
            .map(|v| self.eccentricity(v))
            .try_fold(0, |acc, e| e.map(|e| acc.max(e)))
    }

    pub fn radius(&self) -> Option<usize> {
        if self.is_empty() {
            return None;
        }
        (0..self.num_nodes())
            .map(|v| self.eccentricity(v))
            .try_fold(usize::MAX, |acc, e| e.map(|e| acc.min(e)))
    }

    /// Compute summary statistics of the graph
    pub fn statistics(&self) -> GraphStatistics {
        let n = self.num_nodes();
        let m = self.num_edges();
        let degrees: Vec<usize> = (0..n).map(|v| self.degree(v)).collect();

        let avg_degree = if n > 0 {
            degrees.iter().sum::<usize>() as f64 / n as f64
        } else {
            0.0
        };
        let density = if n > 1 {
            2.0 * m as f64 / (n as f64 * (n as f64 - 1.0))
        } else {
            0.0
        };

        GraphStatistics {
            name: self.name.clone(),
            num_nodes: n,
            num_edges: m,
            min_degree: degrees.iter().copied().min().unwrap_or(0),
            max_degree: degrees.iter().copied().max().unwrap_or(0),
            avg_degree,
            density,
            num_components: self.num_components(),
            diameter: self.diameter(),
        }
    }
}

/// Statistics about a graph instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphStatistics {
    pub name: String,
    pub num_nodes: usize,
    pub num_edges: usize,
    pub min_degree: usize,
    pub max_degree: usize,
    pub avg_degree: f64,
    pub density: f64,
    pub num_components: usize,
    pub diameter: Option<usize>,
}

impl std::fmt::Display for GraphStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Graph: {}", self.name)?;
        writeln!(f, "  Nodes: {}", self.num_nodes)?;
        writeln!(f, "  Edges: {}", self.num_edges)?;
        writeln!(f, "  Degree: min {} / avg {:.2} / max {}", self.min_degree, self.avg_degree, self.max_degree)?;
        writeln!(f, "  Density: {:.4}", self.density)?;
        writeln!(f, "  Components: {}", self.num_components)?;
        match self.diameter {
            Some(d) => writeln!(f, "  Diameter: {}", d),
            None => writeln!(f, "  Diameter: - (disconnected)"),
        }
    }
}

/// Compact description of a generated graph, e.g. `grid:3x3` or `gnp:30:0.1:7`
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GraphSpec {
    Path(usize),
    Cycle(usize),
    Complete(usize),
    Star(usize),
    Grid(usize, usize),
    Gnp { n: usize, p: f64, seed: u64 },
}

impl GraphSpec {
    pub fn build(&self) -> Graph {
        match *self {
            GraphSpec::Path(n) => Graph::path(n),
            GraphSpec::Cycle(n) => Graph::cycle(n),
            GraphSpec::Complete(n) => Graph::complete(n),
            GraphSpec::Star(n) => Graph::star(n),
            GraphSpec::Grid(r, c) => Graph::grid_2d(r, c),
            GraphSpec::Gnp { n, p, seed } => Graph::gnp_random(n, p, seed),
        }
    }
}

impl FromStr for GraphSpec {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || GraphError::InvalidSpec(s.to_string());
        let parts: Vec<&str> = s.trim().split(':').collect();
        let size = |text: &str| text.trim().parse::<usize>().map_err(|_| invalid());

        match parts.as_slice() {
            ["path", n] => Ok(GraphSpec::Path(size(*n)?)),
            ["cycle", n] => Ok(GraphSpec::Cycle(size(*n)?)),
            ["complete", n] => Ok(GraphSpec::Complete(size(*n)?)),
            ["star", n] => Ok(GraphSpec::Star(size(*n)?)),
            ["grid", dims] => {
                let (r, c) = dims.split_once('x').ok_or_else(invalid)?;
                Ok(GraphSpec::Grid(size(r)?, size(c)?))
            }
            ["gnp", n, p, rest @ ..] if rest.len() <= 1 => {
                let p: f64 = p.trim().parse().map_err(|_| invalid())?;
                if !(0.0..=1.0).contains(&p) {
                    return Err(invalid());
                }
                let seed = match rest.first() {
                    Some(seed) => seed.trim().parse().map_err(|_| invalid())?,
                    None => 42,
                };
                Ok(GraphSpec::Gnp { n: size(*n)?, p, seed })
            }
            _ => Err(invalid()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_simple_graph_normalisation() {
        let mut graph = Graph::new("g");
        graph.add_edge("a", "b");
        graph.add_edge("b", "a");
        graph.add_edge("a", "a");

        assert_eq!(graph.num_nodes(), 2);
        assert_eq!(graph.num_edges(), 1);
        assert_eq!(graph.neighbors(0), &[1]);
    }

    #[test]
    fn test_generators() {
        assert_eq!(Graph::path(6).num_edges(), 5);
        assert_eq!(Graph::cycle(5).num_edges(), 5);
        assert_eq!(Graph::complete(6).num_edges(), 15);
        assert_eq!(Graph::star(4).num_nodes(), 5);

        let grid = Graph::grid_2d(3, 3);
        assert_eq!(grid.num_nodes(), 9);
        assert_eq!(grid.num_edges(), 12);
        assert_eq!(grid.index_of("(1, 1)"), Some(4));
        assert_eq!(grid.degree(4), 4);
    }

    #[test]
    fn test_gnp_is_reproducible() {
        let a = Graph::gnp_random(20, 0.3, 7);
        let b = Graph::gnp_random(20, 0.3, 7);
        assert_eq!(a.edges().collect::<Vec<_>>(), b.edges().collect::<Vec<_>>());
    }

    #[test]
    fn test_ball_and_distances() {
        let path = Graph::path(6);
        assert_eq!(path.ball(0, 2), vec![0, 1, 2]);
        assert_eq!(path.ball(3, 1), vec![2, 3, 4]);
        assert_eq!(path.ball(2, 0), vec![2]);
        assert_eq!(path.bfs_distances(0, None)[5], Some(5));
        assert_eq!(path.bfs_distances(0, Some(2))[3], None);
    }

    #[test]
    fn test_components_and_diameter() {
        let mut graph = Graph::path(4);
        graph.add_node("isolated");
        assert_eq!(graph.num_components(), 2);
        assert!(!graph.is_connected());
        assert_eq!(graph.diameter(), None);

        assert_eq!(Graph::path(4).diameter(), Some(3));
        assert_eq!(Graph::path(5).radius(), Some(2));
        assert_eq!(Graph::grid_2d(3, 3).diameter(), Some(4));
    }

    #[test]
    fn test_parse_edge_list() {
        let dir = std::env::temp_dir();
        let path = dir.join("graph_ilp_solver_parse_test.edges");
        {
            let mut file = File::create(&path).unwrap();
            writeln!(file, "# a comment").unwrap();
            writeln!(file, "NAME: tiny").unwrap();
            writeln!(file, "a b 3.5").unwrap();
            writeln!(file, "b c").unwrap();
            writeln!(file, "NODE lonely").unwrap();
            writeln!(file, "d").unwrap();
            writeln!(file, "EOF").unwrap();
        }

        let graph = Graph::from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(graph.name, "tiny");
        // no end-of-file marker: a lone token is always a vertex
        assert_eq!(graph.num_nodes(), 6);
        assert_eq!(graph.num_edges(), 2);
        assert_eq!(graph.degree(graph.index_of("lonely").unwrap()), 0);
        assert!(graph.index_of("EOF").is_some());
    }

    #[test]
    fn test_json_roundtrip_keeps_isolated_nodes() {
        let mut graph = Graph::path(3);
        graph.add_node("x");
        let json = graph.to_json().unwrap();

        let path = std::env::temp_dir().join("graph_ilp_solver_json_test.json");
        std::fs::write(&path, json).unwrap();
        let loaded = Graph::from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded.num_nodes(), 4);
        assert_eq!(loaded.num_edges(), 2);
    }

    #[test]
    fn test_graph_spec_parsing() {
        assert_eq!("path:6".parse::<GraphSpec>().unwrap(), GraphSpec::Path(6));
        assert_eq!("grid:3x4".parse::<GraphSpec>().unwrap(), GraphSpec::Grid(3, 4));
        assert_eq!(
            "gnp:10:0.5:3".parse::<GraphSpec>().unwrap(),
            GraphSpec::Gnp { n: 10, p: 0.5, seed: 3 }
        );
        assert!("gnp:10:1.5".parse::<GraphSpec>().is_err());
        assert!("hexagon:3".parse::<GraphSpec>().is_err());
    }
}
