use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use std::collections::BTreeMap;
use tracing::debug;

use super::imports::ImportResolver;
use super::skeleton::extract_imports;
use crate::types::Language;

/// Directed "imports" graph over a fixed set of repository files.
///
/// An edge `a -> b` means `a` imports `b`. Every endpoint is a vertex,
/// there are no self-loops and at most one edge per ordered pair.
#[derive(Debug, Clone, Default)]
pub struct ImportGraph {
    graph: DiGraph<String, ()>,
    nodes: BTreeMap<String, NodeIndex>,
}

/// A file offered to [`ImportGraph::build`]
pub struct SourceUnit<'a> {
    pub path: &'a str,
    pub language: Language,
    pub content: &'a str,
}

impl ImportGraph {
    /// Graph with one vertex per path, inserted in sorted order.
    pub fn new<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut sorted: Vec<String> = paths.into_iter().map(Into::into).collect();
        sorted.sort();
        sorted.dedup();

        let mut graph = DiGraph::new();
        let mut nodes = BTreeMap::new();
        for path in sorted {
            let idx = graph.add_node(path.clone());
            nodes.insert(path, idx);
        }
        Self { graph, nodes }
    }

    /// Detect imports in every unit and link those that resolve to another unit.
    pub fn build(units: &[SourceUnit<'_>]) -> Self {
        let mut graph = Self::new(units.iter().map(|u| u.path));
        let resolver = ImportResolver::new(units.iter().map(|u| u.path));

        for unit in units {
            for import in extract_imports(unit.content, unit.language) {
                for target in resolver.resolve(unit.path, unit.language, &import) {
                    graph.add_edge(unit.path, &target);
                }
            }
        }

        debug!(
            "Import graph: {} files, {} edges",
            graph.node_count(),
            graph.edge_count()
        );
        graph
    }

    /// Add `from -> to`. Unknown endpoints, self-loops and duplicates are
    /// ignored; returns whether an edge was added.
    pub fn add_edge(&mut self, from: &str, to: &str) -> bool {
        if from == to {
            return false;
        }
        let (Some(&a), Some(&b)) = (self.nodes.get(from), self.nodes.get(to)) else {
            return false;
        };
        if self.graph.contains_edge(a, b) {
            return false;
        }
        self.graph.add_edge(a, b, ());
        true
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Vertex paths, sorted
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }

    /// Files `path` imports, sorted
    pub fn imports_of(&self, path: &str) -> Vec<&str> {
        self.neighbors(path, Direction::Outgoing)
    }

    /// Files importing `path`, sorted
    pub fn importers_of(&self, path: &str) -> Vec<&str> {
        self.neighbors(path, Direction::Incoming)
    }

    fn neighbors(&self, path: &str, direction: Direction) -> Vec<&str> {
        let Some(&idx) = self.nodes.get(path) else {
            return Vec::new();
        };
        let mut found: Vec<&str> = self
            .graph
            .neighbors_directed(idx, direction)
            .map(|n| self.graph[n].as_str())
            .collect();
        found.sort_unstable();
        found
    }

    pub(crate) fn inner(&self) -> &DiGraph<String, ()> {
        &self.graph
    }
}
