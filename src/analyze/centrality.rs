//! Structural importance of files.
//!
//! With import edges available, files are ranked by random-surfer
//! centrality over the [`ImportGraph`]. Without any edges a weighted path
//! heuristic stands in. Either way the final order is total: score
//! descending, then path ascending.

use petgraph::graph::NodeIndex;
use petgraph::Direction;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

use super::graph::ImportGraph;
use crate::scan::categorize;
use crate::types::FileCategory;

pub const DAMPING: f64 = 0.85;
/// Stop when the L1 change between iterations drops below this
pub const TOLERANCE: f64 = 1e-6;
pub const MAX_ITERATIONS: usize = 100;

const WEIGHT_DEPTH: f64 = 0.35;
const WEIGHT_ENTRY_POINT: f64 = 0.30;
const WEIGHT_SIZE: f64 = 0.20;
const WEIGHT_CANONICAL: f64 = 0.15;

const ENTRY_STEMS: &[&str] = &["main", "__main__", "app", "index", "cli", "server", "manage", "run"];
const CANONICAL_DIRS: &[&str] = &["src", "lib", "app", "cmd", "pkg", "internal", "server", "core"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringMethod {
    Centrality,
    Heuristic,
}

/// Scores for every file plus how they were computed
#[derive(Debug, Clone)]
pub struct Ranking {
    pub method: ScoringMethod,
    pub scores: BTreeMap<String, f64>,
}

impl Ranking {
    /// Paths in rank order
    pub fn ordered(&self) -> Vec<(&str, f64)> {
        let mut ranked: Vec<(&str, f64)> =
            self.scores.iter().map(|(p, s)| (p.as_str(), *s)).collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranked
    }
}

/// Score every vertex of `graph`. `sizes` feeds the heuristic fallback.
pub fn rank_files(graph: &ImportGraph, sizes: &BTreeMap<String, u64>) -> Ranking {
    if graph.edge_count() == 0 {
        let files: Vec<(&str, u64)> = graph
            .paths()
            .map(|p| (p, sizes.get(p).copied().unwrap_or(0)))
            .collect();
        debug!("No import edges, ranking {} files heuristically", files.len());
        return Ranking {
            method: ScoringMethod::Heuristic,
            scores: heuristic_scores(&files),
        };
    }

    Ranking {
        method: ScoringMethod::Centrality,
        scores: pagerank(graph),
    }
}

/// Random-surfer centrality.
///
/// Connected files share the rank mass; a file's score accumulates from its
/// importers, each dividing its own score among its out-edges. Files with
/// no edges at all get `(1 - d) / 2N`, below anything connected.
pub fn pagerank(graph: &ImportGraph) -> BTreeMap<String, f64> {
    let inner = graph.inner();
    let total = inner.node_count();
    if total == 0 {
        return BTreeMap::new();
    }
    let floor = (1.0 - DAMPING) / (2.0 * total as f64);

    let degree = |idx: NodeIndex, dir: Direction| inner.neighbors_directed(idx, dir).count();
    let connected: Vec<NodeIndex> = inner
        .node_indices()
        .filter(|&idx| degree(idx, Direction::Outgoing) + degree(idx, Direction::Incoming) > 0)
        .collect();

    let mut scores: BTreeMap<String, f64> =
        inner.node_indices().map(|idx| (inner[idx].clone(), floor)).collect();
    if connected.is_empty() {
        return scores;
    }

    let n = connected.len() as f64;
    let position: BTreeMap<NodeIndex, usize> =
        connected.iter().enumerate().map(|(i, idx)| (*idx, i)).collect();
    let out_degree: Vec<usize> = connected
        .iter()
        .map(|&idx| degree(idx, Direction::Outgoing))
        .collect();

    let mut rank = vec![1.0 / n; connected.len()];
    for iteration in 0..MAX_ITERATIONS {
        let dangling: f64 = rank
            .iter()
            .zip(&out_degree)
            .filter(|(_, d)| **d == 0)
            .map(|(r, _)| *r)
            .sum();
        let base = (1.0 - DAMPING) / n + DAMPING * dangling / n;

        let next: Vec<f64> = connected
            .iter()
            .map(|&idx| {
                let inflow: f64 = inner
                    .neighbors_directed(idx, Direction::Incoming)
                    .map(|src| {
                        let i = position[&src];
                        rank[i] / out_degree[i] as f64
                    })
                    .sum();
                base + DAMPING * inflow
            })
            .collect();

        let delta: f64 = next.iter().zip(&rank).map(|(a, b)| (a - b).abs()).sum();
        rank = next;
        if delta < TOLERANCE {
            debug!("Centrality converged after {} iterations", iteration + 1);
            break;
        }
    }

    for (idx, r) in connected.iter().zip(rank) {
        scores.insert(inner[*idx].clone(), r);
    }
    scores
}

/// Weighted path heuristic: shallow paths, entry-point names, larger files
/// and canonical top-level directories score higher.
pub fn heuristic_scores(files: &[(&str, u64)]) -> BTreeMap<String, f64> {
    let median = median_size(files.iter().map(|(_, s)| *s).collect());

    files
        .iter()
        .map(|(path, size)| {
            let depth = path.matches('/').count();
            let inverse_depth = 1.0 / (1.0 + depth as f64);

            let name = path.rsplit('/').next().unwrap_or(path);
            let stem = name.split('.').next().unwrap_or(name);
            let entry_point = categorize(path) == FileCategory::EntryPoint
                || ENTRY_STEMS.contains(&stem);

            let relative_size = if median > 0.0 {
                (*size as f64 / median).min(2.0) / 2.0
            } else {
                0.0
            };

            let top = path.split('/').next().unwrap_or("");
            let canonical = depth == 0 || CANONICAL_DIRS.contains(&top);

            let score = WEIGHT_DEPTH * inverse_depth
                + WEIGHT_ENTRY_POINT * flag(entry_point)
                + WEIGHT_SIZE * relative_size
                + WEIGHT_CANONICAL * flag(canonical);
            (path.to_string(), score)
        })
        .collect()
}

fn flag(value: bool) -> f64 {
    if value {
        1.0
    } else {
        0.0
    }
}

fn median_size(mut sizes: Vec<u64>) -> f64 {
    if sizes.is_empty() {
        return 0.0;
    }
    sizes.sort_unstable();
    let mid = sizes.len() / 2;
    if sizes.len() % 2 == 0 {
        (sizes[mid - 1] as f64 + sizes[mid] as f64) / 2.0
    } else {
        sizes[mid] as f64
    }
}
