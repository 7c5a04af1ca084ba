mod centrality;
pub mod graph;
pub mod imports;
pub mod lang;
mod skeleton;

pub use centrality::{
    heuristic_scores, pagerank, rank_files, Ranking, ScoringMethod, DAMPING, MAX_ITERATIONS,
    TOLERANCE,
};
pub use graph::{ImportGraph, SourceUnit};
pub use imports::{ImportRef, ImportResolver};
pub use skeleton::{
    extract_imports, extract_skeleton, raw_excerpt, ExtractionStrategy, Skeleton, SkeletonStatus,
    EXCERPT_CHARS, EXCERPT_LINES,
};
