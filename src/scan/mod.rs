mod category;
mod filter;
mod tree;

pub use category::{categorize, fetch_priority};
pub use filter::{classify_path, sniff_content, Classification, SkipReason};
pub use tree::{language_breakdown, render_tree, MAX_TREE_ENTRIES};
