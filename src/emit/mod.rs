mod json;
mod markdown;

pub use json::{BudgetReport, FileStats, RankedFile, RunReport};
pub use markdown::render_markdown;
