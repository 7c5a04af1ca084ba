//! Token budgeting: exact counting and slot allocation with rollover.

mod allocator;
mod tokenizer;

pub use allocator::{
    allocate, fit_lines, Boundary, BudgetPlan, BudgetSlot, SlotContent, SlotContents,
    SlotName,
};
pub use tokenizer::{BpeCounter, TokenCounter, TokenizerKind};
