//! Context assembly: filled slots become one prompt payload.

use serde::Serialize;
use sha2::{Digest, Sha256};

use tracing::debug;

use crate::budget::{allocate, BudgetPlan, BudgetSlot, SlotContents, SlotName, TokenCounter};
use crate::security::RedactionReport;

/// Placed between emitted sections
pub const SECTION_SEPARATOR: &str = "\n\n---\n\n";

fn section_header(slot: SlotName) -> Option<&'static str> {
    match slot {
        SlotName::Readme => Some("## README"),
        SlotName::Config => Some("## Configuration"),
        SlotName::Tree => Some("## Directory Structure"),
        SlotName::Skeletons => Some("## Key Source Files (Skeletons)"),
        SlotName::Reserve => None,
    }
}

/// Final context handed to the orchestrator.
#[derive(Debug, Clone, Serialize)]
pub struct ContextPackage {
    #[serde(skip)]
    pub payload: String,
    /// Tokens of the whole payload, counted exactly
    pub total_tokens: usize,
    pub slots: Vec<BudgetSlot>,
    /// Non-empty reports only, in the order fragments were produced
    pub redactions: Vec<RedactionReport>,
    pub multi_pass: bool,
    /// Ranked source files whose skeletons did not fit
    pub omitted_files: Vec<String>,
}

impl ContextPackage {
    /// Hex SHA-256 of the payload
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(self.payload.as_bytes());
        digest.iter().map(|b| format!("{:02x}", b)).collect()
    }

    pub fn slot(&self, name: SlotName) -> Option<&BudgetSlot> {
        self.slots.iter().find(|s| s.name == name)
    }

    pub fn truncated_slots(&self) -> Vec<SlotName> {
        self.slots
            .iter()
            .filter(|s| s.truncated())
            .map(|s| s.name)
            .collect()
    }

    pub fn redaction_count(&self) -> usize {
        self.redactions.iter().map(RedactionReport::len).sum()
    }
}

/// Tokens a slot's header and the separator before it add to the payload.
pub fn framing_tokens(slot: SlotName, counter: &dyn TokenCounter) -> usize {
    section_header(slot)
        .map(|header| {
            counter.count(&format!("{}\n\n", header)) + counter.count(SECTION_SEPARATOR)
        })
        .unwrap_or(0)
}

fn framed(mut contents: SlotContents, counter: &dyn TokenCounter) -> SlotContents {
    contents.readme = contents
        .readme
        .with_framing(framing_tokens(SlotName::Readme, counter));
    contents.config = contents
        .config
        .with_framing(framing_tokens(SlotName::Config, counter));
    contents.tree = contents
        .tree
        .with_framing(framing_tokens(SlotName::Tree, counter));
    contents.skeletons = contents
        .skeletons
        .with_framing(framing_tokens(SlotName::Skeletons, counter));
    contents
}

/// Allocate `contents` under `plan` and assemble the result.
///
/// Headers and separators are charged to the slot they introduce. If the
/// counted payload still overshoots the plan's total, the plan is shrunk by
/// the overshoot and the allocation repeated, so `total_tokens` never
/// exceeds `plan.total`.
pub fn pack(
    plan: &BudgetPlan,
    contents: SlotContents,
    redactions: Vec<RedactionReport>,
    skeleton_sources: &[String],
    multi_pass: bool,
    counter: &dyn TokenCounter,
) -> ContextPackage {
    let contents = framed(contents, counter);
    let mut current = *plan;
    loop {
        let slots = allocate(&current, contents.clone(), counter);
        let package = assemble(
            slots,
            redactions.clone(),
            skeleton_sources,
            multi_pass,
            counter,
        );
        if package.total_tokens <= plan.total || current.capacity() == 0 {
            return package;
        }
        let over = package.total_tokens - plan.total;
        debug!(
            "Payload of {} tokens is {} over budget, shrinking plan",
            package.total_tokens, over
        );
        current = current.shrink(over);
    }
}

/// Join filled slots in fill order under fixed headers.
///
/// Empty slots are left out. `skeleton_sources[i]` names the file behind
/// the i-th unit offered to the Skeletons slot.
pub fn assemble(
    slots: Vec<BudgetSlot>,
    redactions: Vec<RedactionReport>,
    skeleton_sources: &[String],
    multi_pass: bool,
    counter: &dyn TokenCounter,
) -> ContextPackage {
    let sections: Vec<String> = slots
        .iter()
        .filter(|slot| !slot.content.is_empty())
        .filter_map(|slot| {
            section_header(slot.name).map(|header| format!("{}\n\n{}", header, slot.content))
        })
        .collect();

    let omitted_files = slots
        .iter()
        .find(|s| s.name == SlotName::Skeletons)
        .map(|s| {
            s.omitted
                .iter()
                .filter_map(|&i| skeleton_sources.get(i).cloned())
                .collect()
        })
        .unwrap_or_default();

    let payload = sections.join(SECTION_SEPARATOR);
    ContextPackage {
        total_tokens: counter.count(&payload),
        payload,
        slots,
        redactions: redactions.into_iter().filter(|r| !r.is_empty()).collect(),
        multi_pass,
        omitted_files,
    }
}
