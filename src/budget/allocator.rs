use serde::Serialize;
use tracing::debug;

use super::tokenizer::TokenCounter;
use crate::config::SlotPercentages;

/// Context sections, in fill order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotName {
    Readme,
    Config,
    Tree,
    Skeletons,
    Reserve,
}

impl SlotName {
    pub const ORDER: [SlotName; 5] = [
        SlotName::Readme,
        SlotName::Config,
        SlotName::Tree,
        SlotName::Skeletons,
        SlotName::Reserve,
    ];

    pub fn index(&self) -> usize {
        match self {
            SlotName::Readme => 0,
            SlotName::Config => 1,
            SlotName::Tree => 2,
            SlotName::Skeletons => 3,
            SlotName::Reserve => 4,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SlotName::Readme => "readme",
            SlotName::Config => "config",
            SlotName::Tree => "tree",
            SlotName::Skeletons => "skeletons",
            SlotName::Reserve => "reserve",
        }
    }
}

/// Base quota per slot for one total budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BudgetPlan {
    pub total: usize,
    base: [usize; 5],
}

impl BudgetPlan {
    /// Percent of `total`, rounded down; the rounding remainder goes to the
    /// last slot so the bases add up to `total * sum(percent) / 100`.
    pub fn new(total: usize, percentages: &SlotPercentages) -> Self {
        let pct = percentages.in_order();
        let mut base = [0usize; 5];
        for (slot, p) in base.iter_mut().zip(pct.iter()) {
            *slot = total * (*p as usize) / 100;
        }

        let target = total * (percentages.sum() as usize) / 100;
        let assigned: usize = base.iter().sum();
        base[4] += target.saturating_sub(assigned);

        Self { total, base }
    }

    pub fn base(&self, slot: SlotName) -> usize {
        self.base[slot.index()]
    }

    /// Same plan with `tokens` taken off the bases, Skeletons first, then the
    /// other slots in reverse fill order.
    pub fn shrink(&self, tokens: usize) -> Self {
        let mut base = self.base;
        let mut left = tokens;
        for name in [
            SlotName::Skeletons,
            SlotName::Reserve,
            SlotName::Tree,
            SlotName::Config,
            SlotName::Readme,
        ] {
            let cut = left.min(base[name.index()]);
            base[name.index()] -= cut;
            left -= cut;
        }
        Self {
            total: self.total,
            base,
        }
    }

    /// Sum of all bases
    pub fn capacity(&self) -> usize {
        self.base.iter().sum()
    }
}

/// How a slot may be cut when it does not fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    /// Keep the longest prefix of lines that fits
    Line,
    /// Keep every block that fits, in order, skipping the ones that do not
    Block,
}

/// Units of text offered to one slot.
#[derive(Debug, Clone)]
pub struct SlotContent {
    units: Vec<String>,
    boundary: Boundary,
    /// Tokens charged on top of the units once anything is kept
    framing: usize,
}

impl SlotContent {
    pub fn empty() -> Self {
        Self {
            units: Vec::new(),
            boundary: Boundary::Line,
            framing: 0,
        }
    }

    /// Split `text` into lines; trailing whitespace of the whole text is dropped.
    pub fn text(text: &str) -> Self {
        let trimmed = text.trim_end();
        if trimmed.is_empty() {
            return Self::empty();
        }
        Self::lines(trimmed.lines().map(str::to_string).collect())
    }

    pub fn lines(lines: Vec<String>) -> Self {
        Self {
            units: lines,
            boundary: Boundary::Line,
            framing: 0,
        }
    }

    pub fn blocks(blocks: Vec<String>) -> Self {
        Self {
            units: blocks,
            boundary: Boundary::Block,
            framing: 0,
        }
    }

    /// Charge `tokens` of surrounding text (headers, separators) to the slot
    /// whenever it keeps at least one unit.
    pub fn with_framing(mut self, tokens: usize) -> Self {
        self.framing = tokens;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    fn separator(&self) -> &'static str {
        match self.boundary {
            Boundary::Line => "\n",
            Boundary::Block => "\n\n",
        }
    }
}

/// Offered content for the four emitted slots. Reserve never holds content.
#[derive(Debug, Clone)]
pub struct SlotContents {
    pub readme: SlotContent,
    pub config: SlotContent,
    pub tree: SlotContent,
    pub skeletons: SlotContent,
}

impl SlotContents {
    fn take(&mut self, slot: SlotName) -> SlotContent {
        let content = match slot {
            SlotName::Readme => &mut self.readme,
            SlotName::Config => &mut self.config,
            SlotName::Tree => &mut self.tree,
            SlotName::Skeletons => &mut self.skeletons,
            SlotName::Reserve => return SlotContent::empty(),
        };
        std::mem::replace(content, SlotContent::empty())
    }
}

/// A filled slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BudgetSlot {
    pub name: SlotName,
    pub base: usize,
    /// Surplus rolled in from the previous slot
    pub carried_in: usize,
    /// Tokens of `content` plus its framing when non-empty
    pub used: usize,
    #[serde(skip)]
    pub content: String,
    pub units_offered: usize,
    pub units_kept: usize,
    /// Indices of offered units that were left out
    pub omitted: Vec<usize>,
}

impl BudgetSlot {
    pub fn effective(&self) -> usize {
        self.base + self.carried_in
    }

    pub fn unused(&self) -> usize {
        self.effective().saturating_sub(self.used)
    }

    pub fn truncated(&self) -> bool {
        self.units_kept < self.units_offered
    }
}

/// Fill every slot in order, rolling each slot's unused quota into the next.
///
/// Reserve is processed last and its surplus is dropped, so the sum of
/// `used` never exceeds the plan's total.
pub fn allocate(
    plan: &BudgetPlan,
    mut contents: SlotContents,
    counter: &dyn TokenCounter,
) -> Vec<BudgetSlot> {
    let mut slots = Vec::with_capacity(SlotName::ORDER.len());
    let mut carry = 0usize;

    for name in SlotName::ORDER {
        let content = contents.take(name);
        let base = plan.base(name);
        let quota = base + carry;

        let fill = fill_framed(&content, quota, counter);

        let slot = BudgetSlot {
            name,
            base,
            carried_in: carry,
            used: fill.used,
            content: fill.text,
            units_offered: content.len(),
            units_kept: content.len() - fill.omitted.len(),
            omitted: fill.omitted,
        };

        debug!(
            "Slot {}: base {} + carried {} = {}, used {}, kept {}/{}",
            name.as_str(),
            slot.base,
            slot.carried_in,
            slot.effective(),
            slot.used,
            slot.units_kept,
            slot.units_offered
        );

        carry = slot.unused();
        slots.push(slot);
    }

    slots
}

/// Longest line prefix of `text` that fits `quota` tokens.
pub fn fit_lines(text: &str, quota: usize, counter: &dyn TokenCounter) -> String {
    fill_prefix(&SlotContent::text(text), quota, counter).text
}

/// Fill the units within what is left of `quota` after framing.
fn fill_framed(content: &SlotContent, quota: usize, counter: &dyn TokenCounter) -> Fill {
    let Some(room) = quota.checked_sub(content.framing) else {
        return Fill {
            text: String::new(),
            used: 0,
            omitted: (0..content.len()).collect(),
        };
    };
    let mut fill = match content.boundary {
        Boundary::Line => fill_prefix(content, room, counter),
        Boundary::Block => fill_greedy(content, room, counter),
    };
    if fill.text.is_empty() {
        fill.used = 0;
    } else {
        fill.used += content.framing;
    }
    fill
}

struct Fill {
    text: String,
    used: usize,
    omitted: Vec<usize>,
}

/// Longest prefix of units whose joined text fits `quota`, by binary search.
fn fill_prefix(content: &SlotContent, quota: usize, counter: &dyn TokenCounter) -> Fill {
    let sep = content.separator();
    let joined = |k: usize| content.units[..k].join(sep);

    let all = joined(content.len());
    let all_tokens = counter.count(&all);
    if all_tokens <= quota {
        return Fill {
            text: all,
            used: all_tokens,
            omitted: Vec::new(),
        };
    }

    // Invariant: prefix `lo` fits, prefix `hi + 1` does not
    let mut lo = 0usize;
    let mut hi = content.len() - 1;
    let mut lo_tokens = 0usize;
    while lo < hi {
        let mid = (lo + hi + 1) / 2;
        let tokens = counter.count(&joined(mid));
        if tokens <= quota {
            lo = mid;
            lo_tokens = tokens;
        } else {
            hi = mid - 1;
        }
    }

    Fill {
        text: joined(lo),
        used: lo_tokens,
        omitted: (lo..content.len()).collect(),
    }
}

/// Add units in order, skipping any that would overflow `quota`.
fn fill_greedy(content: &SlotContent, quota: usize, counter: &dyn TokenCounter) -> Fill {
    let sep = content.separator();
    let mut text = String::new();
    let mut used = 0usize;
    let mut omitted = Vec::new();

    for (i, unit) in content.units.iter().enumerate() {
        let candidate = if text.is_empty() {
            unit.clone()
        } else {
            format!("{}{}{}", text, sep, unit)
        };
        let tokens = counter.count(&candidate);
        if tokens <= quota {
            text = candidate;
            used = tokens;
        } else {
            omitted.push(i);
        }
    }

    Fill {
        text,
        used,
        omitted,
    }
}
