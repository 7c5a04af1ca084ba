use crate::summarize::SummaryOutcome;

/// Human-readable summary document.
pub fn render_markdown(repository: &str, outcome: &SummaryOutcome) -> String {
    let result = &outcome.result;
    let package = &outcome.context.package;
    let mut out = format!("# {}\n\n{}\n\n", repository, result.summary);

    if !result.technologies.is_empty() {
        out.push_str("## Technologies\n\n");
        for tech in &result.technologies {
            out.push_str(&format!("- {}\n", tech));
        }
        out.push('\n');
    }

    if !result.structure.is_empty() {
        out.push_str(&format!("## Structure\n\n{}\n\n", result.structure));
    }

    out.push_str("## Context\n\n");
    out.push_str("| Slot | Base | Carried | Used | Kept |\n");
    out.push_str("|------|-----:|--------:|-----:|-----:|\n");
    for slot in &package.slots {
        out.push_str(&format!(
            "| {} | {} | {} | {} | {}/{} |\n",
            slot.name.as_str(),
            slot.base,
            slot.carried_in,
            slot.used,
            slot.units_kept,
            slot.units_offered
        ));
    }
    out.push_str(&format!(
        "\n{} of {} tokens, {} via {}, {} redaction(s), fingerprint `{}`\n",
        package.total_tokens,
        outcome.context.plan.total,
        outcome.mode.as_str(),
        outcome.model,
        package.redaction_count(),
        &package.fingerprint()[..12]
    ));

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::budget::BpeCounter;
    use crate::config::Config;
    use crate::summarize::{load_files, prepare_context, select_files, SummaryMode};
    use crate::types::{RepoTree, SummaryResult, TreeEntry};

    #[test]
    fn test_render_markdown() {
        let tree = RepoTree {
            revision: "main".to_string(),
            entries: vec![TreeEntry::file("lib.rs", 20)],
        };
        let config = Config::default();
        let selection = select_files(&tree, &config.budget).unwrap();
        let files = load_files(
            &selection,
            [("lib.rs".to_string(), "pub fn run() {}\n".to_string())]
                .into_iter()
                .collect(),
        );
        let context = prepare_context(selection, files, &config, &BpeCounter::default());
        let outcome = SummaryOutcome {
            result: SummaryResult {
                summary: "A tiny library.".to_string(),
                technologies: vec!["Rust".to_string()],
                structure: String::new(),
            },
            mode: SummaryMode::SinglePass,
            context,
            file_summaries: Vec::new(),
            synthesis: None,
            model_calls: 1,
            model: "gpt-4o-mini".to_string(),
        };

        let md = render_markdown("demo", &outcome);
        assert!(md.starts_with("# demo\n\nA tiny library.\n"));
        assert!(md.contains("## Technologies\n\n- Rust\n"));
        assert!(!md.contains("## Structure"));
        assert!(md.contains("| skeletons |"));
        assert!(md.contains("single-pass via gpt-4o-mini"));
        assert!(md.ends_with("`\n"));
    }
}
