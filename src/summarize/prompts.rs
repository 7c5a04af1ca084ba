use crate::llm::Prompt;

pub const SUMMARY_SYSTEM_PROMPT: &str = "\
You are a senior software analyst. Given information about a source code \
repository (language breakdown, README, configuration files, directory tree \
and structural skeletons of key source files), produce a structured JSON analysis.

Return only valid JSON with exactly these three keys:

{
  \"summary\": \"<description>\",
  \"technologies\": [\"<language>\", \"<framework>\", ...],
  \"structure\": \"<layout>\"
}

Guidelines:
- Be specific and factual. Only mention technologies you see evidence of.
- For technologies, list languages ordered by share, then frameworks and notable libraries.
- For structure, write 1-2 sentences on how the project is organised, naming the concrete directories and files from the tree.
- Do not invent information the content does not support.
- Text shown as [REDACTED] was removed on purpose; do not speculate about it.
";

pub const FILE_SUMMARY_SYSTEM_PROMPT: &str = "\
You are a code analyst. Summarise the following source file in 2-3 sentences: \
what it does, what it exports and its role in the project.

Reply with the summary as plain text, without markdown or code fences.
";

const SYNTHESIS_NOTE: &str = "\
The repository was too large for one pass. The Key Source Files section \
below holds per-file summaries of the most central files instead of skeletons.";

/// Single-pass request over the assembled context
pub fn summary_prompt(payload: &str) -> Prompt {
    Prompt::new(SUMMARY_SYSTEM_PROMPT, payload)
}

/// Pass-1 request for one file
pub fn file_summary_prompt(path: &str, content: &str) -> Prompt {
    Prompt::new(
        FILE_SUMMARY_SYSTEM_PROMPT,
        format!("File: {}\n\n{}", path, content),
    )
}

/// Pass-2 request over the re-assembled context
pub fn synthesis_prompt(payload: &str) -> Prompt {
    Prompt::new(
        SUMMARY_SYSTEM_PROMPT,
        format!("{}\n\n{}", SYNTHESIS_NOTE, payload),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_prompt_names_path() {
        let prompt = file_summary_prompt("src/app.py", "def main(): ...");
        assert!(prompt.user.starts_with("File: src/app.py\n\n"));
        assert!(prompt.system.contains("plain text"));
    }

    #[test]
    fn test_synthesis_keeps_payload() {
        let prompt = synthesis_prompt("## README\n\nhi");
        assert!(prompt.user.ends_with("## README\n\nhi"));
        assert_eq!(prompt.system, SUMMARY_SYSTEM_PROMPT);
    }
}
