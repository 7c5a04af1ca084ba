use std::collections::BTreeMap;

use crate::types::{Language, TreeEntry};

/// Upper bound on listed entries before the tail is collapsed
pub const MAX_TREE_ENTRIES: usize = 500;

/// Render kept file paths one per line, sorted.
///
/// Each line is one unit for the Tree slot, so truncation never splits a
/// path.
pub fn render_tree(entries: &[&TreeEntry]) -> Vec<String> {
    let mut paths: Vec<&str> = entries
        .iter()
        .filter(|e| e.is_file())
        .map(|e| e.path.as_str())
        .collect();
    paths.sort_unstable();
    paths.dedup();

    let total = paths.len();
    let mut lines: Vec<String> = paths
        .into_iter()
        .take(MAX_TREE_ENTRIES)
        .map(|p| p.to_string())
        .collect();

    if total > MAX_TREE_ENTRIES {
        lines.push(format!("… and {} more files", total - MAX_TREE_ENTRIES));
    }

    lines
}

/// Byte-weighted language percentages, e.g. `Languages: Python 71.2%, Shell 28.8%`.
///
/// Only programming languages count. Returns `None` when no code was found.
pub fn language_breakdown(entries: &[&TreeEntry]) -> Option<String> {
    let mut bytes: BTreeMap<Language, u64> = BTreeMap::new();
    for entry in entries.iter().filter(|e| e.is_file()) {
        let language = Language::from_path(&entry.path);
        if language.is_code() {
            *bytes.entry(language).or_insert(0) += entry.size.max(1);
        }
    }

    let total: u64 = bytes.values().sum();
    if total == 0 {
        return None;
    }

    let mut ranked: Vec<(Language, u64)> = bytes.into_iter().collect();
    // Largest first; BTreeMap order breaks ties
    ranked.sort_by(|a, b| b.1.cmp(&a.1));

    let parts: Vec<String> = ranked
        .iter()
        .map(|(lang, n)| format!("{} {:.1}%", lang.name(), *n as f64 * 100.0 / total as f64))
        .collect();

    Some(format!("Languages: {}", parts.join(", ")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_tree_sorted_files_only() {
        let entries = vec![
            TreeEntry::file("src/b.py", 10),
            TreeEntry::directory("src"),
            TreeEntry::file("README.md", 10),
            TreeEntry::file("src/a.py", 10),
        ];
        let refs: Vec<&TreeEntry> = entries.iter().collect();
        assert_eq!(render_tree(&refs), vec!["README.md", "src/a.py", "src/b.py"]);
    }

    #[test]
    fn test_render_tree_caps_entries() {
        let entries: Vec<TreeEntry> = (0..MAX_TREE_ENTRIES + 3)
            .map(|i| TreeEntry::file(format!("f{:04}.txt", i), 1))
            .collect();
        let refs: Vec<&TreeEntry> = entries.iter().collect();
        let lines = render_tree(&refs);
        assert_eq!(lines.len(), MAX_TREE_ENTRIES + 1);
        assert_eq!(lines.last().unwrap(), "… and 3 more files");
    }

    #[test]
    fn test_language_breakdown() {
        let entries = vec![
            TreeEntry::file("a.py", 300),
            TreeEntry::file("b.sh", 100),
            TreeEntry::file("README.md", 5000),
        ];
        let refs: Vec<&TreeEntry> = entries.iter().collect();
        assert_eq!(
            language_breakdown(&refs).unwrap(),
            "Languages: Python 75.0%, Shell 25.0%"
        );
    }

    #[test]
    fn test_language_breakdown_none_without_code() {
        let entries = vec![TreeEntry::file("README.md", 5000)];
        let refs: Vec<&TreeEntry> = entries.iter().collect();
        assert!(language_breakdown(&refs).is_none());
    }
}
