use once_cell::sync::Lazy;
use regex::Regex;

/// Longest signature kept for one declaration, in bytes
const MAX_SIGNATURE_BYTES: usize = 400;
/// Comment lines kept above one declaration
const MAX_DOC_LINES: usize = 12;

/// A declaration pattern.
///
/// Patterns are multi-line regexes that start with `^(?P<indent>[ \t]*)`
/// so the capture begins at the declaration keyword. Optional `name` and
/// `ret` groups are checked against `reject` to drop control-flow lookalikes.
pub struct DeclarationRule {
    pub pattern: &'static Lazy<Regex>,
    pub reject: &'static [&'static str],
}

/// How a language writes comments
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentStyle {
    /// `//`, `/* */`, `///`
    Slash,
    /// `#`
    Hash,
    /// both, as in PHP
    SlashAndHash,
}

impl CommentStyle {
    fn is_comment(&self, trimmed: &str) -> bool {
        let slash = trimmed.starts_with("//")
            || trimmed.starts_with("/*")
            || trimmed.starts_with('*');
        let hash = trimmed.starts_with('#') && !trimmed.starts_with("#[");
        match self {
            CommentStyle::Slash => slash,
            CommentStyle::Hash => hash,
            CommentStyle::SlashAndHash => slash || hash,
        }
    }
}

/// One declaration found by a pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    /// 1-based line of the declaration keyword
    pub line: usize,
    pub indent: String,
    /// Keyword through end of signature, whitespace collapsed
    pub signature: String,
    /// Comment and attribute lines directly above, trimmed
    pub doc: Vec<String>,
}

/// Run every rule over `content` and return declarations in source order,
/// at most one per line.
pub fn collect_declarations(
    content: &str,
    rules: &[DeclarationRule],
    comments: CommentStyle,
) -> Vec<Declaration> {
    let mut found: Vec<(usize, Declaration)> = Vec::new();

    for rule in rules {
        for cap in rule.pattern.captures_iter(content) {
            let rejected = ["name", "ret"].iter().any(|group| {
                cap.name(group)
                    .map(|m| rule.reject.contains(&m.as_str()))
                    .unwrap_or(false)
            });
            if rejected {
                continue;
            }

            let (whole, indent) = match (cap.get(0), cap.name("indent")) {
                (Some(whole), Some(indent)) => (whole, indent),
                _ => continue,
            };
            let start = indent.end();
            let end = signature_end(content, start);
            let signature = collapse_whitespace(&content[start..end]);
            if signature.is_empty() {
                continue;
            }

            found.push((
                start,
                Declaration {
                    line: line_number_at_offset(content, start),
                    indent: indent.as_str().to_string(),
                    signature,
                    doc: preceding_comments(content, whole.start(), comments),
                },
            ));
        }
    }

    found.sort_by_key(|(offset, _)| *offset);
    let mut declarations: Vec<Declaration> = Vec::with_capacity(found.len());
    for (_, decl) in found {
        if declarations.last().map(|d| d.line) != Some(decl.line) {
            declarations.push(decl);
        }
    }
    declarations
}

/// Render declarations with their comments, keeping source indentation.
pub fn render(declarations: &[Declaration]) -> String {
    let mut lines = Vec::new();
    for decl in declarations {
        for doc in &decl.doc {
            lines.push(format!("{}{}", decl.indent, doc));
        }
        lines.push(format!("{}{}", decl.indent, decl.signature));
    }
    lines.join("\n")
}

pub fn line_number_at_offset(content: &str, offset: usize) -> usize {
    content[..offset].matches('\n').count() + 1
}

/// End of the signature starting at `start`: the first `{`, `;` or newline
/// outside brackets and strings.
fn signature_end(content: &str, start: usize) -> usize {
    let bytes = content.as_bytes();
    let limit = floor_char_boundary(content, (start + MAX_SIGNATURE_BYTES).min(bytes.len()));
    let mut depth = 0usize;
    let mut in_string = false;
    let mut string_char = b'"';
    let mut i = start;

    while i < limit {
        let b = bytes[i];

        if in_string {
            if b == string_char && bytes[i - 1] != b'\\' {
                in_string = false;
            } else if b == b'\n' {
                // unterminated literal
                return i;
            }
            i += 1;
            continue;
        }

        match b {
            b'"' | b'`' => {
                in_string = true;
                string_char = b;
            }
            b'(' | b'[' => depth += 1,
            b')' | b']' => depth = depth.saturating_sub(1),
            b'{' | b';' if depth == 0 => return i,
            b'\n' if depth == 0 => return i,
            _ => {}
        }
        i += 1;
    }
    limit
}

/// Comment block directly above the line that starts at `line_start`.
fn preceding_comments(content: &str, line_start: usize, style: CommentStyle) -> Vec<String> {
    let mut block = Vec::new();
    for line in content[..line_start].lines().rev() {
        let trimmed = line.trim();
        let is_attribute = trimmed.starts_with('@') || trimmed.starts_with("#[");
        if trimmed.is_empty() || !(style.is_comment(trimmed) || is_attribute) {
            break;
        }
        block.push(trimmed.to_string());
        if block.len() == MAX_DOC_LINES {
            break;
        }
    }
    block.reverse();
    block
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .replace("( ", "(")
        .replace(" )", ")")
}

fn floor_char_boundary(text: &str, mut index: usize) -> usize {
    while index > 0 && !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;

    static FUNC: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"(?m)^(?P<indent>[ \t]*)fn\s+(?P<name>\w+)").unwrap());

    static RULES: &[DeclarationRule] = &[DeclarationRule {
        pattern: &FUNC,
        reject: &["skip"],
    }];

    #[test]
    fn test_signature_stops_at_brace() {
        let src = "fn add(a: i32, b: i32) -> i32 {\n    a + b\n}\n";
        let decls = collect_declarations(src, RULES, CommentStyle::Slash);
        assert_eq!(decls.len(), 1);
        assert_eq!(decls[0].signature, "fn add(a: i32, b: i32) -> i32");
        assert_eq!(decls[0].line, 1);
    }

    #[test]
    fn test_signature_spans_lines_inside_parens() {
        let src = "fn long(\n    a: &str,\n    b: (u8, u8),\n) {\n}\n";
        let decls = collect_declarations(src, RULES, CommentStyle::Slash);
        assert_eq!(decls[0].signature, "fn long(a: &str, b: (u8, u8),)");
    }

    #[test]
    fn test_preceding_comments_and_indent() {
        let src = "// unrelated\n\n/// Adds.\n/// Really.\n  fn add() {}\n";
        let decls = collect_declarations(src, RULES, CommentStyle::Slash);
        assert_eq!(decls[0].doc, vec!["/// Adds.", "/// Really."]);
        assert_eq!(render(&decls), "  /// Adds.\n  /// Really.\n  fn add()");
    }

    #[test]
    fn test_reject_list() {
        let src = "fn skip() {}\nfn keep() {}\n";
        let decls = collect_declarations(src, RULES, CommentStyle::Slash);
        assert_eq!(decls.len(), 1);
        assert_eq!(decls[0].signature, "fn keep()");
    }

    #[test]
    fn test_brace_in_string_default() {
        let src = "fn f(x = \"{\") {\n}\n";
        let decls = collect_declarations(src, RULES, CommentStyle::Slash);
        assert_eq!(decls[0].signature, "fn f(x = \"{\")");
    }

    #[test]
    fn test_line_number_at_offset() {
        assert_eq!(line_number_at_offset("a\nb\nc", 4), 3);
        assert_eq!(line_number_at_offset("abc", 0), 1);
    }
}
