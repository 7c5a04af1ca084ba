use crate::analyze::imports::ImportRef;
use crate::analyze::lang::pattern::{collect_declarations, CommentStyle, Declaration, DeclarationRule};
use crate::analyze::lang::LanguageParser;
use once_cell::sync::Lazy;
use regex::Regex;

pub struct SwiftParser;

// (public|internal|...)? final? class|struct|enum|protocol|extension|actor Name: Parent
static TYPE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^(?P<indent>[ \t]*)(?:@\w+(?:\([^)\n]*\))?[ \t]+)*(?:(?:public|internal|fileprivate|private|open|final|indirect)\s+)*(?:class|struct|enum|protocol|extension|actor)\s+(?P<name>[\w.]+)")
        .unwrap()
});

// func name(params) async throws -> ReturnType, init?(params), deinit, subscript
static FUNC_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^(?P<indent>[ \t]*)(?:@\w+(?:\([^)\n]*\))?[ \t]+)*(?:(?:public|internal|fileprivate|private|open|static|class|override|final|mutating|nonmutating|convenience|required|nonisolated)\s+)*(?:func\s+(?P<name>[^\s(<]+)|init[?!]?|deinit|subscript)\s*[(<{]")
        .unwrap()
});

static RULES: [DeclarationRule; 2] = [
    DeclarationRule {
        pattern: &TYPE_PATTERN,
        // `class func` and `class var` are members, not types
        reject: &["func", "var", "let"],
    },
    DeclarationRule {
        pattern: &FUNC_PATTERN,
        reject: &[],
    },
];

impl LanguageParser for SwiftParser {
    fn parse_declarations(&self, content: &str) -> Vec<Declaration> {
        collect_declarations(content, &RULES, CommentStyle::Slash)
    }

    /// Swift imports name modules, never files, so there is nothing to link.
    fn parse_imports(&self, _content: &str) -> Vec<ImportRef> {
        Vec::new()
    }
}
