use crate::analyze::imports::ImportRef;
use crate::analyze::lang::pattern::{collect_declarations, CommentStyle, Declaration, DeclarationRule};
use crate::analyze::lang::LanguageParser;
use once_cell::sync::Lazy;
use regex::Regex;

/// JavaScript and TypeScript
pub struct JavaScriptParser;

static CLASS_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^(?P<indent>[ \t]*)(?:export[ \t]+(?:default[ \t]+)?)?(?:declare[ \t]+)?(?:abstract[ \t]+)?class[ \t]+(?P<name>[\w$]+)")
        .unwrap()
});

static FUNCTION_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^(?P<indent>[ \t]*)(?:export[ \t]+(?:default[ \t]+)?)?(?:declare[ \t]+)?(?:async[ \t]+)?function[ \t]*\*?[ \t]*(?P<name>[\w$]*)[ \t]*[<(]")
        .unwrap()
});

// const name = (args) => ..., const name = async function (...)
static ARROW_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^(?P<indent>[ \t]*)(?:export[ \t]+)?(?:const|let|var)[ \t]+(?P<name>[\w$]+)[ \t]*(?::[^=\n]+)?=[ \t]*(?:async[ \t]+)?(?:function\b|\([^)\n]*\)[ \t]*(?::[^=\n]+)?=>|[\w$]+[ \t]*=>)")
        .unwrap()
});

static TYPE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^(?P<indent>[ \t]*)(?:export[ \t]+(?:default[ \t]+)?)?(?:declare[ \t]+)?(?:const[ \t]+)?(?:interface|type|enum|namespace)[ \t]+(?P<name>[\w$]+)")
        .unwrap()
});

// Class members: name(args) {, async name(args): T {, static get name() {
static METHOD_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^(?P<indent>[ \t]+)(?:(?:public|private|protected|static|async|readonly|override|abstract|get|set)[ \t]+)*(?P<name>#?[\w$]+)[ \t]*(?:<[^>\n]*>)?\([^)\n]*\)[ \t]*(?::[^{;\n]+)?\{")
        .unwrap()
});

static IMPORT_FROM_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?m)^\s*(?:import|export)\s+(?:type\s+)?(?:[^'";]*?\s+from\s+)?['"](?P<spec>[^'"\n]+)['"]"#)
        .unwrap()
});

static REQUIRE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\b(?:require|import)\s*\(\s*['"](?P<spec>[^'"\n]+)['"]\s*\)"#).unwrap()
});

const CONTROL_FLOW: &[&str] = &[
    "if", "for", "while", "switch", "catch", "return", "function", "with", "else", "do",
];

static RULES: [DeclarationRule; 5] = [
    DeclarationRule {
        pattern: &CLASS_PATTERN,
        reject: &[],
    },
    DeclarationRule {
        pattern: &FUNCTION_PATTERN,
        reject: &[],
    },
    DeclarationRule {
        pattern: &ARROW_PATTERN,
        reject: &[],
    },
    DeclarationRule {
        pattern: &TYPE_PATTERN,
        reject: &[],
    },
    DeclarationRule {
        pattern: &METHOD_PATTERN,
        reject: CONTROL_FLOW,
    },
];

/// Path aliases that point into the repository itself
const ALIAS_PREFIXES: &[&str] = &["@/", "~/", "src/"];

impl LanguageParser for JavaScriptParser {
    fn parse_declarations(&self, content: &str) -> Vec<Declaration> {
        collect_declarations(content, &RULES, CommentStyle::Slash)
    }

    fn parse_imports(&self, content: &str) -> Vec<ImportRef> {
        let mut specs: Vec<(usize, &str)> = IMPORT_FROM_PATTERN
            .captures_iter(content)
            .chain(REQUIRE_PATTERN.captures_iter(content))
            .filter_map(|cap| cap.name("spec"))
            .map(|m| (m.start(), m.as_str()))
            .collect();
        specs.sort_unstable();
        specs.dedup();

        let mut refs = Vec::new();
        for (_, spec) in specs {
            if spec.starts_with("./") || spec.starts_with("../") {
                refs.push(ImportRef::Relative(spec.to_string()));
                // TypeScript ESM imports name the emitted .js file
                if let Some(stem) = spec.strip_suffix(".js") {
                    refs.push(ImportRef::Relative(stem.to_string()));
                }
            } else if let Some(prefix) = ALIAS_PREFIXES.iter().find(|p| spec.starts_with(**p)) {
                let rest = spec.trim_start_matches(*prefix);
                let suffix = if *prefix == "src/" {
                    spec.to_string()
                } else {
                    rest.to_string()
                };
                refs.push(ImportRef::Suffix(suffix));
            }
        }
        refs
    }
}
