use crate::analyze::imports::ImportRef;
use crate::analyze::lang::pattern::{collect_declarations, CommentStyle, Declaration, DeclarationRule};
use crate::analyze::lang::LanguageParser;
use crate::types::Language;
use once_cell::sync::Lazy;
use regex::Regex;

/// Declaration and import patterns for languages that need no parser of
/// their own: Go, Rust, Ruby, PHP, C, C++ and Kotlin.
pub struct GenericParser {
    language: Language,
}

impl GenericParser {
    pub const fn new(language: Language) -> Self {
        Self { language }
    }
}

// Go
static GO_FUNC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^(?P<indent>)func\s+(?:\([^)\n]*\)\s*)?(?P<name>\w+)").unwrap()
});
static GO_TYPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^(?P<indent>[ \t]*)type\s+(?P<name>\w+)(?:\[[^\]\n]*\])?\s+(?:struct|interface)\b").unwrap()
});
static GO_IMPORT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?m)^\s*import\s+(?:[\w.]+\s+)?"(?P<spec>[^"]+)""#).unwrap()
});
static GO_IMPORT_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?ms)^\s*import\s*\((?P<body>.*?)\)").unwrap());
static GO_IMPORT_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""(?P<spec>[^"\n]+)""#).unwrap());

// Rust
static RUST_FN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?m)^(?P<indent>[ \t]*)(?:pub(?:\([^)\n]*\))?[ \t]+)?(?:(?:const|async|unsafe|extern(?:[ \t]+"[^"\n]*")?)[ \t]+)*fn[ \t]+(?P<name>\w+)"#)
        .unwrap()
});
static RUST_ITEM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^(?P<indent>[ \t]*)(?:pub(?:\([^)\n]*\))?[ \t]+)?(?:unsafe[ \t]+)?(?:struct|enum|trait|union|type|mod|macro_rules!)[ \t]+(?P<name>\w+)")
        .unwrap()
});
static RUST_IMPL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^(?P<indent>[ \t]*)(?:unsafe[ \t]+)?impl\b").unwrap());
static RUST_MOD_DECL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\s*(?:pub(?:\([^)\n]*\))?\s+)?mod\s+(?P<name>\w+)\s*;").unwrap()
});
static RUST_USE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\s*(?:pub(?:\([^)\n]*\))?\s+)?use\s+(?P<spec>(?:crate|self|super)(?:::\w+)+)").unwrap()
});

// Ruby
static RUBY_TYPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^(?P<indent>[ \t]*)(?:class|module)[ \t]+(?P<name>[A-Z][\w:]*)").unwrap()
});
static RUBY_DEF: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^(?P<indent>[ \t]*)def[ \t]+(?P<name>(?:self\.)?[\w?!=\[\]<>+\-*/%]+)").unwrap()
});
static RUBY_REQUIRE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?m)^\s*(?P<kind>require_relative|require)\s*\(?\s*['"](?P<spec>[^'"\n]+)['"]"#).unwrap()
});

// PHP
static PHP_TYPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^(?P<indent>[ \t]*)(?:(?:abstract|final|readonly)[ \t]+)*(?:class|interface|trait|enum)[ \t]+(?P<name>\w+)")
        .unwrap()
});
static PHP_FUNCTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^(?P<indent>[ \t]*)(?:(?:public|private|protected|static|abstract|final)[ \t]+)*function[ \t]+&?(?P<name>\w+)[ \t]*\(")
        .unwrap()
});
static PHP_USE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*use\s+\\?(?P<spec>[\w\\]+)\s*;").unwrap());
static PHP_INCLUDE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\b(?:require|include)(?:_once)?\s*\(?\s*['"](?P<spec>[^'"\n]+)['"]"#).unwrap()
});

// C and C++
static C_TYPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^(?P<indent>[ \t]*)(?:typedef[ \t]+)?(?:struct|class|enum(?:[ \t]+class)?|union|namespace)[ \t]+(?P<name>\w+)[ \t]*(?:[:{]|$)")
        .unwrap()
});
// Top-level definitions only; prototypes end in `;` and are skipped
static C_FUNCTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^(?P<indent>)(?:(?:static|inline|extern|virtual|constexpr|const|unsigned|signed)[ \t]+)*(?P<ret>[A-Za-z_][\w:<>,*&]*)[ \t]+[*&]*(?P<name>[A-Za-z_][\w:~]*)[ \t]*\([^;{}]*?\)[ \t]*(?:const[ \t]*)?(?:noexcept[ \t]*)?(?:\{|$)")
        .unwrap()
});
static C_INCLUDE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?m)^\s*#\s*include\s*"(?P<spec>[^"]+)""#).unwrap());

// Kotlin
static KOTLIN_TYPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^(?P<indent>[ \t]*)(?:(?:public|private|internal|protected|open|abstract|sealed|data|enum|annotation|inner|value|inline)[ \t]+)*(?:class|interface|object)[ \t]+(?P<name>\w+)")
        .unwrap()
});
static KOTLIN_FUN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^(?P<indent>[ \t]*)(?:(?:public|private|internal|protected|open|abstract|override|suspend|inline|operator|infix|tailrec|external)[ \t]+)*fun[ \t]+(?:<[^>\n]*>[ \t]*)?(?P<name>[\w.]+)[ \t]*\(")
        .unwrap()
});
static KOTLIN_IMPORT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*import\s+(?P<spec>[\w.]+)").unwrap());

const C_KEYWORDS: &[&str] = &[
    "return", "else", "if", "while", "for", "switch", "case", "do", "goto", "sizeof", "typedef",
    "define",
];

static GO_RULES: [DeclarationRule; 2] = [
    DeclarationRule {
        pattern: &GO_FUNC,
        reject: &[],
    },
    DeclarationRule {
        pattern: &GO_TYPE,
        reject: &[],
    },
];

static RUST_RULES: [DeclarationRule; 3] = [
    DeclarationRule {
        pattern: &RUST_FN,
        reject: &[],
    },
    DeclarationRule {
        pattern: &RUST_ITEM,
        reject: &[],
    },
    DeclarationRule {
        pattern: &RUST_IMPL,
        reject: &[],
    },
];

static RUBY_RULES: [DeclarationRule; 2] = [
    DeclarationRule {
        pattern: &RUBY_TYPE,
        reject: &[],
    },
    DeclarationRule {
        pattern: &RUBY_DEF,
        reject: &[],
    },
];

static PHP_RULES: [DeclarationRule; 2] = [
    DeclarationRule {
        pattern: &PHP_TYPE,
        reject: &[],
    },
    DeclarationRule {
        pattern: &PHP_FUNCTION,
        reject: &[],
    },
];

static C_RULES: [DeclarationRule; 2] = [
    DeclarationRule {
        pattern: &C_TYPE,
        reject: &[],
    },
    DeclarationRule {
        pattern: &C_FUNCTION,
        reject: C_KEYWORDS,
    },
];

static KOTLIN_RULES: [DeclarationRule; 2] = [
    DeclarationRule {
        pattern: &KOTLIN_TYPE,
        reject: &[],
    },
    DeclarationRule {
        pattern: &KOTLIN_FUN,
        reject: &[],
    },
];

impl GenericParser {
    fn rules(&self) -> (&'static [DeclarationRule], CommentStyle) {
        match self.language {
            Language::Go => (&GO_RULES, CommentStyle::Slash),
            Language::Rust => (&RUST_RULES, CommentStyle::Slash),
            Language::Ruby => (&RUBY_RULES, CommentStyle::Hash),
            Language::Php => (&PHP_RULES, CommentStyle::SlashAndHash),
            Language::C | Language::Cpp => (&C_RULES, CommentStyle::Slash),
            Language::Kotlin => (&KOTLIN_RULES, CommentStyle::Slash),
            _ => (&[], CommentStyle::Slash),
        }
    }
}

impl LanguageParser for GenericParser {
    fn parse_declarations(&self, content: &str) -> Vec<Declaration> {
        let (rules, comments) = self.rules();
        collect_declarations(content, rules, comments)
    }

    fn parse_imports(&self, content: &str) -> Vec<ImportRef> {
        match self.language {
            Language::Go => go_imports(content),
            Language::Rust => rust_imports(content),
            Language::Ruby => ruby_imports(content),
            Language::Php => php_imports(content),
            Language::C | Language::Cpp => captured(&C_INCLUDE, content)
                .map(|spec| ImportRef::Local(spec.to_string()))
                .collect(),
            Language::Kotlin => captured(&KOTLIN_IMPORT, content)
                .map(|spec| ImportRef::Suffix(spec.replace('.', "/")))
                .collect(),
            _ => Vec::new(),
        }
    }
}

fn captured<'c>(pattern: &'static Regex, content: &'c str) -> impl Iterator<Item = &'c str> {
    pattern
        .captures_iter(content)
        .filter_map(|cap| cap.name("spec"))
        .map(|m| m.as_str())
}

fn go_imports(content: &str) -> Vec<ImportRef> {
    let mut specs: Vec<&str> = captured(&GO_IMPORT, content).collect();
    for block in GO_IMPORT_BLOCK.captures_iter(content) {
        if let Some(body) = block.name("body") {
            specs.extend(captured(&GO_IMPORT_LINE, body.as_str()));
        }
    }
    specs
        .into_iter()
        .map(|spec| ImportRef::GoPackage(spec.to_string()))
        .collect()
}

fn rust_imports(content: &str) -> Vec<ImportRef> {
    let mut refs: Vec<ImportRef> = RUST_MOD_DECL
        .captures_iter(content)
        .filter_map(|cap| cap.name("name"))
        .map(|name| ImportRef::RustModule(format!("self::{}", name.as_str())))
        .collect();
    refs.extend(captured(&RUST_USE, content).map(|spec| ImportRef::RustModule(spec.to_string())));
    refs
}

fn ruby_imports(content: &str) -> Vec<ImportRef> {
    let mut refs = Vec::new();
    for cap in RUBY_REQUIRE.captures_iter(content) {
        let (Some(kind), Some(spec)) = (cap.name("kind"), cap.name("spec")) else {
            continue;
        };
        match kind.as_str() {
            "require_relative" => refs.push(ImportRef::Relative(spec.as_str().to_string())),
            // Plain requires name gems unless they point into lib/
            _ if spec.as_str().contains('/') => {
                refs.push(ImportRef::Suffix(format!("lib/{}", spec.as_str())))
            }
            _ => {}
        }
    }
    refs
}

fn php_imports(content: &str) -> Vec<ImportRef> {
    let mut refs: Vec<ImportRef> = captured(&PHP_USE, content)
        .map(|spec| ImportRef::Suffix(spec.replace('\\', "/")))
        .collect();
    refs.extend(captured(&PHP_INCLUDE, content).map(|spec| ImportRef::Local(spec.to_string())));
    refs
}
