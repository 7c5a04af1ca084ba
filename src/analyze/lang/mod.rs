mod csharp;
mod generic;
mod java;
mod javascript;
pub mod pattern;
pub mod python;
mod swift;

pub use csharp::CSharpParser;
pub use generic::GenericParser;
pub use java::JavaParser;
pub use javascript::JavaScriptParser;
pub use swift::SwiftParser;

use crate::analyze::imports::ImportRef;
use crate::types::Language;
use pattern::Declaration;

/// Pattern-matched language support.
pub trait LanguageParser: Sync {
    fn parse_declarations(&self, content: &str) -> Vec<Declaration>;

    fn parse_imports(&self, content: &str) -> Vec<ImportRef>;
}

static JAVASCRIPT: JavaScriptParser = JavaScriptParser;
static JAVA: JavaParser = JavaParser;
static CSHARP: CSharpParser = CSharpParser;
static SWIFT: SwiftParser = SwiftParser;
static GO: GenericParser = GenericParser::new(Language::Go);
static RUST: GenericParser = GenericParser::new(Language::Rust);
static RUBY: GenericParser = GenericParser::new(Language::Ruby);
static PHP: GenericParser = GenericParser::new(Language::Php);
static C: GenericParser = GenericParser::new(Language::C);
static CPP: GenericParser = GenericParser::new(Language::Cpp);
static KOTLIN: GenericParser = GenericParser::new(Language::Kotlin);

/// Pattern parser for `language`, if it has one.
pub fn parser_for(language: Language) -> Option<&'static dyn LanguageParser> {
    let parser: &'static dyn LanguageParser = match language {
        Language::JavaScript | Language::TypeScript => &JAVASCRIPT,
        Language::Java => &JAVA,
        Language::CSharp => &CSHARP,
        Language::Swift => &SWIFT,
        Language::Go => &GO,
        Language::Rust => &RUST,
        Language::Ruby => &RUBY,
        Language::Php => &PHP,
        Language::C => &C,
        Language::Cpp => &CPP,
        Language::Kotlin => &KOTLIN,
        _ => return None,
    };
    Some(parser)
}
