use crate::analyze::imports::ImportRef;
use crate::analyze::lang::pattern::{collect_declarations, CommentStyle, Declaration, DeclarationRule};
use crate::analyze::lang::LanguageParser;
use once_cell::sync::Lazy;
use regex::Regex;

pub struct CSharpParser;

static NAMESPACE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^(?P<indent>[ \t]*)namespace\s+(?P<name>[\w.]+)").unwrap());

static TYPE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^(?P<indent>[ \t]*)(?:(?:public|private|protected|internal|abstract|sealed|static|partial|readonly|ref|file)\s+)*(?:class|interface|enum|struct|record(?:\s+struct|\s+class)?)\s+(?P<name>\w+)")
        .unwrap()
});

// At least one modifier, which keeps local calls and statements out
static METHOD_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^(?P<indent>[ \t]*)(?:(?:public|private|protected|internal|static|virtual|override|abstract|async|sealed|extern|new|partial|unsafe)\s+)+(?P<ret>[\w.?\[\],]+(?:<[^\n(]*?>)?[?\[\]]*)\s+(?P<name>\w+)\s*(?:<[^>\n]*>)?\(")
        .unwrap()
});

static CONSTRUCTOR_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^(?P<indent>[ \t]*)(?:public|private|protected|internal|static)\s+(?P<name>[A-Z]\w*)\s*\(").unwrap()
});

static PROPERTY_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^(?P<indent>[ \t]*)(?:(?:public|private|protected|internal|static|virtual|override|abstract|required)\s+)+(?P<ret>[\w<>\[\]?,.]+)\s+(?P<name>\w+)\s*\{\s*(?:get|set|init)")
        .unwrap()
});

static USING_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*using\s+(?:static\s+)?(?P<spec>[\w.]+)\s*;").unwrap());

const KEYWORDS: &[&str] = &[
    "if", "for", "foreach", "while", "switch", "catch", "using", "lock", "return", "new", "else",
    "throw", "class", "interface", "enum", "struct", "record",
];

static RULES: [DeclarationRule; 5] = [
    DeclarationRule {
        pattern: &NAMESPACE_PATTERN,
        reject: &[],
    },
    DeclarationRule {
        pattern: &TYPE_PATTERN,
        reject: &[],
    },
    DeclarationRule {
        pattern: &METHOD_PATTERN,
        reject: KEYWORDS,
    },
    DeclarationRule {
        pattern: &CONSTRUCTOR_PATTERN,
        reject: &[],
    },
    DeclarationRule {
        pattern: &PROPERTY_PATTERN,
        reject: KEYWORDS,
    },
];

impl LanguageParser for CSharpParser {
    fn parse_declarations(&self, content: &str) -> Vec<Declaration> {
        collect_declarations(content, &RULES, CommentStyle::Slash)
    }

    fn parse_imports(&self, content: &str) -> Vec<ImportRef> {
        USING_PATTERN
            .captures_iter(content)
            .filter_map(|cap| cap.name("spec"))
            .map(|spec| ImportRef::Suffix(spec.as_str().replace('.', "/")))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = r#"using System;
using Acme.Orders.Models;

namespace Acme.Orders
{
    /// <summary>Order workflow.</summary>
    public sealed class OrderService : IOrderService
    {
        public string Name { get; set; }

        public OrderService(IRepository repo)
        {
        }

        public async Task<Order?> PlaceAsync(Cart cart, CancellationToken token = default)
        {
            if (cart.IsEmpty) return null;
            var order = Build(cart);
            return order;
        }
    }
}
"#;

    #[test]
    fn test_declarations() {
        let decls = CSharpParser.parse_declarations(SOURCE);
        let signatures: Vec<&str> = decls.iter().map(|d| d.signature.as_str()).collect();
        assert_eq!(
            signatures,
            vec![
                "namespace Acme.Orders",
                "public sealed class OrderService : IOrderService",
                "public string Name",
                "public OrderService(IRepository repo)",
                "public async Task<Order?> PlaceAsync(Cart cart, CancellationToken token = default)",
            ]
        );
        assert_eq!(decls[1].doc, vec!["/// <summary>Order workflow.</summary>"]);
    }

    #[test]
    fn test_imports() {
        assert_eq!(
            CSharpParser.parse_imports(SOURCE),
            vec![
                ImportRef::Suffix("System".into()),
                ImportRef::Suffix("Acme/Orders/Models".into()),
            ]
        );
    }
}
