use crate::analyze::imports::ImportRef;
use crate::analyze::lang::pattern::{collect_declarations, CommentStyle, Declaration, DeclarationRule};
use crate::analyze::lang::LanguageParser;
use once_cell::sync::Lazy;
use regex::Regex;

pub struct JavaParser;

static TYPE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?m)^(?P<indent>[ \t]*)(?:(?:public|private|protected|abstract|final|static|sealed|non-sealed|strictfp)\s+)*(?:class|interface|enum|record|@interface)\s+(?P<name>\w+)",
    )
    .unwrap()
});

static METHOD_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^(?P<indent>[ \t]*)(?:(?:public|private|protected|static|final|abstract|synchronized|native|default|strictfp)\s+)*(?:<[^>\n]+>\s+)?(?P<ret>[\w.$]+(?:<[^\n(]*?>)?(?:\[\])*)\s+(?P<name>\w+)\s*\(")
        .unwrap()
});

static CONSTRUCTOR_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^(?P<indent>[ \t]+)(?:public|private|protected)\s+(?P<name>[A-Z]\w*)\s*\(").unwrap()
});

static IMPORT_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\s*import\s+(?P<static>static\s+)?(?P<spec>[\w.]+?)(?:\.\*)?\s*;").unwrap()
});

const CONTROL_FLOW: &[&str] = &[
    "if", "for", "while", "switch", "catch", "synchronized", "return", "new", "else", "throw",
    "class", "interface", "enum", "record", "case",
];

static RULES: [DeclarationRule; 3] = [
    DeclarationRule {
        pattern: &TYPE_PATTERN,
        reject: &[],
    },
    DeclarationRule {
        pattern: &METHOD_PATTERN,
        reject: CONTROL_FLOW,
    },
    DeclarationRule {
        pattern: &CONSTRUCTOR_PATTERN,
        reject: &[],
    },
];

impl LanguageParser for JavaParser {
    fn parse_declarations(&self, content: &str) -> Vec<Declaration> {
        collect_declarations(content, &RULES, CommentStyle::Slash)
    }

    fn parse_imports(&self, content: &str) -> Vec<ImportRef> {
        let mut refs = Vec::new();
        for cap in IMPORT_PATTERN.captures_iter(content) {
            let Some(spec) = cap.name("spec") else {
                continue;
            };
            let path = spec.as_str().replace('.', "/");
            // `import static a.B.member` names the class one level up
            if cap.name("static").is_some() {
                if let Some((class, _)) = path.rsplit_once('/') {
                    refs.push(ImportRef::Suffix(class.to_string()));
                }
            }
            refs.push(ImportRef::Suffix(path));
        }
        refs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = r#"package com.acme.billing;

import com.acme.core.Money;
import static com.acme.core.Checks.requireNonNull;
import java.util.*;

/**
 * Issues invoices.
 */
public final class InvoiceService implements Service {
    private final Repo repo;

    public InvoiceService(Repo repo) {
        this.repo = repo;
    }

    @Override
    public List<Invoice> issue(Customer customer, Money amount) throws BillingException {
        if (amount.isZero()) {
            return List.of();
        }
        return repo.save(new Invoice(customer, amount));
    }

    interface Listener {
        void onIssued(Invoice invoice);
    }
}
"#;

    #[test]
    fn test_declarations() {
        let decls = JavaParser.parse_declarations(SOURCE);
        let signatures: Vec<&str> = decls.iter().map(|d| d.signature.as_str()).collect();
        assert_eq!(
            signatures,
            vec![
                "public final class InvoiceService implements Service",
                "public InvoiceService(Repo repo)",
                "public List<Invoice> issue(Customer customer, Money amount) throws BillingException",
                "interface Listener",
                "void onIssued(Invoice invoice)",
            ]
        );
        assert_eq!(decls[0].doc, vec!["/**", "* Issues invoices.", "*/"]);
        assert_eq!(decls[2].doc, vec!["@Override"]);
    }

    #[test]
    fn test_imports() {
        let refs = JavaParser.parse_imports(SOURCE);
        assert_eq!(
            refs,
            vec![
                ImportRef::Suffix("com/acme/core/Money".into()),
                ImportRef::Suffix("com/acme/core/Checks".into()),
                ImportRef::Suffix("com/acme/core/Checks/requireNonNull".into()),
                ImportRef::Suffix("java/util".into()),
            ]
        );
    }
}
