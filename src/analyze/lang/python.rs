use tree_sitter::{Node, Parser, Tree};

use crate::analyze::imports::ImportRef;

fn parse(content: &str) -> Option<Tree> {
    let mut parser = Parser::new();
    parser.set_language(&tree_sitter_python::language()).ok()?;
    parser.parse(content, None)
}

/// Module docstring plus class and function skeleton of a Python module.
///
/// Returns `None` when the source does not parse cleanly.
pub fn skeleton(content: &str) -> Option<String> {
    let tree = parse(content)?;
    let root = tree.root_node();
    if root.has_error() {
        return None;
    }

    let mut lines = Vec::new();
    if let Some(doc) = docstring(root, content) {
        lines.push(doc.to_string());
    }
    emit_definitions(root, content, &mut lines);
    Some(lines.join("\n"))
}

fn emit_definitions(parent: Node, src: &str, out: &mut Vec<String>) -> bool {
    let mut emitted = false;
    let mut cursor = parent.walk();
    for child in parent.named_children(&mut cursor) {
        match child.kind() {
            "class_definition" | "function_definition" => {
                emit_definition(child, child, src, out);
                emitted = true;
            }
            "decorated_definition" => {
                if let Some(def) = child.child_by_field_name("definition") {
                    emit_definition(child, def, src, out);
                    emitted = true;
                }
            }
            _ => {}
        }
    }
    emitted
}

/// `outer` is the decorated wrapper when present, `def` the definition itself.
fn emit_definition(outer: Node, def: Node, src: &str, out: &mut Vec<String>) {
    let indent = " ".repeat(outer.start_position().column);

    if outer.kind() == "decorated_definition" {
        let mut cursor = outer.walk();
        for decorator in outer.named_children(&mut cursor) {
            if decorator.kind() == "decorator" {
                out.push(format!("{}{}", indent, text(decorator, src).trim()));
            }
        }
    }

    let body = def.child_by_field_name("body");
    let signature_end = body.map(|b| b.start_byte()).unwrap_or_else(|| def.end_byte());
    let signature = collapse_signature(&src[def.start_byte()..signature_end]);

    let Some(body) = body else {
        out.push(format!("{}{}", indent, signature));
        return;
    };

    // One-line bodies stay on the signature line
    if body.start_position().row == def.start_position().row {
        out.push(format!("{}{} ...", indent, signature));
        return;
    }

    out.push(format!("{}{}", indent, signature));
    let inner = " ".repeat(body.start_position().column);

    let mut has_doc = false;
    if let Some(doc) = docstring(body, src) {
        out.push(format!("{}{}", inner, doc));
        has_doc = true;
    }

    let has_members = def.kind() == "class_definition" && emit_definitions(body, src, out);
    if !has_doc && !has_members {
        out.push(format!("{}...", inner));
    }
}

/// Leading string literal of a block, verbatim including quotes.
fn docstring<'a>(body: Node, src: &'a str) -> Option<&'a str> {
    let mut cursor = body.walk();
    let first = body
        .named_children(&mut cursor)
        .find(|n| n.kind() != "comment")?;
    if first.kind() != "expression_statement" {
        return None;
    }
    let literal = first.named_child(0)?;
    (literal.kind() == "string").then(|| text(literal, src))
}

fn collapse_signature(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .replace("( ", "(")
        .replace(" )", ")")
}

fn text<'a>(node: Node, src: &'a str) -> &'a str {
    &src[node.start_byte()..node.end_byte()]
}

/// Import references of a Python module, in source order.
///
/// `from pkg import name` yields both `pkg` and `pkg.name`, since `name`
/// may be a submodule. Unresolvable candidates are dropped later.
pub fn imports(content: &str) -> Vec<ImportRef> {
    let Some(tree) = parse(content) else {
        return Vec::new();
    };

    let mut refs = Vec::new();
    let mut stack = vec![tree.root_node()];
    while let Some(node) = stack.pop() {
        match node.kind() {
            "import_statement" => {
                let mut cursor = node.walk();
                for name in node.children_by_field_name("name", &mut cursor) {
                    if let Some(module) = imported_name(name, content) {
                        refs.push(ImportRef::Suffix(module.replace('.', "/")));
                    }
                }
            }
            "import_from_statement" => from_import(node, content, &mut refs),
            _ => {
                let mut cursor = node.walk();
                let children: Vec<Node> = node.named_children(&mut cursor).collect();
                stack.extend(children.into_iter().rev());
            }
        }
    }
    refs
}

fn from_import(node: Node, src: &str, refs: &mut Vec<ImportRef>) {
    let Some(module) = node.child_by_field_name("module_name") else {
        return;
    };
    let module_text = text(module, src).trim();
    let dots = module_text.chars().take_while(|c| *c == '.').count();
    let dotted = &module_text[dots..];

    let mut cursor = node.walk();
    let names: Vec<String> = node
        .children_by_field_name("name", &mut cursor)
        .filter_map(|n| imported_name(n, src))
        .collect();

    if dots == 0 {
        let base = dotted.replace('.', "/");
        refs.push(ImportRef::Suffix(base.clone()));
        for name in names {
            refs.push(ImportRef::Suffix(format!("{}/{}", base, name.replace('.', "/"))));
        }
        return;
    }

    // One dot is the importer's package, each further dot goes up a level
    let up = "../".repeat(dots - 1);
    let base = if dotted.is_empty() {
        up.trim_end_matches('/').to_string()
    } else {
        format!("{}{}", up, dotted.replace('.', "/"))
    };
    let join = |leaf: &str| {
        if base.is_empty() {
            leaf.to_string()
        } else {
            format!("{}/{}", base, leaf)
        }
    };

    if dotted.is_empty() {
        refs.push(ImportRef::Relative(join("__init__")));
    } else {
        refs.push(ImportRef::Relative(base.clone()));
    }
    for name in names {
        refs.push(ImportRef::Relative(join(&name.replace('.', "/"))));
    }
}

/// Dotted module name of an `import` target, without any alias.
fn imported_name(node: Node, src: &str) -> Option<String> {
    let target = match node.kind() {
        "aliased_import" => node.child_by_field_name("name")?,
        "dotted_name" => node,
        _ => return None,
    };
    Some(text(target, src).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_method_docstring() {
        let src = "class Foo:\n    def bar(self):\n        \"\"\"doc\"\"\"\n        return 42\n";
        let skeleton = skeleton(src).unwrap();
        assert_eq!(skeleton, "class Foo:\n    def bar(self):\n        \"\"\"doc\"\"\"");
        assert!(!skeleton.contains("return 42"));
    }

    #[test]
    fn test_module_docstring_leads() {
        let src = concat!(
            "#!/usr/bin/env python\n",
            "\"\"\"Payment gateway adapters for Stripe.\"\"\"\n",
            "import os\n",
            "class Gateway:\n",
            "    def charge(self, amount):\n",
            "        return amount\n",
        );
        assert_eq!(
            skeleton(src).unwrap(),
            "\"\"\"Payment gateway adapters for Stripe.\"\"\"\nclass Gateway:\n    def charge(self, amount):\n        ..."
        );
    }

    #[test]
    fn test_late_string_is_not_a_docstring() {
        let src = "import os\n\"\"\"not a docstring\"\"\"\ndef f():\n    pass\n";
        assert_eq!(skeleton(src).unwrap(), "def f():\n    ...");
    }

    #[test]
    fn test_signature_preserves_defaults_and_annotations() {
        let src = "def fetch(url: str, *, timeout: float = 3.0, retries=2) -> bytes:\n    pass\n";
        let skeleton = skeleton(src).unwrap();
        assert_eq!(
            skeleton,
            "def fetch(url: str, *, timeout: float = 3.0, retries=2) -> bytes:\n    ..."
        );
    }

    #[test]
    fn test_multiline_signature_and_decorators() {
        let src = concat!(
            "@app.route(\"/\")\n",
            "@login_required\n",
            "def index(\n",
            "    request,\n",
            "    page=1,\n",
            "):\n",
            "    return render(request)\n",
        );
        let skeleton = skeleton(src).unwrap();
        assert_eq!(
            skeleton,
            "@app.route(\"/\")\n@login_required\ndef index(request, page=1,):\n    ..."
        );
    }

    #[test]
    fn test_nested_classes_keep_indentation() {
        let src = concat!(
            "class Outer(Base):\n",
            "    \"\"\"Outer doc.\"\"\"\n",
            "    x = 1\n",
            "    class Inner:\n",
            "        def run(self): return 1\n",
        );
        let skeleton = skeleton(src).unwrap();
        assert_eq!(
            skeleton,
            "class Outer(Base):\n    \"\"\"Outer doc.\"\"\"\n    class Inner:\n        def run(self): ..."
        );
    }

    #[test]
    fn test_nested_functions_dropped() {
        let src = "def outer():\n    def inner():\n        pass\n    return inner\n";
        assert_eq!(skeleton(src).unwrap(), "def outer():\n    ...");
    }

    #[test]
    fn test_malformed_source() {
        assert!(skeleton("def broken(:\n    pass\n").is_none());
    }

    #[test]
    fn test_imports() {
        let src = concat!(
            "import os, pkg.core as core\n",
            "from .models import User\n",
            "from .. import settings\n",
            "from pkg import util\n",
            "def f():\n",
            "    import json\n",
        );
        let refs = imports(src);
        assert_eq!(
            refs,
            vec![
                ImportRef::Suffix("os".into()),
                ImportRef::Suffix("pkg/core".into()),
                ImportRef::Relative("models".into()),
                ImportRef::Relative("models/User".into()),
                ImportRef::Relative("../__init__".into()),
                ImportRef::Relative("../settings".into()),
                ImportRef::Suffix("pkg".into()),
                ImportRef::Suffix("pkg/util".into()),
                ImportRef::Suffix("json".into()),
            ]
        );
    }
}
