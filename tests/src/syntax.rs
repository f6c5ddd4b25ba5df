use crate::utils::{fixed_text_at, fix_at, parse};
use zeroalloc_ast::document::Document;
use zeroalloc_ast::nodes::{SyntaxKind, SyntaxNode};
use zeroalloc_ast::printer::render;

const TWO_METHODS: &str = "using System.Collections.Generic;\n\
class Sample\n\
{\n\
    IEnumerable<int> First() { return new int[0]; }\n\
    int   Second( int value )   { return value; }\n\
}\n";

#[test]
fn test_parse_keeps_source_text() {
    let document = parse(TWO_METHODS);
    assert_eq!(document.text(), TWO_METHODS);
    let methods = document.arena().nodes_of_kind(&[SyntaxKind::MethodDeclaration]);
    assert_eq!(methods.len(), 2);
    assert_eq!(
        document.node_text(methods[1].id()),
        Some("int   Second( int value )   { return value; }")
    );
}

#[test]
fn test_parse_error() {
    assert!(Document::parse("Broken.cs", "class Sample { void M( }").is_err());
}

#[test]
fn test_render_is_stable() {
    let document = parse(TWO_METHODS);
    let rendered = render(&SyntaxNode::CompilationUnit(document.root()));
    let reparsed = parse(&rendered);
    assert_eq!(render(&SyntaxNode::CompilationUnit(reparsed.root())), rendered);
}

#[test]
fn test_fix_keeps_untouched_bytes() {
    let document = parse(TWO_METHODS);
    let fixed = fixed_text_at(&document, "new int[0]").unwrap();
    assert_eq!(
        fixed,
        TWO_METHODS.replace("return new int[0];", "return System.Array.Empty<int>();")
    );
    assert_eq!(document.text(), TWO_METHODS);
}

#[test]
fn test_fix_shares_untouched_subtrees() {
    let document = parse(TWO_METHODS);
    let fixed = fix_at(&document, "new int[0]").unwrap().document;
    assert!(!fixed.ptr_eq(&document));

    let second = document.arena().nodes_of_kind(&[SyntaxKind::MethodDeclaration])[1].clone();
    let shared = fixed.arena().find_node(second.id()).unwrap();
    assert!(shared.ptr_eq(&second));
    assert_eq!(fixed.node_text(second.id()), document.node_text(second.id()));

    let first = document.arena().nodes_of_kind(&[SyntaxKind::MethodDeclaration])[0].clone();
    let rebuilt = fixed.arena().find_node(first.id()).unwrap();
    assert!(!rebuilt.ptr_eq(&first));
}

#[test]
fn test_fixed_document_has_spans_for_new_nodes() {
    let document = parse(TWO_METHODS);
    let fixed = fix_at(&document, "new int[0]").unwrap().document;
    let invocations = fixed.arena().nodes_of_kind(&[SyntaxKind::InvocationExpression]);
    assert_eq!(invocations.len(), 1);
    assert_eq!(
        fixed.node_text(invocations[0].id()),
        Some("System.Array.Empty<int>()")
    );
    assert!(fixed.arena().nodes_of_kind(&[SyntaxKind::ArrayCreationExpression]).is_empty());
}

#[test]
fn test_tree_serializes_to_json() -> anyhow::Result<()> {
    let document = parse(TWO_METHODS);
    let json = serde_json::to_value(&*document.root())?;
    assert_eq!(json["usings"][0]["name"], "System.Collections.Generic");
    assert_eq!(json["members"].as_array().map(Vec::len), Some(1));
    Ok(())
}
