use crate::utils::{fixed_text_at, parse};
use zeroalloc::eligibility::prove;
use zeroalloc::creation::CreationExpression;
use zeroalloc_ast::nodes::SyntaxKind;

fn fix_return(creation: &str) -> Option<String> {
    let document = parse(&format!(
        "using System.Collections.Generic;\n\
         class Sample {{ IEnumerable<int> M(List<int> source, int[] raw) {{ return {creation}; }} }}\n"
    ));
    fixed_text_at(&document, creation)
}

#[test]
fn test_copy_constructions_are_rejected() {
    for creation in [
        "new List<int>(source)",
        "new List<int>(raw)",
        "new List<int>(new int[0]) { }",
        "new HashSet<int>(source)",
        "new LinkedList<int>(source)",
    ] {
        assert_eq!(fix_return(creation), None, "{creation}");
    }
}

#[test]
fn test_capacity_constructor_is_not_a_copy() {
    let fixed = fix_return("new List<int>(8)").unwrap();
    assert!(fixed.contains("return System.Array.Empty<int>();"));
}

#[test]
fn test_unresolved_constructor_with_arguments_is_rejected() {
    assert_eq!(fix_return("new List<int>(\"not a size\")"), None);
}

#[test]
fn test_non_empty_initializers_are_rejected() {
    for creation in [
        "new List<int> { 1 }",
        "new List<int>() { 1, 2 }",
        "new int[] { 0 }",
        "new int[1] { 0 }",
        "new int[] { 1, 2, 3 }",
    ] {
        assert_eq!(fix_return(creation), None, "{creation}");
    }
}

#[test]
fn test_non_zero_sizes_are_rejected() {
    for creation in ["new int[1]", "new int[source.Count]"] {
        assert_eq!(fix_return(creation), None, "{creation}");
    }
    assert!(fix_return("new int[0x0]").is_some());
}

#[test]
fn test_multi_dimensional_arrays_are_rejected() {
    let document = parse("class Sample { object M() { return new int[0, 0]; } }");
    let model = zeroalloc_semantic::bind(&document);
    let node = document.arena().nodes_of_kind(&[SyntaxKind::ArrayCreationExpression])[0].clone();
    let creation = CreationExpression::from_syntax(&node).unwrap();
    assert!(prove(&creation, &model).is_none());
}

#[test]
fn test_jagged_array_element_type() {
    let document = parse(
        "using System.Collections.Generic;\nclass Sample { IEnumerable<int[]> M() { return new int[0][]; } }\n",
    );
    let fixed = fixed_text_at(&document, "new int[0][]").unwrap();
    assert!(fixed.contains("return System.Array.Empty<int[]>();"), "{fixed}");
}
