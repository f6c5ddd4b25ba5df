use crate::utils::{diagnostics, parse};
use zeroalloc::rules::{NEW_ARRAY_RULE_ID, NEW_OBJECT_RULE_ID};
use zeroalloc::{AnalyzerConfig, analyze_document};
use zeroalloc_ast::document::Document;

const ALLOCATING: &str = "using System.Collections.Generic;\n\
using System.CodeDom.Compiler;\n\
class Sample\n\
{\n\
    [GeneratedCode(\"tool\", \"1.0\")]\n\
    int[] Generated() { return new int[4]; }\n\
    [NoAlloc]\n\
    int[] Marked() { return new int[4]; }\n\
    List<int> Plain() { return new List<int>(); }\n\
}\n";

fn ids(document: &Document, config: &AnalyzerConfig) -> Vec<String> {
    let model = zeroalloc_semantic::bind(document);
    analyze_document(document, &model, config)
        .into_iter()
        .map(|d| d.id)
        .collect()
}

#[test]
fn test_default_config_skips_generated_code() {
    let document = parse(ALLOCATING);
    let found = diagnostics(&document);
    assert_eq!(
        found.iter().map(|d| d.id.as_str()).collect::<Vec<_>>(),
        vec![NEW_ARRAY_RULE_ID, NEW_OBJECT_RULE_ID]
    );
    let second_array = document.text().rfind("new int[4]").unwrap();
    assert_eq!(found[0].range.start, second_array);
}

#[test]
fn test_configured_attributes_and_rules() {
    let document = parse(ALLOCATING);
    let config = AnalyzerConfig::from_toml(
        "[ignore]\nattributes = [\"GeneratedCode\", \"NoAllocAttribute\"]\n",
    )
    .unwrap();
    assert_eq!(ids(&document, &config), vec![NEW_OBJECT_RULE_ID.to_string()]);

    let arrays_only = AnalyzerConfig::from_toml("[rules]\nnew-object = false\n").unwrap();
    assert_eq!(ids(&document, &arrays_only), vec![NEW_ARRAY_RULE_ID.to_string()]);
}

#[test]
fn test_ignored_files() {
    let designer = Document::parse("Forms/Main.Designer.cs", ALLOCATING).unwrap();
    assert!(diagnostics(&designer).is_empty());

    let config = AnalyzerConfig::from_toml("[ignore]\nfiles = [\"**/legacy/*.cs\"]\n").unwrap();
    let legacy = Document::parse("src/legacy/Old.cs", ALLOCATING).unwrap();
    assert!(ids(&legacy, &config).is_empty());
    // Replacing the defaults stops ignoring designer files.
    assert_eq!(ids(&designer, &config).len(), 2);
}

#[test]
fn test_value_type_creations_are_not_reported() {
    let document = parse(
        "struct Point { int X; }\n\
         class Sample { object M() { var p = new Point(); return new object(); } }",
    );
    let found = diagnostics(&document);
    assert_eq!(found.len(), 1);
    assert_eq!(&document.text()[found[0].range.start..found[0].range.end], "new object()");
}
