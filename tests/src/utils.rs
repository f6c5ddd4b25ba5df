use zeroalloc::{
    AnalyzerConfig, CancellationToken, Diagnostic, FixedDocument, analyze_document, fix_document,
    propose_fix,
};
use zeroalloc_ast::document::Document;

pub(crate) fn get_test_data_path() -> std::path::PathBuf {
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR")
        .map(std::path::PathBuf::from)
        .unwrap_or_else(|_| std::env::current_dir().unwrap());
    manifest_dir.join("test_data")
}

/// Resolves a test data file from the test's module path and name.
///
/// # Example
/// For a test at `tests/src/fixes/scenarios.rs`, `get_test_file_path(module_path!(), "return_list")`
/// resolves to `tests/test_data/fixes/scenarios/return_list.cs`.
pub(crate) fn get_test_file_path(module_path: &str, test_name: &str) -> std::path::PathBuf {
    let mut path = get_test_data_path();
    for part in get_test_path_parts(module_path) {
        path = path.join(part);
    }
    path.join(format!("{test_name}.cs"))
}

/// Like [`get_test_file_path`], for the expected output of a fix.
pub(crate) fn get_expected_file_path(module_path: &str, test_name: &str) -> std::path::PathBuf {
    get_test_file_path(module_path, &format!("{test_name}.expected"))
}

fn get_test_path_parts(module_path: &str) -> Vec<&str> {
    module_path
        .split("::")
        .skip(1) // skip "zeroalloc_tests"
        .filter(|p| !p.ends_with("_tests"))
        .collect()
}

pub(crate) fn read_test_file(module_path: &str, test_name: &str) -> Document {
    Document::read(&get_test_file_path(module_path, test_name)).unwrap()
}

pub(crate) fn read_expected_text(module_path: &str, test_name: &str) -> String {
    std::fs::read_to_string(get_expected_file_path(module_path, test_name)).unwrap()
}

pub(crate) fn parse(source: &str) -> Document {
    Document::parse("Test.cs", source).unwrap()
}

pub(crate) fn diagnostics(document: &Document) -> Vec<Diagnostic> {
    let model = zeroalloc_semantic::bind(document);
    analyze_document(document, &model, &AnalyzerConfig::default())
}

/// Proposes the fix for the diagnostic that starts at the first occurrence
/// of `needle`. Panics if no diagnostic starts there.
pub(crate) fn fix_at(document: &Document, needle: &str) -> Option<FixedDocument> {
    let start = document.text().find(needle).unwrap();
    let model = zeroalloc_semantic::bind(document);
    let diagnostic = analyze_document(document, &model, &AnalyzerConfig::default())
        .into_iter()
        .find(|d| d.range.start == start)
        .unwrap_or_else(|| panic!("no diagnostic at `{needle}`"));
    propose_fix(&diagnostic, document, &model, &CancellationToken::new()).unwrap()
}

/// Text after a fix at `needle`, or `None` when no fix changes the document.
pub(crate) fn fixed_text_at(document: &Document, needle: &str) -> Option<String> {
    fix_at(document, needle)
        .filter(|fixed| !fixed.is_unchanged())
        .map(|fixed| fixed.document.text().to_string())
}

pub(crate) fn fix_all(document: &Document) -> String {
    fix_document(document, &AnalyzerConfig::default(), &CancellationToken::new())
        .unwrap()
        .document
        .text()
        .to_string()
}
