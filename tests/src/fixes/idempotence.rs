use crate::utils::{diagnostics, fix_all, parse};
use zeroalloc::{AnalyzerConfig, CancellationToken, fix_document};

const MIXED: &str = "using System;\n\
using System.Collections.Generic;\n\
class Sample\n\
{\n\
    IEnumerable<int> A() { return new List<int>(); }\n\
    IReadOnlyList<string> B => new string[0];\n\
    void Take(IEnumerable<int> x, IEnumerable<int> y) { }\n\
    void Run() { Take(new int[0], new List<int>()); }\n\
}\n";

#[test]
fn test_fixed_document_has_no_fixable_diagnostics() {
    let document = parse(MIXED);
    let fixed = parse(&fix_all(&document));
    assert!(
        fixed
            .arena()
            .nodes_of_kind(&[
                zeroalloc_ast::nodes::SyntaxKind::ArrayCreationExpression,
                zeroalloc_ast::nodes::SyntaxKind::ObjectCreationExpression,
            ])
            .is_empty()
    );
    assert!(diagnostics(&fixed).is_empty());
}

#[test]
fn test_fixing_twice_changes_nothing() {
    let document = parse(MIXED);
    let once = fix_all(&document);
    let twice = fix_all(&parse(&once));
    assert_eq!(once, twice);
}

#[test]
fn test_fix_document_reports_each_fix() {
    let document = parse(MIXED);
    let report = fix_document(&document, &AnalyzerConfig::default(), &CancellationToken::new()).unwrap();
    assert_eq!(report.applied.len(), 4);
    assert!(
        report
            .document
            .text()
            .contains("Take(Array.Empty<int>(), Array.Empty<int>());")
    );
}

#[test]
fn test_cancelled_fix_document() {
    let document = parse(MIXED);
    let cancellation = CancellationToken::new();
    cancellation.cancel();
    assert_eq!(
        fix_document(&document, &AnalyzerConfig::default(), &cancellation).unwrap_err(),
        zeroalloc::FixError::Cancelled
    );
}
