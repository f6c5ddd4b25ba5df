use crate::utils::{fix_at, fixed_text_at, parse};
use zeroalloc::SyntaxRole;
use zeroalloc::locator::locate;

const PRELUDE: &str = "using System;\nusing System.Collections.Generic;\n";

fn source(body: &str) -> String {
    format!("{PRELUDE}class Sample\n{{\n{body}\n}}\n")
}

fn role_of(body: &str, needle: &str) -> Option<SyntaxRole> {
    let document = parse(&source(body));
    let model = zeroalloc_semantic::bind(&document);
    let start = document.text().find(needle).unwrap();
    let range = zeroalloc_ast::nodes::TextRange::new(start, start + needle.len());
    locate(&document, &model, range).map(|located| located.role)
}

#[test]
fn test_return_statement() {
    let body = "    IReadOnlyCollection<string> Names() { return new List<string>(); }";
    assert_eq!(role_of(body, "new List<string>()"), Some(SyntaxRole::ReturnPosition));
    let document = parse(&source(body));
    assert_eq!(
        fixed_text_at(&document, "new List<string>()").unwrap(),
        source("    IReadOnlyCollection<string> Names() { return Array.Empty<string>(); }")
    );
}

#[test]
fn test_arrow_bodies() {
    let method = "    IEnumerable<int> Numbers() => new int[] { };";
    assert_eq!(role_of(method, "new int[] { }"), Some(SyntaxRole::ArrowBody));
    assert_eq!(
        fixed_text_at(&parse(&source(method)), "new int[] { }").unwrap(),
        source("    IEnumerable<int> Numbers() => Array.Empty<int>();")
    );

    let property = "    IReadOnlyList<int> Numbers => new List<int>();";
    assert_eq!(
        fixed_text_at(&parse(&source(property)), "new List<int>()").unwrap(),
        source("    IReadOnlyList<int> Numbers => Array.Empty<int>();")
    );
}

#[test]
fn test_getter_block() {
    let body = "    IEnumerable<int> Numbers { get { return new HashSet<int>(); } }";
    assert_eq!(
        fixed_text_at(&parse(&source(body)), "new HashSet<int>()").unwrap(),
        source("    IEnumerable<int> Numbers { get { return Array.Empty<int>(); } }")
    );
}

#[test]
fn test_argument_keeps_siblings_and_labels() {
    let body = "    void Take(int first, IEnumerable<int> items, string last) { }\n\
                \x20   void Run() { Take(first: 1, items: new int[0], last: \"x\"); }";
    assert_eq!(role_of(body, "new int[0]"), Some(SyntaxRole::ArgumentPosition));
    let fixed = fixed_text_at(&parse(&source(body)), "new int[0]").unwrap();
    assert!(
        fixed.contains("Take(first: 1, items: Array.Empty<int>(), last: \"x\");"),
        "{fixed}"
    );
    assert!(fixed.contains("void Take(int first, IEnumerable<int> items, string last) { }"));
}

#[test]
fn test_constructor_argument() {
    let text = format!(
        "{PRELUDE}class Bag {{ public Bag(IReadOnlyList<int> seed, int size) {{ }} }}\n\
         class Sample {{ object Make() {{ return new Bag(new List<int>(), 4); }} }}\n"
    );
    let document = parse(&text);
    let model = zeroalloc_semantic::bind(&document);
    let start = text.find("new List<int>()").unwrap();
    let range = zeroalloc_ast::nodes::TextRange::new(start, start + "new List<int>()".len());
    assert_eq!(
        locate(&document, &model, range).map(|located| located.role),
        Some(SyntaxRole::ArgumentPosition)
    );
    let fixed = fixed_text_at(&document, "new List<int>()").unwrap();
    assert!(fixed.contains("return new Bag(Array.Empty<int>(), 4);"), "{fixed}");
}

#[test]
fn test_argument_past_declared_parameters_is_rejected() {
    let body = "    void Take(params object[] items) { }\n\
                \x20   void Run() { Take(1, new int[0]); }";
    assert_eq!(role_of(body, "new int[0]"), None);
}

#[test]
fn test_yield_return_leaves_document_unchanged() {
    let body = "    IEnumerable<IEnumerable<int>> Groups() { yield return new List<int>(); }";
    let document = parse(&source(body));
    let fixed = fix_at(&document, "new List<int>()");
    assert!(fixed.as_ref().is_none_or(zeroalloc::FixedDocument::is_unchanged));
    if let Some(fixed) = fixed {
        assert_eq!(fixed.document.text(), document.text());
    }
}

#[test]
fn test_other_positions_are_not_candidates() {
    assert_eq!(role_of("    IEnumerable<int> Field = new int[0];", "new int[0]"), None);
    assert_eq!(
        role_of("    void Run() { IEnumerable<int> local = new int[0]; }", "new int[0]"),
        None
    );
    assert_eq!(
        role_of(
            "    Sample() { }\n    IEnumerable<int> Numbers() { return new int[0]; }",
            "new int[0]"
        ),
        Some(SyntaxRole::ReturnPosition)
    );
}

#[test]
fn test_argument_keeps_comments_and_line_breaks() {
    let body = "    void Take(int first, IEnumerable<int> items, int last) { }\n\
                \x20   void Run()\n    {\n        Take(1 /* count */,\n            new int[0], // none\n            2);\n    }";
    assert_eq!(role_of(body, "new int[0]"), Some(SyntaxRole::ArgumentPosition));
    let fixed = fixed_text_at(&parse(&source(body)), "new int[0]").unwrap();
    assert_eq!(fixed, source(&body.replace("new int[0]", "Array.Empty<int>()")));
}

#[test]
fn test_return_keeps_trailing_comment() {
    let body = "    IEnumerable<int> Numbers()\n    {\n        // nothing yet\n        return new List<int>(); // empty\n    }";
    let fixed = fixed_text_at(&parse(&source(body)), "new List<int>()").unwrap();
    assert_eq!(fixed, source(&body.replace("new List<int>()", "Array.Empty<int>()")));
}

#[test]
fn test_return_inside_branch() {
    let body = "    IEnumerable<int> Numbers(bool empty)\n    {\n        if (empty)\n        {\n            return new int[0];\n        }\n        return Numbers(!empty);\n    }";
    assert_eq!(role_of(body, "new int[0]"), Some(SyntaxRole::ReturnPosition));
    let fixed = fixed_text_at(&parse(&source(body)), "new int[0]").unwrap();
    assert_eq!(fixed, source(&body.replace("new int[0]", "Array.Empty<int>()")));
}

#[test]
fn test_return_inside_lambda_is_not_a_candidate() {
    let body = "    IEnumerable<int> Numbers()\n    {\n        Func<object> make = () => { return new int[0]; };\n        return null;\n    }";
    assert_eq!(role_of(body, "new int[0]"), None);
}
