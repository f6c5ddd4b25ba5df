use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::arena::Arena;
use crate::builder;
use crate::errors::{AstError, SyntaxError};
use crate::nodes::{CompilationUnit, SyntaxNode, TextRange};
use crate::printer::Printer;

/// An immutable source file: text, syntax tree and navigation index.
///
/// Cloning is cheap; all parts are shared. Edits never mutate a document,
/// they produce a new one that shares every untouched subtree.
#[derive(Clone)]
pub struct Document {
    path: PathBuf,
    text: Arc<str>,
    root: Arc<CompilationUnit>,
    arena: Arc<Arena>,
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("path", &self.path)
            .field("len", &self.text.len())
            .field("nodes", &self.arena.len())
            .finish()
    }
}

impl Document {
    /// Parses `text` into a document.
    ///
    /// # Errors
    ///
    /// Returns [`AstError::ParseError`] if the parser cannot run and
    /// [`AstError::Syntax`] at the first syntax error in the text.
    pub fn parse(path: impl Into<PathBuf>, text: impl Into<String>) -> Result<Self, AstError> {
        let path = path.into();
        let text: Arc<str> = Arc::from(text.into());
        let tree = builder::parse_tree(&text).ok_or_else(|| AstError::ParseError { path: path.clone() })?;
        let output = builder::build(&text, &tree).map_err(|error| syntax_error(&path, &text, &error))?;
        let arena = Arena::index(&SyntaxNode::CompilationUnit(Arc::clone(&output.root)), output.spans);
        Ok(Document {
            path,
            text,
            root: output.root,
            arena: Arc::new(arena),
        })
    }

    /// Reads and parses a file.
    ///
    /// # Errors
    ///
    /// Returns [`AstError::FileReadError`] if the file cannot be read and
    /// [`AstError::Syntax`] if it cannot be parsed.
    pub fn read(path: &Path) -> Result<Self, AstError> {
        let text = std::fs::read_to_string(path).map_err(|source| AstError::FileReadError {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(path, text)
    }

    /// Builds a document from a synthesized tree; text and spans come from
    /// the canonical printer.
    #[must_use]
    pub fn from_root(path: impl Into<PathBuf>, root: Arc<CompilationUnit>) -> Self {
        let node = SyntaxNode::CompilationUnit(Arc::clone(&root));
        let mut printer = Printer::new();
        printer.print(&node);
        let (text, spans) = printer.finish();
        Document {
            path: path.into(),
            text: Arc::from(text),
            arena: Arc::new(Arena::index(&node, spans)),
            root,
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn root(&self) -> Arc<CompilationUnit> {
        Arc::clone(&self.root)
    }

    #[must_use]
    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    /// Source text covered by node `id`.
    #[must_use]
    pub fn node_text(&self, id: u64) -> Option<&str> {
        let span = self.arena.span(id)?;
        self.text.get(span.start..span.end)
    }

    /// 1-based line and column of a byte offset.
    #[must_use]
    pub fn line_column(&self, offset: usize) -> (usize, usize) {
        line_column(&self.text, offset)
    }

    /// `true` if both documents share the same tree allocation.
    #[must_use]
    pub fn ptr_eq(&self, other: &Document) -> bool {
        Arc::ptr_eq(&self.root, &other.root)
    }

    /// A new document with node `target` replaced by `replacement`.
    ///
    /// Only the ancestors of `target` are rebuilt; they keep their ids. The
    /// new text is the old text with the target's range re-rendered, where
    /// any subtree shared with this document keeps its original bytes.
    /// Returns `None` if `target` is unknown or `replacement` does not fit
    /// the slot it is put into.
    #[must_use]
    pub fn replace_node(&self, target: u64, replacement: &SyntaxNode) -> Option<Document> {
        let old_range = self.arena.span(target)?;
        let mut current = replacement.clone();
        let mut child_id = target;
        for ancestor in self.arena.ancestors(target) {
            current = ancestor.with_replaced_child(child_id, &current)?;
            child_id = ancestor.id();
        }
        let SyntaxNode::CompilationUnit(root) = current else {
            return None;
        };

        let mut printer = Printer::reusing(self, old_range.start);
        printer.print(replacement);
        let (fragment, fragment_spans) = printer.finish();

        let mut text = String::with_capacity(self.text.len() + fragment.len());
        text.push_str(&self.text[..old_range.start]);
        text.push_str(&fragment);
        text.push_str(&self.text[old_range.end..]);
        let delta = fragment.len().cast_signed() - old_range.len().cast_signed();

        let root_node = SyntaxNode::CompilationUnit(Arc::clone(&root));
        let mut spans = FxHashMap::default();
        let mut stack = vec![root_node.clone()];
        while let Some(node) = stack.pop() {
            let id = node.id();
            let span = fragment_spans.get(&id).copied().or_else(|| {
                self.arena
                    .spans()
                    .get(&id)
                    .map(|old| shift_outside(*old, old_range, delta))
            });
            if let Some(span) = span {
                spans.insert(id, span);
            }
            stack.extend(node.children());
        }

        Some(Document {
            path: self.path.clone(),
            text: Arc::from(text),
            arena: Arc::new(Arena::index(&root_node, spans)),
            root,
        })
    }
}

/// Moves a range of the old text to its place in the edited text.
fn shift_outside(old: TextRange, edited: TextRange, delta: isize) -> TextRange {
    if old.start >= edited.end {
        old.shifted(delta)
    } else if old.end >= edited.end {
        TextRange::new(old.start, old.end.saturating_add_signed(delta))
    } else {
        old
    }
}

fn line_column(text: &str, offset: usize) -> (usize, usize) {
    let offset = offset.min(text.len());
    let before = &text.as_bytes()[..offset];
    let line = before.iter().filter(|b| **b == b'\n').count() + 1;
    let line_start = before
        .iter()
        .rposition(|b| *b == b'\n')
        .map_or(0, |p| p + 1);
    let column = text.get(line_start..offset).map_or(1, |s| s.chars().count() + 1);
    (line, column)
}

fn syntax_error(path: &Path, text: &str, error: &SyntaxError) -> AstError {
    let (line, column) = line_column(text, error.offset);
    AstError::Syntax {
        path: path.to_path_buf(),
        line,
        column,
        message: error.message.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::{Expression, LiteralExpression, LiteralKind, SyntaxKind, next_node_id};

    fn literal(text: &str) -> SyntaxNode {
        Expression::Literal(Arc::new(LiteralExpression {
            id: next_node_id(),
            kind: LiteralKind::Number,
            text: text.to_string(),
        }))
        .syntax()
    }

    fn find_literal(document: &Document, text: &str) -> u64 {
        document
            .arena()
            .filter_nodes(|n| matches!(n, SyntaxNode::LiteralExpression(l) if l.text == text))
            .first()
            .map(SyntaxNode::id)
            .unwrap()
    }

    #[test]
    fn test_replace_node_keeps_surrounding_bytes() {
        let source = "class C\n{\n  // keep me\n  int A =   1 ;\n  int B = 2;\n}\n";
        let document = Document::parse("a.cs", source).unwrap();
        let target = find_literal(&document, "1");
        let edited = document.replace_node(target, &literal("42")).unwrap();
        assert_eq!(
            edited.text(),
            "class C\n{\n  // keep me\n  int A =   42 ;\n  int B = 2;\n}\n"
        );
        assert_eq!(document.text(), source);
    }

    #[test]
    fn test_replace_node_updates_spans() {
        let source = "class C { int A = 1; int B = 2; }";
        let document = Document::parse("a.cs", source).unwrap();
        let edited = document
            .replace_node(find_literal(&document, "1"), &literal("100"))
            .unwrap();
        let b = find_literal(&edited, "2");
        assert_eq!(edited.node_text(b), Some("2"));
        let root = edited.root();
        assert_eq!(edited.node_text(root.id), Some(edited.text()));
        let hundred = find_literal(&edited, "100");
        assert_eq!(edited.node_text(hundred), Some("100"));
    }

    #[test]
    fn test_replace_node_shares_untouched_subtrees() {
        let source = "class C { int A = 1; } class D { int B = 2; }";
        let document = Document::parse("a.cs", source).unwrap();
        let edited = document
            .replace_node(find_literal(&document, "1"), &literal("3"))
            .unwrap();
        assert!(!edited.ptr_eq(&document));
        let old_d = document.root().members[1].syntax();
        let new_d = edited.root().members[1].syntax();
        assert!(old_d.ptr_eq(&new_d));
        assert_eq!(document.root().members[0].id(), edited.root().members[0].id());
    }

    #[test]
    fn test_replace_node_rejects_unknown_target() {
        let document = Document::parse("a.cs", "class C { }").unwrap();
        assert!(document.replace_node(0, &literal("1")).is_none());
    }

    #[test]
    fn test_line_column() {
        let document = Document::parse("a.cs", "class C\n{\n  int A = 1;\n}").unwrap();
        let target = find_literal(&document, "1");
        let span = document.arena().span(target).unwrap();
        assert_eq!(document.line_column(span.start), (3, 11));
    }

    #[test]
    fn test_parse_error_has_position() {
        let error = Document::parse("bad.cs", "class C {\n  int A = ;\n}").unwrap_err();
        let AstError::Syntax { line, .. } = error else {
            panic!("expected syntax error");
        };
        assert_eq!(line, 2);
    }

    #[test]
    fn test_parse_accepts_control_flow_and_lambdas() {
        let text = "using System;\nusing System.Collections.Generic;\nclass C {\n    IEnumerable<int> M(bool b) { if (b) { return new int[0]; } return new int[0]; }\n    void N() { Func<int> f = () => 1; while (f() > 0 && N != null) { } }\n}\n";
        let document = Document::parse("a.cs", text).unwrap();
        assert_eq!(document.text(), text);
        let creations = document.arena().nodes_of_kind(&[SyntaxKind::ArrayCreationExpression]);
        assert_eq!(creations.len(), 2);
        for creation in creations {
            assert_eq!(document.node_text(creation.id()), Some("new int[0]"));
        }
    }

    #[test]
    fn test_from_root_round_trips_through_printer() {
        let document = Document::parse("a.cs", "class C{int[] M()=>new int[0];}").unwrap();
        let rebuilt = Document::from_root("a.cs", document.root());
        assert_eq!(
            rebuilt.text(),
            "class C\n{\n    int[] M() => new int[0];\n}\n"
        );
        let reparsed = Document::parse("a.cs", rebuilt.text().to_string()).unwrap();
        assert_eq!(reparsed.text(), rebuilt.text());
    }
}
