use rayon::prelude::*;
use zeroalloc_ast::document::Document;
use zeroalloc_ast::nodes::{SyntaxKind, SyntaxNode};
use zeroalloc_semantic::SemanticModel;
use zeroalloc_semantic::type_info::DeclaredSymbol;

use crate::config::AnalyzerConfig;
use crate::diagnostics::Diagnostic;
use crate::filter;
use crate::rules::{AllocationRule, Verdict};

/// Everything a rule may look at while classifying a node.
#[derive(Clone, Copy)]
pub struct AnalysisContext<'a> {
    pub document: &'a Document,
    pub model: &'a dyn SemanticModel,
    pub config: &'a AnalyzerConfig,
}

/// Runs every enabled rule over `document`. Candidate nodes are classified
/// in parallel; the result is ordered by position, then rule id.
#[must_use]
pub fn analyze_document(
    document: &Document,
    model: &dyn SemanticModel,
    config: &AnalyzerConfig,
) -> Vec<Diagnostic> {
    let context = AnalysisContext {
        document,
        model,
        config,
    };
    let candidates: Vec<(AllocationRule, SyntaxNode)> = AllocationRule::ALL
        .into_iter()
        .filter(|rule| config.is_rule_enabled(*rule))
        .flat_map(|rule| {
            document
                .arena()
                .nodes_of_kind(rule.trigger_kinds())
                .into_iter()
                .map(move |node| (rule, node))
        })
        .collect();

    let mut diagnostics: Vec<Diagnostic> = candidates
        .par_iter()
        .filter_map(|(rule, node)| {
            let symbol = containing_symbol(document, model, node.id());
            match filter::analyze(*rule, node, symbol, &context) {
                Verdict::Applicable(diagnostic) => Some(diagnostic),
                Verdict::NotApplicable => None,
            }
        })
        .collect();
    diagnostics.sort_by(|a, b| {
        (a.range.start, a.range.end, &a.id).cmp(&(b.range.start, b.range.end, &b.id))
    });
    tracing::debug!(
        path = %document.path().display(),
        candidates = candidates.len(),
        diagnostics = diagnostics.len(),
        "analyzed document"
    );
    diagnostics
}

/// The symbol of the nearest enclosing member or type declaration.
#[must_use]
pub fn containing_symbol<'m>(
    document: &Document,
    model: &'m dyn SemanticModel,
    node_id: u64,
) -> Option<&'m DeclaredSymbol> {
    document.arena().find_ancestor(node_id, |ancestor| match ancestor.kind() {
        SyntaxKind::MethodDeclaration
        | SyntaxKind::ConstructorDeclaration
        | SyntaxKind::PropertyDeclaration
        | SyntaxKind::FieldDeclaration
        | SyntaxKind::TypeDeclaration => model.declared_symbol(ancestor.id()),
        _ => None,
    })
}
