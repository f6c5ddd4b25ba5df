use core::fmt;
use std::fmt::{Display, Formatter};

use zeroalloc_ast::nodes::{SyntaxKind, SyntaxNode};
use zeroalloc_semantic::SemanticModel;

use crate::analyzer::AnalysisContext;
use crate::diagnostics::Diagnostic;

pub const NEW_ARRAY_RULE_ID: &str = "HAA0501";
pub const NEW_OBJECT_RULE_ID: &str = "HAA0502";

/// Outcome of classifying one node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Applicable(Diagnostic),
    NotApplicable,
}

/// The allocation rules. Each one is registered against fixed node kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AllocationRule {
    /// Every explicit array creation.
    NewArray,
    /// Object creations whose type is a class or an interface.
    NewObject,
}

impl AllocationRule {
    pub const ALL: [AllocationRule; 2] = [AllocationRule::NewArray, AllocationRule::NewObject];

    #[must_use]
    pub fn id(self) -> &'static str {
        match self {
            AllocationRule::NewArray => NEW_ARRAY_RULE_ID,
            AllocationRule::NewObject => NEW_OBJECT_RULE_ID,
        }
    }

    #[must_use]
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|rule| rule.id() == id)
    }

    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            AllocationRule::NewArray => "Explicit new array type allocation",
            AllocationRule::NewObject => "Explicit new reference type allocation",
        }
    }

    #[must_use]
    pub fn trigger_kinds(self) -> &'static [SyntaxKind] {
        match self {
            AllocationRule::NewArray => &[SyntaxKind::ArrayCreationExpression],
            AllocationRule::NewObject => &[SyntaxKind::ObjectCreationExpression],
        }
    }

    /// Classifies `node` without consulting any ignore settings; see
    /// [`crate::filter::analyze`] for the gated entry point.
    #[must_use]
    pub fn classify(self, node: &SyntaxNode, context: &AnalysisContext<'_>) -> Verdict {
        let applies = match (self, node) {
            (AllocationRule::NewArray, SyntaxNode::ArrayCreationExpression(_)) => true,
            (AllocationRule::NewObject, SyntaxNode::ObjectCreationExpression(creation)) => context
                .model
                .type_of(creation.id)
                .is_some_and(|ty| context.model.is_reference_type(ty)),
            _ => false,
        };
        let range = context.document.arena().span(node.id());
        match range {
            Some(range) if applies => Verdict::Applicable(Diagnostic::new(self.id(), range, self.message())),
            _ => Verdict::NotApplicable,
        }
    }
}

impl Display for AllocationRule {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalyzerConfig;
    use zeroalloc_ast::document::Document;

    fn classify_all(source: &str, rule: AllocationRule) -> Vec<Verdict> {
        let document = Document::parse("a.cs", source).unwrap();
        let model = zeroalloc_semantic::bind(&document);
        let config = AnalyzerConfig::default();
        let context = AnalysisContext {
            document: &document,
            model: &model,
            config: &config,
        };
        document
            .arena()
            .nodes_of_kind(rule.trigger_kinds())
            .iter()
            .map(|node| rule.classify(node, &context))
            .collect()
    }

    #[test]
    fn test_new_object_skips_value_types() {
        let verdicts = classify_all(
            "using System.Collections.Generic;\nstruct P { }\nclass C { void M() { var a = new P(); var b = new List<int>(); } }",
            AllocationRule::NewObject,
        );
        assert_eq!(verdicts[0], Verdict::NotApplicable);
        assert!(matches!(&verdicts[1], Verdict::Applicable(d) if d.id == NEW_OBJECT_RULE_ID));
    }

    #[test]
    fn test_new_array_flags_every_creation() {
        let verdicts = classify_all("class C { void M() { var a = new int[3]; } }", AllocationRule::NewArray);
        assert!(matches!(&verdicts[..], [Verdict::Applicable(d)] if d.message == "Explicit new array type allocation"));
    }

    #[test]
    fn test_from_id() {
        assert_eq!(AllocationRule::from_id("HAA0501"), Some(AllocationRule::NewArray));
        assert_eq!(AllocationRule::from_id("HAA0601"), None);
    }
}
