//! Finds the creation expression a diagnostic points at and the syntactic
//! role it plays in its parent.

use zeroalloc_ast::document::Document;
use zeroalloc_ast::nodes::{AccessorKind, Argument, PropertyBody, SyntaxNode, TextRange};
use zeroalloc_semantic::SemanticModel;

use crate::creation::CreationExpression;
use crate::oracle::is_read_only_sequence;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyntaxRole {
    /// Operand of `return` or `yield return`.
    ReturnPosition,
    /// Body of an expression-bodied method, property or getter.
    ArrowBody,
    /// One argument of a call or object creation.
    ArgumentPosition,
}

#[derive(Debug, Clone)]
pub struct LocatedCreation {
    pub creation: CreationExpression,
    pub role: SyntaxRole,
    /// Immediate parent of the creation.
    pub parent: SyntaxNode,
}

/// Resolves `range` to a creation expression whose value only flows into a
/// read-only sequence: a return or arrow body of a method or getter whose
/// declared type passes the oracle, or an argument bound to such a parameter.
#[must_use]
pub fn locate(document: &Document, model: &dyn SemanticModel, range: TextRange) -> Option<LocatedCreation> {
    let arena = document.arena();
    let node = arena.covering_node(range)?;
    let Some(creation) = CreationExpression::from_syntax(&node) else {
        tracing::trace!(%range, kind = ?node.kind(), "not a creation expression");
        return None;
    };
    let parent = arena.parent(node.id())?;
    let role = match &parent {
        SyntaxNode::ReturnStatement(_) | SyntaxNode::YieldStatement(_) => {
            returns_read_only_sequence(document, model, node.id()).then_some(SyntaxRole::ReturnPosition)
        }
        SyntaxNode::ArrowExpressionClause(_) => {
            returns_read_only_sequence(document, model, node.id()).then_some(SyntaxRole::ArrowBody)
        }
        SyntaxNode::Argument(argument) => {
            passes_read_only_sequence(document, model, argument).then_some(SyntaxRole::ArgumentPosition)
        }
        _ => None,
    };
    tracing::trace!(%range, parent = ?parent.kind(), ?role, "classified creation");
    Some(LocatedCreation {
        creation,
        role: role?,
        parent,
    })
}

/// Whether the member whose body contains `node_id` declares a read-only
/// sequence type: the nearest method, or the nearest property when reached
/// through its getter or its own arrow body. A lambda or local function in
/// between returns from itself, so it stops the walk.
fn returns_read_only_sequence(document: &Document, model: &dyn SemanticModel, node_id: u64) -> bool {
    let mut through_accessor = false;
    for ancestor in document.arena().ancestors(node_id) {
        match &ancestor {
            SyntaxNode::MethodDeclaration(method) => {
                return model
                    .type_of(method.return_type.id())
                    .is_some_and(|ty| is_read_only_sequence(model, ty));
            }
            SyntaxNode::AccessorDeclaration(accessor) => {
                if accessor.kind != AccessorKind::Get {
                    return false;
                }
                through_accessor = true;
            }
            SyntaxNode::PropertyDeclaration(property) => {
                let via_body = through_accessor || matches!(property.body, PropertyBody::Arrow(_));
                return via_body
                    && model
                        .type_of(property.ty.id())
                        .is_some_and(|ty| is_read_only_sequence(model, ty));
            }
            SyntaxNode::Opaque(opaque) if opaque.is_function() => return false,
            SyntaxNode::ConstructorDeclaration(_)
            | SyntaxNode::FieldDeclaration(_)
            | SyntaxNode::TypeDeclaration(_) => return false,
            _ => {}
        }
    }
    false
}

/// Whether `argument` binds, by position, to a parameter whose type passes the oracle.
fn passes_read_only_sequence(document: &Document, model: &dyn SemanticModel, argument: &Argument) -> bool {
    let arena = document.arena();
    let Some(SyntaxNode::ArgumentList(list)) = arena.parent(argument.id) else {
        return false;
    };
    let call_site = match arena.parent(list.id) {
        Some(SyntaxNode::InvocationExpression(invocation)) => invocation.id,
        Some(SyntaxNode::ObjectCreationExpression(creation)) => creation.id,
        _ => return false,
    };
    let Some(signature) = model.call_target(call_site) else {
        tracing::trace!(call_site, "unbound call site");
        return false;
    };
    let Some(position) = list.position_of(argument.id) else {
        return false;
    };
    signature
        .parameters
        .get(position)
        .is_some_and(|parameter| is_read_only_sequence(model, &parameter.ty))
}

#[cfg(test)]
mod tests {
    use super::*;
    use zeroalloc_ast::nodes::SyntaxKind;

    fn locate_first(source: &str) -> Option<LocatedCreation> {
        let document = Document::parse("a.cs", source).unwrap();
        let model = zeroalloc_semantic::bind(&document);
        let creation = document
            .arena()
            .nodes_of_kind(&[SyntaxKind::ArrayCreationExpression, SyntaxKind::ObjectCreationExpression])
            .into_iter()
            .next()
            .unwrap();
        let range = document.arena().span(creation.id()).unwrap();
        locate(&document, &model, range)
    }

    #[test]
    fn test_return_of_read_only_method() {
        let located = locate_first(
            "using System.Collections.Generic;\nclass C { IEnumerable<int> M() { return new int[0]; } }",
        )
        .unwrap();
        assert_eq!(located.role, SyntaxRole::ReturnPosition);
        assert!(matches!(located.parent, SyntaxNode::ReturnStatement(_)));
    }

    #[test]
    fn test_return_of_mutable_method_is_rejected() {
        assert!(
            locate_first("using System.Collections.Generic;\nclass C { List<int> M() { return new List<int>(); } }")
                .is_none()
        );
    }

    #[test]
    fn test_property_getter_and_setter() {
        let getter = locate_first("class C { int[] P { get { return new int[0]; } } }").unwrap();
        assert_eq!(getter.role, SyntaxRole::ReturnPosition);
        let arrow = locate_first("class C { int[] P => new int[0]; }").unwrap();
        assert_eq!(arrow.role, SyntaxRole::ArrowBody);
        let getter_arrow = locate_first("class C { int[] P { get => new int[0]; } }").unwrap();
        assert_eq!(getter_arrow.role, SyntaxRole::ArrowBody);
        assert!(locate_first("class C { int[] P { set => new int[0]; } }").is_none());
    }

    #[test]
    fn test_argument_position_uses_bound_parameter() {
        let located = locate_first(
            "using System.Collections.Generic;\n\
             class C { void Take(int n, IReadOnlyList<string> s) { } void M() { Take(1, new string[0]); } }",
        )
        .unwrap();
        assert_eq!(located.role, SyntaxRole::ArgumentPosition);
        let mutable = locate_first(
            "using System.Collections.Generic;\n\
             class C { void Take(List<int> s) { } void M() { Take(new List<int>()); } }",
        );
        assert!(mutable.is_none());
    }

    #[test]
    fn test_return_inside_branch_and_loop() {
        let located = locate_first(
            "using System.Collections.Generic;\n\
             class C { IEnumerable<int> M(bool b) { if (b) { return new int[0]; } return null; } }",
        )
        .unwrap();
        assert_eq!(located.role, SyntaxRole::ReturnPosition);
        let in_loop = locate_first(
            "using System.Collections.Generic;\n\
             class C { IReadOnlyList<int> M(int n) { for (int i = 0; i < n; i++) { if (i > 1) return new List<int>(); } return null; } }",
        );
        assert!(in_loop.is_some_and(|located| located.role == SyntaxRole::ReturnPosition));
    }

    #[test]
    fn test_return_inside_nested_function_is_rejected() {
        assert!(
            locate_first(
                "using System.Collections.Generic;\n\
                 class C { IEnumerable<int> M() { object Local() { return new int[0]; } return null; } }",
            )
            .is_none()
        );
        assert!(
            locate_first(
                "using System;\nusing System.Collections.Generic;\n\
                 class C { IEnumerable<int> M() { Run(() => { return new int[0]; }); return null; } void Run(Func<object> f) { } }",
            )
            .is_none()
        );
    }

    #[test]
    fn test_non_creation_range() {
        let document = Document::parse("a.cs", "class C { int A = 1; }").unwrap();
        let model = zeroalloc_semantic::bind(&document);
        assert!(locate(&document, &model, TextRange::new(18, 19)).is_none());
    }
}
