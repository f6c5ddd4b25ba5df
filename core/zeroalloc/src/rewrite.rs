use zeroalloc_ast::document::Document;
use zeroalloc_ast::nodes::{
    Expression, GenericName, Identifier, InvocationExpression, MemberAccessExpression, SimpleName,
    SyntaxNode, TypeSyntax,
};

use crate::locator::LocatedCreation;

/// `Array.Empty<element>()`, or `System.Array.Empty<element>()` when
/// `qualify_system` is set.
#[must_use]
pub fn empty_sequence_expression(element: TypeSyntax, qualify_system: bool) -> Expression {
    let array = Identifier::new("Array");
    let receiver = if qualify_system {
        Expression::MemberAccess(MemberAccessExpression::new(
            Expression::Identifier(Identifier::new("System")),
            SimpleName::Identifier(array),
        ))
    } else {
        Expression::Identifier(array)
    };
    let callee = MemberAccessExpression::new(
        receiver,
        SimpleName::Generic(GenericName::new("Empty", vec![element])),
    );
    Expression::Invocation(InvocationExpression::new(Expression::MemberAccess(callee), Vec::new()))
}

/// Puts `replacement` where the located creation was. Only the creation's
/// own bytes are re-rendered, so comments and line breaks around it survive.
/// `yield return` and roles without a splice leave the document unchanged.
#[must_use]
pub fn splice(document: &Document, located: &LocatedCreation, replacement: Expression) -> Document {
    let splices = matches!(
        located.parent,
        SyntaxNode::ReturnStatement(_) | SyntaxNode::ArrowExpressionClause(_) | SyntaxNode::Argument(_)
    );
    if !splices {
        tracing::debug!(parent = ?located.parent.kind(), "no splice for parent, leaving document unchanged");
        return document.clone();
    }
    let target = located.creation.id();
    match document.replace_node(target, &SyntaxNode::from(replacement)) {
        Some(fixed) => {
            tracing::debug!(target, path = %document.path().display(), "spliced replacement");
            fixed
        }
        None => {
            tracing::debug!(target, "replacement rejected by parent slot");
            document.clone()
        }
    }
}
