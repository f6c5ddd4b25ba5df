use std::sync::Arc;

use zeroalloc_ast::nodes::{
    ArrayCreationExpression, InitializerExpression, ObjectCreationExpression, SyntaxNode,
};

/// An allocation the fix can target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreationExpression {
    Array(Arc<ArrayCreationExpression>),
    Object(Arc<ObjectCreationExpression>),
}

impl CreationExpression {
    #[must_use]
    pub fn from_syntax(node: &SyntaxNode) -> Option<Self> {
        match node {
            SyntaxNode::ArrayCreationExpression(n) => Some(CreationExpression::Array(Arc::clone(n))),
            SyntaxNode::ObjectCreationExpression(n) => Some(CreationExpression::Object(Arc::clone(n))),
            _ => None,
        }
    }

    #[must_use]
    pub fn id(&self) -> u64 {
        match self {
            CreationExpression::Array(n) => n.id,
            CreationExpression::Object(n) => n.id,
        }
    }

    #[must_use]
    pub fn initializer(&self) -> Option<&Arc<InitializerExpression>> {
        match self {
            CreationExpression::Array(n) => n.initializer.as_ref(),
            CreationExpression::Object(n) => n.initializer.as_ref(),
        }
    }

    /// Absent, or present with zero elements.
    #[must_use]
    pub fn has_empty_initializer(&self) -> bool {
        self.initializer().is_none_or(|i| i.expressions.is_empty())
    }
}
