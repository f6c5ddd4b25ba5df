use core::fmt;
use std::fmt::{Display, Formatter};

use zeroalloc_ast::nodes::TextRange;

/// A finding reported by an allocation rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Diagnostic {
    /// Rule id, e.g. `HAA0501`.
    pub id: String,
    pub range: TextRange,
    pub message: String,
}

impl Diagnostic {
    #[must_use]
    pub fn new(id: impl Into<String>, range: TextRange, message: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            range,
            message: message.into(),
        }
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.id, self.message)
    }
}
