use core::fmt;
use std::fmt::{Display, Formatter};

use thiserror::Error;

/// 1-based source position of a binding error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

impl Display for Location {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Problems found while binding. The binder records them and keeps going;
/// expressions it cannot bind simply have no type in the model.
#[must_use = "errors must not be silently ignored"]
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BindError {
    #[error("{location}: unknown type `{name}`")]
    UnknownType { name: String, location: Location },

    #[error("{location}: unknown name `{name}`")]
    UnknownName { name: String, location: Location },

    #[error("{location}: no overload of `{name}` accepts {arguments} argument(s)")]
    NoApplicableOverload {
        name: String,
        arguments: usize,
        location: Location,
    },

    #[error("{location}: type `{name}` is declared more than once")]
    DuplicateType { name: String, location: Location },
}

impl BindError {
    #[must_use]
    pub fn location(&self) -> Location {
        match self {
            BindError::UnknownType { location, .. }
            | BindError::UnknownName { location, .. }
            | BindError::NoApplicableOverload { location, .. }
            | BindError::DuplicateType { location, .. } => *location,
        }
    }
}
