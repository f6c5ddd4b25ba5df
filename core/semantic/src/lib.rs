#![warn(clippy::pedantic)]
//! Semantic model for the allocation analyzer.
//!
//! [`bind`] resolves a [`zeroalloc_ast::document::Document`] against a small
//! catalog of base-library types plus the types the document declares, and
//! produces a [`model::TypedModel`] answering the [`model::SemanticModel`]
//! queries: the static type of an expression or type node, the method a call
//! binds to, the symbol a declaration declares, and interface closure.
pub mod binder;
pub mod errors;
pub mod model;
pub mod type_info;
pub mod type_table;
pub mod well_known;

pub use binder::bind;
pub use model::{SemanticModel, TypedModel};
