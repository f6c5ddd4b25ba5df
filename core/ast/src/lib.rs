#![warn(clippy::pedantic)]
//! Persistent syntax tree for the C# sources the allocation analyzer reads.
//!
//! Sources are parsed with `tree-sitter-c-sharp`; the builder turns the
//! concrete tree into typed, `Arc`-shared nodes.
//!
//! A [`document::Document`] owns the text, the root node and an
//! [`arena::Arena`] index with parent links and source ranges. Nodes are
//! immutable and `Arc`-shared; [`document::Document::replace_node`] rebuilds
//! only the path to the root and re-renders only the replaced range.
pub mod arena;
mod builder;
pub mod document;
pub mod errors;
pub mod nodes;
pub(crate) mod nodes_impl;
pub mod printer;
