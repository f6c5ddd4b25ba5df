#![warn(clippy::pedantic)]
//! Allocation analyzer and `Array.Empty<T>()` code fix.
//!
//! The crate finds explicit array and collection creations (`HAA0501`,
//! `HAA0502`) and, where an empty creation only ever flows into a read-only
//! sequence, rewrites it to the shared zero-length array.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use zeroalloc::{AnalyzerConfig, CancellationToken, analyze_document, propose_fix};
//! use zeroalloc_ast::document::Document;
//!
//! fn fix_first(path: &std::path::Path) -> Result<Option<Document>, Box<dyn std::error::Error>> {
//!     let document = Document::read(path)?;
//!     let model = zeroalloc_semantic::bind(&document);
//!     let config = AnalyzerConfig::default();
//!     for diagnostic in analyze_document(&document, &model, &config) {
//!         if let Some(fixed) = propose_fix(&diagnostic, &document, &model, &CancellationToken::new())? {
//!             return Ok(Some(fixed.document));
//!         }
//!     }
//!     Ok(None)
//! }
//! ```
//!
//! ## Pipeline
//!
//! 1. [`filter::gate`] drops ignored files and members marked with an ignored
//!    attribute; [`rules::AllocationRule::classify`] emits the diagnostics.
//! 2. [`locator::locate`] maps a diagnostic back to its creation and the
//!    role the creation plays: returned value, arrow body, or argument.
//! 3. [`oracle::is_read_only_sequence`] checks the declared type at that
//!    position, and [`eligibility::prove`] checks the creation itself.
//! 4. [`rewrite::splice`] swaps in `Array.Empty<T>()`, producing a new
//!    [`zeroalloc_ast::document::Document`]; the input is never mutated.
//!
//! [`fix::fix_document`] repeats the above, re-binding after every applied fix.
pub mod analyzer;
pub mod cancellation;
pub mod config;
pub mod creation;
pub mod diagnostics;
pub mod eligibility;
pub mod errors;
pub mod filter;
pub mod fix;
pub mod locator;
pub mod oracle;
pub mod rewrite;
pub mod rules;

pub use analyzer::analyze_document;
pub use cancellation::CancellationToken;
pub use config::AnalyzerConfig;
pub use diagnostics::Diagnostic;
pub use errors::{ConfigError, FixError};
pub use filter::{Gate, analyze};
pub use fix::{FIX_TITLE, FixReport, FixedDocument, fix_document, propose_fix};
pub use locator::SyntaxRole;
pub use rules::{AllocationRule, Verdict};
