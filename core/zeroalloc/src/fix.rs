use zeroalloc_ast::document::Document;
use zeroalloc_semantic::SemanticModel;

use crate::analyzer::analyze_document;
use crate::cancellation::CancellationToken;
use crate::config::AnalyzerConfig;
use crate::diagnostics::Diagnostic;
use crate::eligibility;
use crate::errors::FixError;
use crate::locator;
use crate::rewrite;
use crate::rules::{NEW_ARRAY_RULE_ID, NEW_OBJECT_RULE_ID};

pub const FIX_TITLE: &str = "Avoid allocation by using Array.Empty<>()";

/// Diagnostics the fix knows how to resolve.
pub const FIXABLE_DIAGNOSTIC_IDS: [&str; 2] = [NEW_OBJECT_RULE_ID, NEW_ARRAY_RULE_ID];

/// Result of one fix: the rewritten document, or the input document when
/// the creation was proven replaceable but its position has no splice.
#[derive(Debug, Clone)]
pub struct FixedDocument {
    pub document: Document,
    pub title: &'static str,
    changed: bool,
}

impl FixedDocument {
    #[must_use]
    pub fn is_unchanged(&self) -> bool {
        !self.changed
    }
}

/// Proposes the `Array.Empty<T>()` rewrite for `diagnostic`.
///
/// `Ok(None)` means the diagnostic is not one this fix handles, or the
/// creation it points at cannot be proven replaceable.
///
/// # Errors
///
/// Returns [`FixError::Cancelled`] if `cancellation` fires before locating,
/// proving or rewriting.
pub fn propose_fix(
    diagnostic: &Diagnostic,
    document: &Document,
    model: &dyn SemanticModel,
    cancellation: &CancellationToken,
) -> Result<Option<FixedDocument>, FixError> {
    if !FIXABLE_DIAGNOSTIC_IDS.contains(&diagnostic.id.as_str()) {
        return Ok(None);
    }
    cancellation.check()?;
    let Some(located) = locator::locate(document, model, diagnostic.range) else {
        return Ok(None);
    };
    cancellation.check()?;
    let Some(element) = eligibility::prove(&located.creation, model) else {
        return Ok(None);
    };
    cancellation.check()?;
    let qualify_system = !document.root().imports("System");
    let replacement = rewrite::empty_sequence_expression(element, qualify_system);
    let fixed = rewrite::splice(document, &located, replacement);
    let changed = !fixed.ptr_eq(document);
    Ok(Some(FixedDocument {
        document: fixed,
        title: FIX_TITLE,
        changed,
    }))
}

/// Outcome of [`fix_document`].
#[derive(Debug, Clone)]
pub struct FixReport {
    pub document: Document,
    /// Diagnostics resolved, in the order they were applied.
    pub applied: Vec<Diagnostic>,
}

/// Applies fixes one at a time until none changes the document. The
/// document is re-bound and re-analyzed after every applied fix.
///
/// # Errors
///
/// Returns [`FixError::Cancelled`] if `cancellation` fires.
pub fn fix_document(
    document: &Document,
    config: &AnalyzerConfig,
    cancellation: &CancellationToken,
) -> Result<FixReport, FixError> {
    let mut current = document.clone();
    let mut applied = Vec::new();
    loop {
        cancellation.check()?;
        let model = zeroalloc_semantic::bind(&current);
        let mut next = None;
        for diagnostic in analyze_document(&current, &model, config) {
            if let Some(fixed) = propose_fix(&diagnostic, &current, &model, cancellation)?
                && !fixed.is_unchanged()
            {
                next = Some((fixed.document, diagnostic));
                break;
            }
        }
        let Some((fixed, diagnostic)) = next else {
            break;
        };
        tracing::debug!(%diagnostic, start = diagnostic.range.start, "applied fix");
        applied.push(diagnostic);
        current = fixed;
    }
    Ok(FixReport {
        document: current,
        applied,
    })
}
