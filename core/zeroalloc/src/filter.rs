//! Suppression of analysis for ignored files and ignore-marked symbols.

use std::path::Path;

use zeroalloc_ast::nodes::SyntaxNode;
use zeroalloc_semantic::type_info::DeclaredSymbol;

use crate::analyzer::AnalysisContext;
use crate::config::AnalyzerConfig;
use crate::rules::{AllocationRule, Verdict};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    Skip,
    Proceed,
}

/// `Skip` when the file is ignored or the containing symbol carries an
/// ignored attribute.
#[must_use]
pub fn gate(config: &AnalyzerConfig, path: &Path, containing_symbol: Option<&DeclaredSymbol>) -> Gate {
    if config.is_ignored_file(path) {
        tracing::trace!(path = %path.display(), "ignored file");
        return Gate::Skip;
    }
    let ignored_attribute = containing_symbol.and_then(|symbol| {
        symbol
            .attributes
            .iter()
            .find(|attribute| config.is_ignored_attribute(attribute))
    });
    if let Some(attribute) = ignored_attribute {
        tracing::trace!(%attribute, "ignored symbol");
        return Gate::Skip;
    }
    Gate::Proceed
}

/// Runs `rule` on `node` unless the gate skips it.
#[must_use]
pub fn analyze(
    rule: AllocationRule,
    node: &SyntaxNode,
    containing_symbol: Option<&DeclaredSymbol>,
    context: &AnalysisContext<'_>,
) -> Verdict {
    match gate(context.config, context.document.path(), containing_symbol) {
        Gate::Skip => Verdict::NotApplicable,
        Gate::Proceed => rule.classify(node, context),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zeroalloc_semantic::type_info::SymbolKind;

    fn symbol(attributes: &[&str]) -> DeclaredSymbol {
        DeclaredSymbol {
            name: "M".into(),
            kind: SymbolKind::Method,
            containing_type: Some("C".into()),
            attributes: attributes.iter().map(ToString::to_string).collect(),
        }
    }

    #[test]
    fn test_gate() {
        let config = AnalyzerConfig::default();
        let path = Path::new("src/C.cs");
        assert_eq!(gate(&config, path, None), Gate::Proceed);
        assert_eq!(gate(&config, path, Some(&symbol(&["Obsolete"]))), Gate::Proceed);
        assert_eq!(gate(&config, path, Some(&symbol(&["Obsolete", "GeneratedCode"]))), Gate::Skip);
        assert_eq!(gate(&config, Path::new("src/C.g.cs"), None), Gate::Skip);
    }
}
