//! Analyzer configuration.
//!
//! Read from a `zeroalloc.toml` file:
//!
//! ```toml
//! [ignore]
//! files = ["*.g.cs", "*.designer.cs"]
//! attributes = ["GeneratedCode"]
//!
//! [rules]
//! new-object = true
//! new-array = true
//! ```
//!
//! File patterns are globs matched case-insensitively against the file name
//! and the whole path. Attribute names match with or without namespace and
//! with or without the `Attribute` suffix.

use std::path::Path;

use glob::{MatchOptions, Pattern};
use serde::Deserialize;

use crate::errors::ConfigError;
use crate::rules::AllocationRule;

pub const CONFIG_FILE_NAME: &str = "zeroalloc.toml";

const DEFAULT_IGNORED_FILES: &[&str] = &["*.g.cs", "*.g.i.cs", "*.designer.cs", "*.generated.cs"];
const DEFAULT_IGNORED_ATTRIBUTES: &[&str] = &["GeneratedCode", "CompilerGenerated", "IgnoreAllocations"];

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: false,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    ignore: IgnoreSection,
    rules: RulesSection,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct IgnoreSection {
    files: Vec<String>,
    attributes: Vec<String>,
}

impl Default for IgnoreSection {
    fn default() -> Self {
        Self {
            files: DEFAULT_IGNORED_FILES.iter().map(ToString::to_string).collect(),
            attributes: DEFAULT_IGNORED_ATTRIBUTES.iter().map(ToString::to_string).collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
struct RulesSection {
    new_object: bool,
    new_array: bool,
}

impl Default for RulesSection {
    fn default() -> Self {
        Self {
            new_object: true,
            new_array: true,
        }
    }
}

/// Which files, symbols and rules the analyzer skips.
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    ignored_files: Vec<Pattern>,
    ignored_attributes: Vec<String>,
    new_object: bool,
    new_array: bool,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        AnalyzerConfig {
            ignored_files: DEFAULT_IGNORED_FILES
                .iter()
                .filter_map(|pattern| Pattern::new(pattern).ok())
                .collect(),
            ignored_attributes: DEFAULT_IGNORED_ATTRIBUTES
                .iter()
                .map(ToString::to_string)
                .collect(),
            new_object: true,
            new_array: true,
        }
    }
}

impl AnalyzerConfig {
    /// Parses a configuration from TOML text. Omitted keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] on malformed TOML or unknown keys and
    /// [`ConfigError::Pattern`] on an invalid glob.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(text)?;
        Self::from_file(file)
    }

    /// Reads and parses a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] if the file cannot be read, otherwise
    /// the errors of [`AnalyzerConfig::from_toml`].
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&text)?;
        tracing::debug!(path = %path.display(), ?config, "loaded configuration");
        Ok(config)
    }

    fn from_file(file: ConfigFile) -> Result<Self, ConfigError> {
        let ignored_files = file
            .ignore
            .files
            .into_iter()
            .map(|pattern| {
                Pattern::new(&pattern).map_err(|source| ConfigError::Pattern { pattern, source })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(AnalyzerConfig {
            ignored_files,
            ignored_attributes: file
                .ignore
                .attributes
                .iter()
                .map(|a| normalize_attribute(a).to_string())
                .collect(),
            new_object: file.rules.new_object,
            new_array: file.rules.new_array,
        })
    }

    #[must_use]
    pub fn is_ignored_file(&self, path: &Path) -> bool {
        let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        self.ignored_files.iter().any(|pattern| {
            pattern.matches_with(file_name, MATCH_OPTIONS)
                || pattern.matches_path_with(path, MATCH_OPTIONS)
        })
    }

    #[must_use]
    pub fn is_ignored_attribute(&self, name: &str) -> bool {
        let name = normalize_attribute(name);
        self.ignored_attributes.iter().any(|ignored| ignored == name)
    }

    #[must_use]
    pub fn is_rule_enabled(&self, rule: AllocationRule) -> bool {
        match rule {
            AllocationRule::NewObject => self.new_object,
            AllocationRule::NewArray => self.new_array,
        }
    }
}

/// `System.CodeDom.Compiler.GeneratedCodeAttribute` -> `GeneratedCode`.
fn normalize_attribute(name: &str) -> &str {
    let simple = name.rsplit('.').next().unwrap_or(name);
    match simple.strip_suffix("Attribute") {
        Some(stripped) if !stripped.is_empty() => stripped,
        _ => simple,
    }
}
