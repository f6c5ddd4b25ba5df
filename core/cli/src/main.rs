#![warn(clippy::pedantic)]

//! # zalloc
//!
//! Command line front end for the zeroalloc allocation analyzer.
//!
//! 1. Collect `.cs` files from the given paths (directories are walked).
//! 2. Parse and bind each file, then run the allocation rules.
//! 3. Report diagnostics, or with `--fix` apply the `Array.Empty<T>()` rewrite.
//!
//! Files are processed in parallel; output keeps command line order.
//!
//! ## Exit codes
//! * 0 – success, whether or not diagnostics were reported.
//! * 1 – IO, parse or configuration failure.
//!
//! ## Example
//! ```bash
//! zalloc src/ --fix --write
//! ```

mod parser;

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result, bail};
use clap::Parser;
use parser::Cli;
use rayon::prelude::*;
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;
use zeroalloc::config::CONFIG_FILE_NAME;
use zeroalloc::{AnalyzerConfig, CancellationToken, analyze_document, fix_document, propose_fix};
use zeroalloc_ast::document::Document;

const LOG_ENV: &str = "ZEROALLOC_LOG";
const SOURCE_EXTENSION: &str = "cs";

fn main() {
    let args = Cli::parse();
    init_tracing(args.verbose);
    if let Err(e) = run(&args) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: &Cli) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let files = collect_sources(&args.paths)?;
    tracing::debug!(files = files.len(), "collected sources");

    let outputs: Vec<Result<String>> = files
        .par_iter()
        .map(|path| process_file(path, args, &config))
        .collect();

    let mut failed = false;
    for output in outputs {
        match output {
            Ok(text) => print!("{text}"),
            Err(e) => {
                eprintln!("Error: {e:#}");
                failed = true;
            }
        }
    }
    if failed {
        bail!("one or more files could not be processed");
    }
    Ok(())
}

fn load_config(explicit: Option<&Path>) -> Result<AnalyzerConfig> {
    if let Some(path) = explicit {
        return AnalyzerConfig::load(path)
            .with_context(|| format!("failed to load configuration {}", path.display()));
    }
    let implicit = Path::new(CONFIG_FILE_NAME);
    if implicit.is_file() {
        return AnalyzerConfig::load(implicit)
            .with_context(|| format!("failed to load configuration {}", implicit.display()));
    }
    Ok(AnalyzerConfig::default())
}

/// Files named directly are taken as-is; directories contribute every `.cs`
/// file below them, sorted.
fn collect_sources(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_file() {
            files.push(path.clone());
        } else if path.is_dir() {
            let mut found = Vec::new();
            for entry in WalkDir::new(path) {
                let entry = entry.with_context(|| format!("failed to walk {}", path.display()))?;
                if entry.file_type().is_file()
                    && entry.path().extension().is_some_and(|ext| ext == SOURCE_EXTENSION)
                {
                    found.push(entry.into_path());
                }
            }
            found.sort();
            files.extend(found);
        } else {
            bail!("path not found: {}", path.display());
        }
    }
    Ok(files)
}

fn process_file(path: &Path, args: &Cli, config: &AnalyzerConfig) -> Result<String> {
    let document = Document::read(path).with_context(|| format!("failed to parse {}", path.display()))?;
    if args.emit_ast {
        let json = serde_json::to_string_pretty(&*document.root())
            .with_context(|| format!("failed to serialize {}", path.display()))?;
        return Ok(format!("{json}\n"));
    }
    let cancellation = CancellationToken::new();
    if args.fix {
        let report = fix_document(&document, config, &cancellation)?;
        if args.write {
            if !report.applied.is_empty() {
                fs::write(path, report.document.text())
                    .with_context(|| format!("failed to write {}", path.display()))?;
            }
            return Ok(format!("Fixed {} allocation(s) in {}\n", report.applied.len(), path.display()));
        }
        return Ok(report.document.text().to_string());
    }
    report_diagnostics(&document, config, &cancellation)
}

fn report_diagnostics(
    document: &Document,
    config: &AnalyzerConfig,
    cancellation: &CancellationToken,
) -> Result<String> {
    let model = zeroalloc_semantic::bind(document);
    let mut out = String::new();
    for diagnostic in analyze_document(document, &model, config) {
        let (line, column) = document.line_column(diagnostic.range.start);
        let fixable = propose_fix(&diagnostic, document, &model, cancellation)?
            .is_some_and(|fixed| !fixed.is_unchanged());
        let _ = write!(
            out,
            "{}:{line}:{column}: {diagnostic}",
            document.path().display()
        );
        out.push_str(if fixable { " [fixable]\n" } else { "\n" });
    }
    Ok(out)
}
