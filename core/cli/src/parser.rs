//! Command line argument parsing for `zalloc`.

use std::path::PathBuf;

use clap::Parser;

/// Command line interface definition for the allocation analyzer.
///
/// Every `.cs` file named on the command line, or found below a named
/// directory, is analyzed. Diagnostics are printed as
/// `path:line:column: ID: message`, with `[fixable]` appended when the
/// `Array.Empty<T>()` fix would change the file.
///
/// ## Examples
///
/// Report diagnostics for a project:
/// ```bash
/// zalloc src/
/// ```
///
/// Apply every fix in place:
/// ```bash
/// zalloc src/ --fix --write
/// ```
#[derive(Parser)]
#[command(
    name = "zalloc",
    author,
    version,
    about = "Finds explicit allocations and replaces empty read-only ones with Array.Empty<T>()",
    after_help = "\
ENVIRONMENT VARIABLES:
    ZEROALLOC_LOG    Log filter, e.g. `zeroalloc=debug` (overridden by -v)"
)]
#[allow(clippy::struct_excessive_bools)]
pub(crate) struct Cli {
    /// Source files or directories to analyze.
    #[clap(required = true)]
    pub(crate) paths: Vec<PathBuf>,

    /// Apply fixes one at a time and print each fixed file.
    #[clap(long = "fix", action = clap::ArgAction::SetTrue)]
    pub(crate) fix: bool,

    /// With `--fix`, write fixed files back instead of printing them.
    #[clap(long = "write", action = clap::ArgAction::SetTrue, requires = "fix")]
    pub(crate) write: bool,

    /// Configuration file. Defaults to `zeroalloc.toml` in the working
    /// directory when that file exists.
    #[clap(long = "config")]
    pub(crate) config: Option<PathBuf>,

    /// Print the syntax tree of each file as JSON instead of analyzing it.
    #[clap(long = "emit-ast", action = clap::ArgAction::SetTrue, conflicts_with = "fix")]
    pub(crate) emit_ast: bool,

    /// Raise log verbosity: `-v` for debug, `-vv` for trace.
    #[clap(short = 'v', action = clap::ArgAction::Count)]
    pub(crate) verbose: u8,
}
