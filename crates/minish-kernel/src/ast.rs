//! Parsed command structures consumed by the pipeline launcher.

use std::path::PathBuf;

/// An output redirection target (`>` or `>>`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputRedirect {
    /// File the stage's stdout is redirected into.
    pub path: PathBuf,
    /// True for `>>` (create-or-append), false for `>` (create-or-truncate).
    pub append: bool,
}

/// One stage of a pipeline: an argument vector plus optional redirections.
///
/// Immutable once parsed; the launcher is its sole consumer. A stage with an
/// empty `argv` is legal and behaves as a no-op that exits 0 (it still opens
/// and creates its redirection targets, so `> file` truncates `file`).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandStage {
    /// Program name followed by its arguments.
    pub argv: Vec<String>,
    /// Input redirection (`< path`), honored only for the first stage.
    pub input: Option<PathBuf>,
    /// Output redirection (`> path` / `>> path`), honored only for the last stage.
    pub output: Option<OutputRedirect>,
}

impl CommandStage {
    /// True if the stage carries neither arguments nor redirections.
    pub fn is_empty(&self) -> bool {
        self.argv.is_empty() && self.input.is_none() && self.output.is_none()
    }
}

/// An ordered sequence of stages plus the background flag.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Pipeline {
    /// Stages in execution order; stage i's stdout feeds stage i+1's stdin.
    pub stages: Vec<CommandStage>,
    /// True when the line ended with `&`.
    pub background: bool,
}
