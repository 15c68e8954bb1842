//! Error types for the execution core.

use nix::errno::Errno;
use thiserror::Error;

/// Errors surfaced by the kernel to its caller.
///
/// Per-stage failures (bad redirection target, program not found) are not
/// represented here: they are local to the forked child, which reports them
/// on stderr and exits with a non-zero status. Nothing in this enum is ever
/// fatal to the shell's control thread.
#[derive(Debug, Error)]
pub enum ShellError {
    /// The input line could not be tokenized or parsed.
    #[error("syntax error: {0}")]
    Syntax(String),

    /// Pipe allocation failed before any stage was created.
    #[error("failed to create pipe: {0}")]
    Pipe(Errno),

    /// Process creation failed before any stage was created.
    #[error("fork failed: {0}")]
    Fork(Errno),

    /// The controlling terminal could not be assigned or reclaimed.
    #[error("terminal handoff failed: {0}")]
    Terminal(Errno),

    /// The shell's own process group could not be established at startup.
    #[error("failed to initialize shell process group: {0}")]
    Init(Errno),

    /// The signal listener thread could not be installed.
    #[error("failed to install signal handlers: {0}")]
    SignalSetup(#[from] std::io::Error),
}
