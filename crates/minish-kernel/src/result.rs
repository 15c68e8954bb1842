//! ExecResult — the structured result of every command execution.
//!
//! Builtins and the pipeline launcher report their outcome through this one
//! type: an exit code plus whatever should land on the operator's stdout and
//! stderr. The REPL prints `out`/`err` and otherwise ignores the result.

/// The result of executing a builtin or a pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExecResult {
    /// Exit code. 0 means success.
    pub code: i32,
    /// Text destined for standard output.
    pub out: String,
    /// Text destined for standard error.
    pub err: String,
}

impl ExecResult {
    /// Create a successful result with output.
    pub fn success(out: impl Into<String>) -> Self {
        Self {
            code: 0,
            out: out.into(),
            err: String::new(),
        }
    }

    /// Create a failed result with an error message.
    pub fn failure(code: i32, err: impl Into<String>) -> Self {
        Self {
            code,
            out: String::new(),
            err: err.into(),
        }
    }

    /// Create a result from an exit code and both output streams.
    pub fn from_output(code: i32, out: impl Into<String>, err: impl Into<String>) -> Self {
        Self {
            code,
            out: out.into(),
            err: err.into(),
        }
    }

    /// True if the command succeeded (exit code 0).
    pub fn ok(&self) -> bool {
        self.code == 0
    }
}
