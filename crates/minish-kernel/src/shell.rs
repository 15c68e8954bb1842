//! Shell façade: one `execute` entry point over the whole execution core.
//!
//! Construction wires the job table, the terminal handle, the pipeline
//! launcher, the builtin registry, and the signal reconciler thread. Front
//! ends (the REPL, `-c` one-shots, tests) drive it a line at a time.

use std::sync::Arc;

use crate::builtins::{self, BuiltinContext, Registry};
use crate::error::ShellError;
use crate::jobs::{JobInfo, JobTable};
use crate::parser;
use crate::pipeline::Launcher;
use crate::result::ExecResult;
use crate::signals;
use crate::terminal::Terminal;

/// The assembled shell.
pub struct Shell {
    table: Arc<JobTable>,
    terminal: Arc<Terminal>,
    launcher: Launcher,
    builtins: Registry,
    exit_request: Option<i32>,
}

impl Shell {
    /// Build a shell and start its signal reconciler thread.
    pub fn new() -> Result<Self, ShellError> {
        let terminal = Arc::new(Terminal::new()?);
        let table = Arc::new(JobTable::new());
        signals::spawn_reconciler(Arc::clone(&table), Arc::clone(&terminal))?;
        let launcher = Launcher::new(Arc::clone(&table), Arc::clone(&terminal));
        Ok(Self {
            table,
            terminal,
            launcher,
            builtins: builtins::default_registry(),
            exit_request: None,
        })
    }

    /// Execute one input line to completion (or to the background).
    pub fn execute(&mut self, line: &str) -> ExecResult {
        let line = line.trim();
        if line.is_empty() {
            return ExecResult::success("");
        }

        let pipeline = match parser::parse(line) {
            Ok(p) => p,
            Err(e) => return ExecResult::failure(2, format!("minish: {e}")),
        };
        if pipeline.stages.is_empty() {
            return ExecResult::success("");
        }

        // Builtins run in-process only as a plain single command; inside a
        // pipeline, redirected, or backgrounded they go through the launcher
        // like anything else.
        if pipeline.stages.len() == 1 && !pipeline.background {
            let stage = &pipeline.stages[0];
            if stage.input.is_none()
                && stage.output.is_none()
                && let Some(name) = stage.argv.first()
                && let Some(builtin) = self.builtins.get(name)
            {
                let mut ctx = BuiltinContext {
                    table: &self.table,
                    terminal: &self.terminal,
                    exit_request: &mut self.exit_request,
                };
                return builtin.run(&stage.argv, &mut ctx);
            }
        }

        match self.launcher.launch(&pipeline, line) {
            Ok(result) => result,
            Err(e) => ExecResult::failure(1, format!("minish: {e}")),
        }
    }

    /// Drain jobs that finished since the last call, for prompt-time reports.
    pub fn take_finished(&self) -> Vec<JobInfo> {
        self.table.take_finished()
    }

    /// Exit code requested by the `exit` builtin, if any.
    pub fn exit_request(&self) -> Option<i32> {
        self.exit_request
    }

    /// The live job table (snapshots for tests and front ends).
    pub fn jobs(&self) -> Vec<JobInfo> {
        self.table.list()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_and_whitespace_lines_are_noops() {
        let mut shell = Shell::new().unwrap();
        assert!(shell.execute("").ok());
        assert!(shell.execute("   \t ").ok());
        assert!(shell.jobs().is_empty());
    }

    #[test]
    fn syntax_errors_do_not_kill_the_shell() {
        let mut shell = Shell::new().unwrap();
        let r = shell.execute("cat <");
        assert_eq!(r.code, 2);
        assert!(r.err.contains("syntax error"));
        assert!(shell.execute("").ok());
    }

    #[test]
    fn exit_sets_the_request_without_terminating() {
        let mut shell = Shell::new().unwrap();
        assert_eq!(shell.exit_request(), None);
        assert!(shell.execute("exit 3").ok());
        assert_eq!(shell.exit_request(), Some(3));
    }
}
