//! minish REPL — interactive front end over the execution core.
//!
//! The REPL owns the line editor and the prompt loop; everything else is
//! `minish_kernel::Shell`. Before each prompt it drains jobs that finished
//! in the background and reports them, the way an operator expects to hear
//! about a `&` job that ended while they were typing.

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use rustyline::Editor;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;

use minish_kernel::{ExecResult, Shell};

/// REPL state: the shell plus the line editor's history location.
pub struct Repl {
    shell: Shell,
}

impl Repl {
    pub fn new() -> Result<Self> {
        let shell = Shell::new().context("failed to initialize shell")?;
        Ok(Self { shell })
    }

    /// Run the prompt loop until `exit` or end-of-file.
    ///
    /// Returns the exit code to report to the parent process.
    pub fn run(&mut self) -> Result<i32> {
        let mut rl: Editor<(), DefaultHistory> =
            Editor::new().context("failed to create line editor")?;

        let history_path = directories::BaseDirs::new()
            .map(|b| b.data_dir().join("minish").join("history.txt"));
        if let Some(path) = &history_path
            && let Err(e) = rl.load_history(path)
        {
            let not_found = matches!(&e, ReadlineError::Io(io_err)
                if io_err.kind() == std::io::ErrorKind::NotFound);
            if !not_found {
                tracing::warn!("failed to load history: {e}");
            }
        }

        let code = loop {
            for job in self.shell.take_finished() {
                println!("[{}] Done\t{}", job.id, job.command);
            }

            match rl.readline(&prompt()) {
                Ok(line) => {
                    if !line.trim().is_empty()
                        && let Err(e) = rl.add_history_entry(line.as_str())
                    {
                        tracing::warn!("failed to record history entry: {e}");
                    }
                    print_result(&self.shell.execute(&line));
                    if let Some(code) = self.shell.exit_request() {
                        break code;
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => break 0,
                Err(err) => {
                    eprintln!("minish: {err}");
                    break 1;
                }
            }
        };

        save_history(&mut rl, &history_path);
        Ok(code)
    }
}

/// Execute one command line non-interactively (`minish -c '...'`).
pub fn run_command(cmd: &str) -> Result<i32> {
    let mut shell = Shell::new().context("failed to initialize shell")?;
    let result = shell.execute(cmd);
    print_result(&result);
    Ok(shell.exit_request().unwrap_or(result.code))
}

fn prompt() -> String {
    let cwd = env::current_dir()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|_| "?".to_string());
    format!("minish:{cwd}$ ")
}

fn print_result(result: &ExecResult) {
    if !result.out.is_empty() {
        print!("{}", result.out);
    }
    if !result.err.is_empty() {
        eprint!("{}", result.err);
    }
}

fn save_history(rl: &mut Editor<(), DefaultHistory>, history_path: &Option<PathBuf>) {
    if let Some(path) = history_path {
        if let Some(parent) = path.parent()
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            tracing::warn!("failed to create history directory: {e}");
        }
        if let Err(e) = rl.save_history(path) {
            tracing::warn!("failed to save history: {e}");
        }
    }
}
