//! Builtin commands.
//!
//! Builtins that inspect or mutate shell state (`jobs`, `fg`, `bg`, `cd`,
//! `exit`) run inside the shell process itself, never through the pipeline
//! launcher — a forked `cd` would change a directory nobody looks at, and a
//! forked `fg` has no job table. The registry maps names to implementations;
//! the shell consults it before falling back to `execvp`.

use std::collections::HashMap;
use std::sync::Arc;

use crate::jobs::{JobId, JobInfo, JobTable};
use crate::result::ExecResult;
use crate::terminal::Terminal;

mod bg;
mod cd;
mod exit;
mod fg;
mod jobs;

pub use bg::Bg;
pub use cd::Cd;
pub use exit::Exit;
pub use fg::Fg;
pub use jobs::Jobs;

/// Shell state a builtin may read or mutate.
pub struct BuiltinContext<'a> {
    pub table: &'a Arc<JobTable>,
    pub terminal: &'a Arc<Terminal>,
    /// Set by `exit` to request shell termination with this code.
    pub exit_request: &'a mut Option<i32>,
}

/// A command implemented inside the shell process.
pub trait Builtin: Send + Sync {
    /// Command name as typed at the prompt.
    fn name(&self) -> &'static str;

    /// One-line help text.
    fn description(&self) -> &'static str;

    /// Run with `argv` (including the command name at index 0).
    fn run(&self, argv: &[String], ctx: &mut BuiltinContext<'_>) -> ExecResult;
}

/// Name-keyed builtin registry.
pub struct Registry {
    builtins: HashMap<&'static str, Box<dyn Builtin>>,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            builtins: HashMap::new(),
        }
    }

    pub fn register(&mut self, builtin: Box<dyn Builtin>) {
        self.builtins.insert(builtin.name(), builtin);
    }

    pub fn get(&self, name: &str) -> Option<&dyn Builtin> {
        self.builtins.get(name).map(|b| b.as_ref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.builtins.contains_key(name)
    }

    /// Names in sorted order, for help output.
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.builtins.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

/// Registry with the standard builtin set installed.
pub fn default_registry() -> Registry {
    let mut registry = Registry::new();
    registry.register(Box::new(Jobs));
    registry.register(Box::new(Fg));
    registry.register(Box::new(Bg));
    registry.register(Box::new(Cd));
    registry.register(Box::new(Exit));
    registry
}

/// Resolve a `fg`/`bg` job argument (`%N`, `N`, or absent meaning the most
/// recent job) against the table.
fn resolve_job(arg: Option<&String>, table: &JobTable) -> Result<JobInfo, String> {
    match arg {
        None => table.last().ok_or_else(|| "no current job".to_string()),
        Some(raw) => {
            let digits = raw.strip_prefix('%').unwrap_or(raw);
            let id = digits
                .parse::<u32>()
                .map_err(|_| format!("invalid job spec `{raw}`"))?;
            table
                .get(JobId(id))
                .ok_or_else(|| format!("no such job `{raw}`"))
        }
    }
}

/// Handle a builtin name on the child side of a fork, inside a pipeline.
///
/// Returns the exit status to report, or `None` when the name is not a
/// builtin and the child should proceed to `execvp`. `cd` and `exit` run
/// for real (their effect is confined to the child, matching what a
/// subshell would do); the job-control builtins cannot run here — the
/// child's copy of the job table is frozen and the real one is unreachable.
pub fn run_forked(argv: &[String]) -> Option<i32> {
    match argv[0].as_str() {
        "cd" => {
            let result = cd::chdir(argv.get(1).map(String::as_str));
            match result {
                Ok(()) => Some(0),
                Err(msg) => {
                    eprintln!("minish: {msg}");
                    Some(1)
                }
            }
        }
        "exit" => match exit::parse_code(argv.get(1).map(String::as_str)) {
            Ok(code) => Some(code),
            Err(msg) => {
                eprintln!("minish: {msg}");
                Some(2)
            }
        },
        "jobs" | "fg" | "bg" => {
            eprintln!("minish: {}: no job control in a pipeline", argv[0]);
            Some(1)
        }
        _ => None,
    }
}
