//! `fg` — resume a job in the foreground.

use nix::sys::signal::{Signal, killpg};

use super::{Builtin, BuiltinContext, resolve_job};
use crate::jobs::JobState;
use crate::result::ExecResult;

pub struct Fg;

impl Builtin for Fg {
    fn name(&self) -> &'static str {
        "fg"
    }

    fn description(&self) -> &'static str {
        "Resume a job in the foreground (fg [%N])"
    }

    fn run(&self, argv: &[String], ctx: &mut BuiltinContext<'_>) -> ExecResult {
        let job = match resolve_job(argv.get(1), ctx.table.as_ref()) {
            Ok(job) => job,
            Err(msg) => return ExecResult::failure(1, format!("minish: fg: {msg}")),
        };

        // Echoed through the result so front ends control the ordering.
        let echo = format!("{}\n", job.command);

        ctx.table.set_background(job.id, false);
        ctx.table.mark_running(job.id);

        if let Err(e) = ctx.terminal.give_to(job.pgid) {
            return ExecResult::failure(1, format!("minish: fg: {e}"));
        }
        if let Err(e) = killpg(job.pgid, Signal::SIGCONT) {
            let _ = ctx.terminal.reclaim();
            return ExecResult::failure(1, format!("minish: fg: cannot resume: {e}"));
        }

        let (state, code) = ctx.table.wait_foreground(job.id);
        if let Err(e) = ctx.terminal.reclaim() {
            return ExecResult::failure(1, format!("minish: fg: {e}"));
        }

        match state {
            JobState::Stopped => ExecResult::from_output(
                code,
                echo,
                format!("\n[{}]+ Stopped\t{}\n", job.id, job.command),
            ),
            _ => {
                ctx.table.remove(job.id);
                ExecResult::from_output(code, echo, "")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::JobTable;
    use crate::terminal::Terminal;
    use std::sync::Arc;

    #[test]
    fn unknown_job_reports_an_error() {
        let table = Arc::new(JobTable::new());
        let terminal = Arc::new(Terminal::new().unwrap());
        let mut exit_request = None;
        let mut ctx = BuiltinContext {
            table: &table,
            terminal: &terminal,
            exit_request: &mut exit_request,
        };

        let result = Fg.run(&["fg".to_string(), "%9".to_string()], &mut ctx);
        assert_eq!(result.code, 1);
        assert!(result.err.contains("no such job"));
    }
}
