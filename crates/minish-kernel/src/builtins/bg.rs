//! `bg` — resume a stopped job in the background.

use nix::sys::signal::{Signal, killpg};

use super::{Builtin, BuiltinContext, resolve_job};
use crate::result::ExecResult;

pub struct Bg;

impl Builtin for Bg {
    fn name(&self) -> &'static str {
        "bg"
    }

    fn description(&self) -> &'static str {
        "Resume a stopped job in the background (bg [%N])"
    }

    fn run(&self, argv: &[String], ctx: &mut BuiltinContext<'_>) -> ExecResult {
        let job = match resolve_job(argv.get(1), ctx.table.as_ref()) {
            Ok(job) => job,
            Err(msg) => return ExecResult::failure(1, format!("minish: bg: {msg}")),
        };

        ctx.table.set_background(job.id, true);
        ctx.table.mark_running(job.id);
        if let Err(e) = killpg(job.pgid, Signal::SIGCONT) {
            return ExecResult::failure(1, format!("minish: bg: cannot resume: {e}"));
        }

        // The terminal stays with the shell; the job runs unattended.
        ExecResult::success(format!("[{}] {} &\n", job.id, job.command))
    }
}
