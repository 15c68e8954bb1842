//! `jobs` — list the job table.

use super::{Builtin, BuiltinContext};
use crate::jobs::JobInfo;
use crate::result::ExecResult;

pub struct Jobs;

impl Builtin for Jobs {
    fn name(&self) -> &'static str {
        "jobs"
    }

    fn description(&self) -> &'static str {
        "List jobs and their states"
    }

    fn run(&self, _argv: &[String], ctx: &mut BuiltinContext<'_>) -> ExecResult {
        let out = render(&ctx.table.list());
        // Done jobs have now been reported; drop them.
        ctx.table.prune();
        ExecResult::success(out)
    }
}

fn render(jobs: &[JobInfo]) -> String {
    let mut out = String::new();
    for job in jobs {
        out.push_str(&format!(
            "[{}] {}\t{} (pgid={})\n",
            job.id, job.state, job.command, job.pgid
        ));
    }
    out
}
