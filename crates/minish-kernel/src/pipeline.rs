//! Pipeline launcher: parsed stages to a running process group.
//!
//! For an N-stage pipeline the launcher allocates N−1 pipes up front, forks
//! one process per stage, and makes the first child's pid the group id for
//! the whole pipeline. Both sides call `setpgid` so group membership never
//! depends on who wins the fork race. Each child wires its pipe ends and
//! redirections onto stdin/stdout, restores default signal dispositions,
//! closes every remaining pipe descriptor, and execs — a leaked pipe write
//! end would keep downstream readers from ever seeing end-of-file.
//!
//! The parent closes its pipe descriptors, registers the job, and for
//! foreground pipelines performs the terminal round-trip: hand the terminal
//! to the group, block until the job settles, reclaim the terminal
//! unconditionally, then interpret the outcome.

use std::ffi::CString;
use std::fs::{File, OpenOptions};
use std::io;
use std::os::fd::{AsRawFd, IntoRawFd, OwnedFd, RawFd};
use std::process;
use std::sync::Arc;

use nix::errno::Errno;
use nix::sys::signal::{SigHandler, Signal, signal};
use nix::unistd::{ForkResult, Pid, close, dup2, execvp, fork, getpid, pipe, setpgid, tcsetpgrp};

use crate::ast::{CommandStage, Pipeline};
use crate::builtins;
use crate::error::ShellError;
use crate::jobs::{JobState, JobTable};
use crate::result::ExecResult;
use crate::signals;
use crate::terminal::Terminal;

/// Launches pipelines and manages their foreground lifecycle.
pub struct Launcher {
    table: Arc<JobTable>,
    terminal: Arc<Terminal>,
}

impl Launcher {
    pub fn new(table: Arc<JobTable>, terminal: Arc<Terminal>) -> Self {
        Self { table, terminal }
    }

    /// Launch a parsed pipeline.
    ///
    /// Registers the job and, for foreground pipelines, blocks until it is
    /// Done or Stopped. Background pipelines return immediately with the
    /// `[id] pgid` announcement in `out`.
    pub fn launch(&self, pipeline: &Pipeline, line: &str) -> Result<ExecResult, ShellError> {
        let stages = &pipeline.stages;
        if stages.is_empty() {
            return Ok(ExecResult::success(""));
        }
        let count = stages.len();
        let claim_terminal = !pipeline.background && self.terminal.is_interactive();

        let mut pipes: Vec<(OwnedFd, OwnedFd)> = Vec::with_capacity(count - 1);
        for _ in 1..count {
            pipes.push(pipe().map_err(ShellError::Pipe)?);
        }

        let mut pgid: Option<Pid> = None;
        let mut pids: Vec<Pid> = Vec::with_capacity(count);
        let mut fork_error: Option<Errno> = None;

        for (index, stage) in stages.iter().enumerate() {
            match unsafe { fork() } {
                Err(e) => {
                    fork_error = Some(e);
                    break;
                }
                Ok(ForkResult::Child) => {
                    exec_stage(stage, index, count, &pipes, pgid, claim_terminal)
                }
                Ok(ForkResult::Parent { child }) => {
                    let gid = *pgid.get_or_insert(child);
                    // Child makes the same call on itself; whichever side
                    // loses the race fails harmlessly.
                    let _ = setpgid(child, gid);
                    pids.push(child);
                }
            }
        }

        // Closes every parent-side pipe descriptor; the children hold their
        // own dup'ed copies.
        drop(pipes);

        if pids.is_empty() {
            return Err(ShellError::Fork(fork_error.unwrap_or(Errno::EAGAIN)));
        }
        let pgid = pids[0];
        let id = self
            .table
            .register(pgid, &pids, line, pipeline.background);
        // Pick up any state change that raced registration; from here on the
        // reconciler thread sees these pids.
        signals::reconcile(&self.table);

        if let Some(errno) = fork_error {
            tracing::warn!(%id, %errno, started = pids.len(), wanted = count, "pipeline partially launched");
            return Ok(ExecResult::failure(
                1,
                format!(
                    "minish: fork failed after {} of {} stages ({errno}); \
                     partial pipeline left running as job [{id}]",
                    pids.len(),
                    count
                ),
            ));
        }

        if pipeline.background {
            return Ok(ExecResult::success(format!("[{id}] {pgid}\n")));
        }

        self.terminal.give_to(pgid)?;
        let (state, code) = self.table.wait_foreground(id);
        // Unconditionally, before interpreting the outcome: a stopped group
        // must not keep the terminal.
        self.terminal.reclaim()?;

        match state {
            JobState::Stopped => Ok(ExecResult::from_output(
                code,
                "",
                format!("\n[{id}]+ Stopped\t{line}\n"),
            )),
            _ => {
                self.table.remove(id);
                Ok(ExecResult::from_output(code, "", ""))
            }
        }
    }
}

/// Child-side setup and exec for one stage. Never returns.
fn exec_stage(
    stage: &CommandStage,
    index: usize,
    count: usize,
    pipes: &[(OwnedFd, OwnedFd)],
    pgid: Option<Pid>,
    claim_terminal: bool,
) -> ! {
    let pid = getpid();
    let pgid = pgid.unwrap_or(pid);
    let _ = setpgid(pid, pgid);
    if claim_terminal {
        // Every stage of a foreground pipeline tries; after the first the
        // call is an idempotent no-op.
        let _ = tcsetpgrp(io::stdin(), pgid);
    }
    restore_default_dispositions();

    if index > 0 {
        dup_onto(pipes[index - 1].0.as_raw_fd(), 0);
    }
    if index + 1 < count {
        dup_onto(pipes[index].1.as_raw_fd(), 1);
    }

    // Explicit redirections apply only at the pipeline's endpoints.
    if index == 0
        && let Some(path) = &stage.input
    {
        match File::open(path) {
            Ok(file) => dup_onto(file.into_raw_fd(), 0),
            Err(e) => fail_stage(&format!("minish: {}: {e}", path.display())),
        }
    }
    if index + 1 == count
        && let Some(redirect) = &stage.output
    {
        let mut opts = OpenOptions::new();
        opts.write(true).create(true);
        if redirect.append {
            opts.append(true);
        } else {
            opts.truncate(true);
        }
        match opts.open(&redirect.path) {
            Ok(file) => dup_onto(file.into_raw_fd(), 1),
            Err(e) => fail_stage(&format!("minish: {}: {e}", redirect.path.display())),
        }
    }

    for (read_end, write_end) in pipes {
        let _ = close(read_end.as_raw_fd());
        let _ = close(write_end.as_raw_fd());
    }

    // A stage with no program name is a no-op that has already created its
    // redirection targets.
    if stage.argv.is_empty() {
        process::exit(0);
    }

    if let Some(code) = builtins::run_forked(&stage.argv) {
        process::exit(code);
    }

    let program = stage.argv[0].clone();
    let cargv: Vec<CString> = match stage
        .argv
        .iter()
        .map(|arg| CString::new(arg.as_str()))
        .collect()
    {
        Ok(v) => v,
        Err(_) => fail_stage(&format!("minish: {program}: argument contains NUL")),
    };

    // execvp searches PATH and only returns on failure.
    let err = match execvp(&cargv[0], &cargv) {
        Err(e) => e,
        Ok(never) => match never {},
    };
    match err {
        Errno::ENOENT => {
            eprintln!("minish: {program}: command not found");
            process::exit(127);
        }
        e => {
            eprintln!("minish: {program}: {e}");
            process::exit(126);
        }
    }
}

/// Reset the dispositions the shell customizes so the exec'd program starts
/// from defaults. SIGTTOU/SIGTTIN are included because ignored dispositions
/// survive exec.
fn restore_default_dispositions() {
    for sig in [
        Signal::SIGINT,
        Signal::SIGTSTP,
        Signal::SIGCHLD,
        Signal::SIGTTOU,
        Signal::SIGTTIN,
    ] {
        let _ = unsafe { signal(sig, SigHandler::SigDfl) };
    }
}

fn dup_onto(src: RawFd, dst: RawFd) {
    if src == dst {
        return;
    }
    if let Err(e) = dup2(src, dst) {
        fail_stage(&format!("minish: dup2 failed: {e}"));
    }
}

/// Report a child-side setup failure and terminate the stage. Siblings in
/// the pipeline are unaffected; a downstream reader simply sees end-of-file.
fn fail_stage(msg: &str) -> ! {
    eprintln!("{msg}");
    process::exit(1);
}
