//! Signal reconciliation and keyboard-signal forwarding.
//!
//! A dedicated thread consumes SIGCHLD, SIGINT, and SIGTSTP through a
//! signal-hook iterator. Because it is an ordinary thread (not an
//! async-signal handler) it may take the job-table lock; it still never
//! blocks: child state is collected with `WNOHANG` and applied as short
//! idempotent updates, then the thread goes back to waiting for signals.
//!
//! Keyboard signals arriving while a job owns the terminal are forwarded to
//! that group; the shell's own process is never interrupted or stopped by
//! its delivered-signal policy.

use std::sync::Arc;
use std::thread;

use nix::sys::signal::{Signal, killpg};
use nix::sys::wait::{WaitPidFlag, WaitStatus, waitpid};
use signal_hook::consts::signal::{SIGCHLD, SIGINT, SIGTSTP};
use signal_hook::iterator::Signals;

use crate::error::ShellError;
use crate::jobs::{JobTable, StateChange};
use crate::terminal::Terminal;

/// Install the reconciler thread. Called once at shell startup.
pub fn spawn_reconciler(table: Arc<JobTable>, terminal: Arc<Terminal>) -> Result<(), ShellError> {
    let mut signals = Signals::new([SIGCHLD, SIGINT, SIGTSTP])?;
    thread::Builder::new()
        .name("minish-signals".into())
        .spawn(move || {
            for sig in signals.forever() {
                match sig {
                    SIGCHLD => reconcile(&table),
                    SIGINT | SIGTSTP => forward_to_foreground(&terminal, sig),
                    _ => {}
                }
            }
        })?;
    Ok(())
}

/// Collect every pending state change for tracked children and push the
/// transitions into the job table.
///
/// Only pids known to the table are waited on, so an embedding process's
/// unrelated children are never reaped from here. Signal delivery coalesces,
/// so one pass per notification is not enough; passes repeat until one makes
/// no progress. Also called synchronously from the launcher right after
/// registering a job, to pick up a state change that raced registration.
pub fn reconcile(table: &JobTable) {
    let flags = WaitPidFlag::WNOHANG | WaitPidFlag::WUNTRACED | WaitPidFlag::WCONTINUED;
    loop {
        let pids = table.live_pids();
        if pids.is_empty() {
            return;
        }

        let mut progressed = false;
        for pid in pids {
            match waitpid(pid, Some(flags)) {
                Ok(WaitStatus::Exited(p, code)) => {
                    table.apply(p, StateChange::Exited(code));
                    progressed = true;
                }
                Ok(WaitStatus::Signaled(p, sig, _)) => {
                    table.apply(p, StateChange::Signaled(sig as i32));
                    progressed = true;
                }
                Ok(WaitStatus::Stopped(p, _)) => {
                    table.apply(p, StateChange::Stopped);
                    progressed = true;
                }
                Ok(WaitStatus::Continued(p)) => {
                    table.apply(p, StateChange::Continued);
                    progressed = true;
                }
                // StillAlive: nothing pending for this pid.
                Ok(_) => {}
                // ECHILD: the other reconciliation path won the race and
                // already recorded this pid's transition.
                Err(_) => {}
            }
        }
        if !progressed {
            return;
        }
    }
}

/// Forward a keyboard signal to the terminal's current foreground group,
/// unless that group is the shell's own.
fn forward_to_foreground(terminal: &Terminal, raw: i32) {
    let Some(fg) = terminal.foreground_pgid() else {
        return;
    };
    if fg == terminal.shell_pgid() {
        return;
    }
    let Ok(sig) = Signal::try_from(raw) else {
        return;
    };
    tracing::debug!(%fg, signal = raw, "forwarding keyboard signal");
    let _ = killpg(fg, sig);
}

#[cfg(test)]
mod tests {
    use super::*;
    use nix::unistd::Pid;

    #[test]
    fn reconcile_with_no_jobs_returns_immediately() {
        let table = JobTable::new();
        reconcile(&table);
        assert!(table.list().is_empty());
    }

    #[test]
    fn reconcile_ignores_untracked_fake_pids() {
        // A pid that is not our child: waitpid fails with ECHILD and the
        // table entry is left alone.
        let table = JobTable::new();
        let ghost = Pid::from_raw(1);
        table.register(ghost, &[ghost], "ghost", true);
        reconcile(&table);
        assert_eq!(table.list().len(), 1);
    }
}
