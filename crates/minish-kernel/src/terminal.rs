//! Controlling-terminal ownership.
//!
//! The terminal driver itself tracks which process group owns the terminal;
//! this type only caches the shell's own group id so ownership can be
//! reclaimed after a foreground job stops or finishes. The ordering contract
//! is the whole point: `give_to` before the blocking wait, `reclaim`
//! immediately after the wait returns — even when it returned because the
//! job stopped. A missed reclaim leaves the terminal owned by a stopped
//! group and freezes shell input.

use std::io::{self, IsTerminal};

use nix::errno::Errno;
use nix::sys::signal::{SigHandler, Signal, signal};
use nix::unistd::{Pid, getpid, setpgid, tcgetpgrp, tcsetpgrp};

use crate::error::ShellError;

/// Handle on the shell's controlling terminal.
///
/// When stdin is not a terminal (tests, `-c` one-shots, piped input) every
/// handoff is a no-op; process groups are still created and tracked.
#[derive(Debug)]
pub struct Terminal {
    shell_pgid: Pid,
    interactive: bool,
}

impl Terminal {
    /// Fix the shell's own process group and, when interactive, take
    /// ownership of the terminal. Called exactly once at startup.
    pub fn new() -> Result<Self, ShellError> {
        let shell_pgid = getpid();
        let interactive = io::stdin().is_terminal();

        if interactive {
            // The shell writes to the terminal and calls tcsetpgrp from what
            // may briefly be a non-foreground group; without these it would
            // stop itself.
            unsafe {
                signal(Signal::SIGTTOU, SigHandler::SigIgn).map_err(ShellError::Init)?;
                signal(Signal::SIGTTIN, SigHandler::SigIgn).map_err(ShellError::Init)?;
            }

            // EPERM means we are already a session leader (login shell).
            if let Err(e) = setpgid(shell_pgid, shell_pgid)
                && e != Errno::EPERM
            {
                return Err(ShellError::Init(e));
            }
            tcsetpgrp(io::stdin(), shell_pgid).map_err(ShellError::Init)?;
        }

        Ok(Self {
            shell_pgid,
            interactive,
        })
    }

    /// The shell's own process group id, fixed at startup.
    pub fn shell_pgid(&self) -> Pid {
        self.shell_pgid
    }

    /// True when stdin is a terminal and handoffs are real.
    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    /// Make `pgid` the terminal's foreground process group.
    pub fn give_to(&self, pgid: Pid) -> Result<(), ShellError> {
        if !self.interactive {
            return Ok(());
        }
        tcsetpgrp(io::stdin(), pgid).map_err(ShellError::Terminal)
    }

    /// Return the terminal to the shell's own group.
    pub fn reclaim(&self) -> Result<(), ShellError> {
        self.give_to(self.shell_pgid)
    }

    /// The group that currently owns the terminal, if any.
    pub fn foreground_pgid(&self) -> Option<Pid> {
        if !self.interactive {
            return None;
        }
        tcgetpgrp(io::stdin()).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // The test harness runs without a tty on stdin, so these exercise the
    // non-interactive no-op paths.

    #[test]
    fn non_interactive_handoffs_are_noops() {
        let term = Terminal::new().unwrap();
        assert!(!term.is_interactive());
        assert!(term.give_to(Pid::from_raw(424242)).is_ok());
        assert!(term.reclaim().is_ok());
        assert_eq!(term.foreground_pgid(), None);
    }

    #[test]
    fn shell_pgid_is_this_process() {
        let term = Terminal::new().unwrap();
        assert_eq!(term.shell_pgid(), getpid());
    }
}
