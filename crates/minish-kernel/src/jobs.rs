//! Job table: the authoritative record of every launched process group.
//!
//! The table is shared between the shell's control thread and the signal
//! reconciler thread. All access funnels through one mutex held only for
//! short field updates; a condvar lets foreground waits block until the
//! reconciler settles the job they are watching. State transitions are
//! idempotent and keyed by member pid, so it does not matter which path
//! observes a change first.

use std::fmt;
use std::sync::{Condvar, Mutex, MutexGuard};

use nix::unistd::Pid;

/// Exit code reported for a job that stopped instead of exiting.
pub const STOPPED_EXIT_CODE: i32 = 148;

/// Unique identifier for a job. Monotonically assigned, never reused
/// within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JobId(pub u32);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle state of a job.
///
/// Transitions only along Running → {Stopped ⇄ Running} → Done; Done is
/// terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    /// At least one member process is running and none is stopped.
    Running,
    /// A member process was stopped by a signal.
    Stopped,
    /// Every member process has exited or been terminated.
    Done,
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobState::Running => write!(f, "Running"),
            JobState::Stopped => write!(f, "Stopped"),
            JobState::Done => write!(f, "Done"),
        }
    }
}

/// One observed state change for a member process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateChange {
    /// The process exited normally with this code.
    Exited(i32),
    /// The process was terminated by this signal number.
    Signaled(i32),
    /// The process was stopped.
    Stopped,
    /// The process was resumed.
    Continued,
}

/// Display snapshot of a job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobInfo {
    /// Job id.
    pub id: JobId,
    /// Process-group id (pid of the group's first process).
    pub pgid: Pid,
    /// Original command text.
    pub command: String,
    /// Whether the job currently runs in the background.
    pub background: bool,
    /// Current lifecycle state.
    pub state: JobState,
}

#[derive(Debug)]
struct Member {
    pid: Pid,
    exited: bool,
}

#[derive(Debug)]
struct Job {
    id: JobId,
    pgid: Pid,
    members: Vec<Member>,
    /// Pid of the last stage; its status becomes the pipeline's exit code.
    last_pid: Pid,
    command: String,
    background: bool,
    state: JobState,
    exit_code: Option<i32>,
}

impl Job {
    fn all_exited(&self) -> bool {
        self.members.iter().all(|m| m.exited)
    }

    fn info(&self) -> JobInfo {
        JobInfo {
            id: self.id,
            pgid: self.pgid,
            command: self.command.clone(),
            background: self.background,
            state: self.state,
        }
    }
}

fn record_exit(job: &mut Job, pid: Pid, code: i32) {
    if let Some(member) = job.members.iter_mut().find(|m| m.pid == pid) {
        member.exited = true;
    }
    if pid == job.last_pid && job.exit_code.is_none() {
        job.exit_code = Some(code);
    }
    if job.all_exited() {
        job.state = JobState::Done;
    }
}

#[derive(Debug, Default)]
struct Inner {
    next_id: u32,
    /// Insertion-ordered; `jobs` lists in launch order.
    jobs: Vec<Job>,
}

/// The live job table.
#[derive(Debug, Default)]
pub struct JobTable {
    inner: Mutex<Inner>,
    settled: Condvar,
}

impl JobTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    // A poisoned lock only means another thread panicked mid-update of a
    // plain field write; the data is still coherent, so keep going.
    fn locked(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Register a freshly launched process group as a Running job.
    ///
    /// `pids` are the group's members in stage order; the last one's exit
    /// status becomes the pipeline's exit code.
    pub fn register(&self, pgid: Pid, pids: &[Pid], command: &str, background: bool) -> JobId {
        let mut inner = self.locked();
        inner.next_id += 1;
        let id = JobId(inner.next_id);
        let last_pid = pids.last().copied().unwrap_or(pgid);
        inner.jobs.push(Job {
            id,
            pgid,
            members: pids.iter().map(|&pid| Member { pid, exited: false }).collect(),
            last_pid,
            command: command.to_string(),
            background,
            state: JobState::Running,
            exit_code: None,
        });
        tracing::debug!(%id, %pgid, command, background, "registered job");
        id
    }

    /// Apply one observed state change for a member process.
    ///
    /// Idempotent: a change for an unknown pid, or one that would move a Done
    /// job, is a no-op. Wakes any foreground waiter when the owning job
    /// settles.
    pub fn apply(&self, pid: Pid, change: StateChange) {
        let mut inner = self.locked();
        let Some(job) = inner
            .jobs
            .iter_mut()
            .find(|j| j.members.iter().any(|m| m.pid == pid))
        else {
            return;
        };

        match change {
            StateChange::Exited(code) => record_exit(job, pid, code),
            StateChange::Signaled(sig) => record_exit(job, pid, 128 + sig),
            StateChange::Stopped => {
                if job.state == JobState::Running {
                    job.state = JobState::Stopped;
                }
            }
            StateChange::Continued => {
                if job.state == JobState::Stopped {
                    job.state = JobState::Running;
                }
            }
        }
        tracing::trace!(id = %job.id, ?change, state = %job.state, "applied state change");
        drop(inner);
        self.settled.notify_all();
    }

    /// Pids of every member not yet observed exited, across all jobs.
    pub fn live_pids(&self) -> Vec<Pid> {
        self.locked()
            .jobs
            .iter()
            .flat_map(|j| j.members.iter())
            .filter(|m| !m.exited)
            .map(|m| m.pid)
            .collect()
    }

    /// Block until the job is Stopped or Done, returning the final state and
    /// the exit code to report.
    ///
    /// The caller must own the terminal handoff around this; the wait itself
    /// never touches the terminal. A job missing from the table counts as
    /// Done (it was pruned after finishing).
    pub fn wait_foreground(&self, id: JobId) -> (JobState, i32) {
        let mut inner = self.locked();
        loop {
            let Some(job) = inner.jobs.iter().find(|j| j.id == id) else {
                return (JobState::Done, 0);
            };
            match job.state {
                JobState::Stopped => return (JobState::Stopped, STOPPED_EXIT_CODE),
                JobState::Done => return (JobState::Done, job.exit_code.unwrap_or(0)),
                JobState::Running => {
                    inner = self
                        .settled
                        .wait(inner)
                        .unwrap_or_else(|e| e.into_inner());
                }
            }
        }
    }

    /// Snapshot every job in launch order.
    pub fn list(&self) -> Vec<JobInfo> {
        self.locked().jobs.iter().map(Job::info).collect()
    }

    /// Snapshot a single job.
    pub fn get(&self, id: JobId) -> Option<JobInfo> {
        self.locked().jobs.iter().find(|j| j.id == id).map(Job::info)
    }

    /// The most recently registered job.
    pub fn last(&self) -> Option<JobInfo> {
        self.locked().jobs.last().map(Job::info)
    }

    /// Flip a job's background flag. Returns false if the job is unknown.
    pub fn set_background(&self, id: JobId, background: bool) -> bool {
        let mut inner = self.locked();
        match inner.jobs.iter_mut().find(|j| j.id == id) {
            Some(job) => {
                job.background = background;
                true
            }
            None => false,
        }
    }

    /// Mark a Stopped job Running again (ahead of delivering SIGCONT).
    pub fn mark_running(&self, id: JobId) {
        let mut inner = self.locked();
        if let Some(job) = inner.jobs.iter_mut().find(|j| j.id == id)
            && job.state == JobState::Stopped
        {
            job.state = JobState::Running;
        }
    }

    /// Remove a job outright (used after a foreground job completes).
    pub fn remove(&self, id: JobId) {
        self.locked().jobs.retain(|j| j.id != id);
    }

    /// Drop every Done job.
    pub fn prune(&self) {
        self.locked().jobs.retain(|j| j.state != JobState::Done);
    }

    /// Drain and return every Done job, for the REPL's "why did that finish"
    /// report ahead of each prompt.
    pub fn take_finished(&self) -> Vec<JobInfo> {
        let mut inner = self.locked();
        let mut finished = Vec::new();
        inner.jobs.retain(|j| {
            if j.state == JobState::Done {
                finished.push(j.info());
                false
            } else {
                true
            }
        });
        finished
    }
}
