//! Process-level tests: real forks, real pipes, real signals.
//!
//! Each test builds its own `Shell`; the job tables only ever wait on their
//! own children, so the tests can run in parallel inside one binary.

use std::fs;
use std::time::{Duration, Instant};

use nix::sys::signal::{Signal, killpg};
use tempfile::tempdir;

use minish_kernel::{JobState, Shell};

/// Poll until `pred` holds or five seconds pass.
fn eventually(mut pred: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if pred() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    false
}

#[test]
fn pipeline_with_output_redirect() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("count.txt");
    let mut shell = Shell::new().unwrap();

    let result = shell.execute(&format!("echo hello | wc -c > {}", out.display()));
    assert_eq!(result.code, 0, "stderr: {}", result.err);
    assert_eq!(fs::read_to_string(&out).unwrap().trim(), "6");
    assert!(shell.jobs().is_empty(), "foreground job should be removed");
}

#[test]
fn append_redirect_preserves_existing_content() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("log.txt");
    let mut shell = Shell::new().unwrap();

    shell.execute(&format!("echo one > {}", out.display()));
    shell.execute(&format!("echo two >> {}", out.display()));
    assert_eq!(fs::read_to_string(&out).unwrap(), "one\ntwo\n");

    shell.execute(&format!("echo three > {}", out.display()));
    assert_eq!(fs::read_to_string(&out).unwrap(), "three\n");
}

#[test]
fn input_redirect_feeds_the_first_stage() {
    let dir = tempdir().unwrap();
    let src = dir.path().join("words.txt");
    let out = dir.path().join("count.txt");
    fs::write(&src, "alpha\nbeta\ngamma\n").unwrap();
    let mut shell = Shell::new().unwrap();

    let result = shell.execute(&format!("wc -l < {} > {}", src.display(), out.display()));
    assert_eq!(result.code, 0, "stderr: {}", result.err);
    assert_eq!(fs::read_to_string(&out).unwrap().trim(), "3");
}

#[test]
fn missing_input_file_fails_the_stage() {
    let mut shell = Shell::new().unwrap();
    let result = shell.execute("cat < /no/such/file/anywhere");
    assert_ne!(result.code, 0);
}

#[test]
fn unknown_command_exits_127() {
    let mut shell = Shell::new().unwrap();
    let result = shell.execute("definitely-not-a-real-command-xyz");
    assert_eq!(result.code, 127);
}

#[test]
fn exit_code_comes_from_the_last_stage() {
    let mut shell = Shell::new().unwrap();
    assert_eq!(shell.execute("sh -c 'exit 3'").code, 3);
    // A failing early stage does not mask a succeeding last stage.
    assert_eq!(shell.execute("sh -c 'exit 3' | cat").code, 0);
}

#[test]
fn background_job_returns_immediately_and_is_tracked() {
    let mut shell = Shell::new().unwrap();

    let start = Instant::now();
    let result = shell.execute("sleep 5 &");
    assert!(start.elapsed() < Duration::from_secs(1));
    assert_eq!(result.code, 0);

    let jobs = shell.jobs();
    assert_eq!(jobs.len(), 1);
    let job = &jobs[0];
    assert_eq!(job.state, JobState::Running);
    assert!(job.background);
    // Announcement format: "[id] pgid".
    assert_eq!(result.out, format!("[{}] {}\n", job.id, job.pgid));

    killpg(job.pgid, Signal::SIGKILL).unwrap();
    assert!(eventually(|| !shell.take_finished().is_empty()));
    assert!(shell.jobs().is_empty());
}

#[test]
fn stopped_job_resumes_via_bg() {
    let mut shell = Shell::new().unwrap();
    shell.execute("sleep 5 &");
    let job = shell.jobs().pop().unwrap();

    killpg(job.pgid, Signal::SIGSTOP).unwrap();
    assert!(eventually(|| {
        shell.jobs().first().map(|j| j.state) == Some(JobState::Stopped)
    }));

    let result = shell.execute(&format!("bg %{}", job.id));
    assert_eq!(result.code, 0);
    assert_eq!(result.out, format!("[{}] {} &\n", job.id, job.command));
    assert!(eventually(|| {
        shell.jobs().first().map(|j| j.state) == Some(JobState::Running)
    }));

    killpg(job.pgid, Signal::SIGTERM).unwrap();
    assert!(eventually(|| !shell.take_finished().is_empty()));
}

#[test]
fn fg_waits_for_a_background_job() {
    let mut shell = Shell::new().unwrap();
    shell.execute("sleep 0.3 &");
    assert_eq!(shell.jobs().len(), 1);

    let result = shell.execute("fg");
    assert_eq!(result.code, 0, "stderr: {}", result.err);
    // The resumed command is echoed through the result, not printed raw.
    assert_eq!(result.out, "sleep 0.3 &\n");
    assert!(shell.jobs().is_empty());
}

#[test]
fn fg_resumes_a_stopped_job_to_completion() {
    let mut shell = Shell::new().unwrap();
    shell.execute("sleep 0.3 &");
    let job = shell.jobs().pop().unwrap();

    killpg(job.pgid, Signal::SIGSTOP).unwrap();
    assert!(eventually(|| {
        shell.jobs().first().map(|j| j.state) == Some(JobState::Stopped)
    }));

    // fg must flip the job back to Running and deliver SIGCONT before it
    // waits, or this blocks forever on a stopped sleep.
    let result = shell.execute(&format!("fg %{}", job.id));
    assert_eq!(result.code, 0, "stderr: {}", result.err);
    assert_eq!(result.out, format!("{}\n", job.command));
    assert!(shell.jobs().is_empty());
}

#[test]
fn jobs_builtin_lists_and_prunes() {
    let mut shell = Shell::new().unwrap();
    shell.execute("sleep 5 &");
    let job = shell.jobs().pop().unwrap();

    let listing = shell.execute("jobs");
    assert_eq!(
        listing.out,
        format!("[{}] Running\t{} (pgid={})\n", job.id, job.command, job.pgid)
    );

    killpg(job.pgid, Signal::SIGKILL).unwrap();
    assert!(eventually(|| shell
        .jobs()
        .first()
        .map(|j| j.state)
        == Some(JobState::Done)));

    // The Done job is reported once, then pruned.
    let listing = shell.execute("jobs");
    assert!(listing.out.contains("Done"));
    assert_eq!(shell.execute("jobs").out, "");
}

#[test]
fn pipeline_members_all_counted_before_done() {
    let mut shell = Shell::new().unwrap();
    shell.execute("sleep 0.2 | sleep 0.4 &");
    let job = shell.jobs().pop().unwrap();
    assert_eq!(job.state, JobState::Running);

    // After the first stage exits the job must still be Running.
    std::thread::sleep(Duration::from_millis(300));
    assert_eq!(shell.jobs().pop().unwrap().state, JobState::Running);

    assert!(eventually(|| !shell.take_finished().is_empty()));
}

#[test]
fn cd_changes_the_shell_directory_for_later_commands() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("where.txt");
    let mut shell = Shell::new().unwrap();

    let canonical = dir.path().canonicalize().unwrap();
    assert_eq!(shell.execute(&format!("cd {}", dir.path().display())).code, 0);
    shell.execute(&format!("pwd > {}", out.display()));
    assert_eq!(
        fs::read_to_string(&out).unwrap().trim(),
        canonical.display().to_string()
    );
}

#[test]
fn job_control_builtins_refuse_to_run_in_a_pipeline() {
    let mut shell = Shell::new().unwrap();
    // The pipeline's code is the last stage's, so put the builtin last.
    let result = shell.execute("echo hi | jobs");
    assert_ne!(result.code, 0);
}
