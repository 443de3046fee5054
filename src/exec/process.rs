// src/exec/process.rs

//! Single editor process runner.

use std::process::Stdio;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tracing::{debug, error, info, warn};

use crate::outcome::NO_EXIT_CODE;
use crate::types::Stage;

/// What came back from running a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessExit {
    pub code: i32,
    pub timed_out: bool,
}

impl ProcessExit {
    pub fn exited(code: i32) -> Self {
        Self {
            code,
            timed_out: false,
        }
    }

    pub fn timed_out() -> Self {
        Self {
            code: NO_EXIT_CODE,
            timed_out: true,
        }
    }
}

/// Run `argv` to completion and report its exit status.
///
/// Failures to spawn or wait are logged and reported as exit code `-1`; they
/// are stage failures, not errors of the runner.
pub async fn run_process(stage: Stage, argv: &[String], timeout: Option<Duration>) -> ProcessExit {
    match run_process_inner(stage, argv, timeout).await {
        Ok(exit) => exit,
        Err(err) => {
            error!(
                stage = %stage,
                error = %format!("{err:#}"),
                "stage process could not be run"
            );
            ProcessExit::exited(NO_EXIT_CODE)
        }
    }
}

async fn run_process_inner(
    stage: Stage,
    argv: &[String],
    timeout: Option<Duration>,
) -> Result<ProcessExit> {
    let (program, args) = argv
        .split_first()
        .with_context(|| format!("stage '{stage}' has an empty command"))?;

    info!(stage = %stage, program = %program, "starting stage process");

    let mut cmd = Command::new(program);
    cmd.args(args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    // Own process group: the editor usually runs under a wrapper such as
    // `xvfb-run`, and killing the wrapper alone leaves the editor holding the
    // project lock.
    #[cfg(unix)]
    cmd.process_group(0);

    let mut child = cmd
        .spawn()
        .with_context(|| format!("spawning '{program}' for stage '{stage}'"))?;

    // Kills whatever is left of the group when this future is dropped
    // (e.g. Ctrl-C) or returns.
    let mut group = ProcessGroup::of(stage, child.id());

    // Always consume output so pipe buffers never fill and block the editor.
    if let Some(stdout) = child.stdout.take() {
        drain_lines(stage, "stdout", stdout);
    }
    if let Some(stderr) = child.stderr.take() {
        drain_lines(stage, "stderr", stderr);
    }

    let status = match timeout {
        Some(limit) => match tokio::time::timeout(limit, child.wait()).await {
            Ok(status) => status,
            Err(_) => {
                warn!(
                    stage = %stage,
                    timeout_secs = limit.as_secs_f64(),
                    "stage process timed out; killing it"
                );
                group.kill();
                if let Err(e) = child.kill().await {
                    warn!(stage = %stage, error = %e, "failed to kill timed-out process");
                }
                return Ok(ProcessExit::timed_out());
            }
        },
        None => child.wait().await,
    }
    .with_context(|| format!("waiting for process of stage '{stage}'"))?;

    // Stray descendants must not outlive the stage.
    group.kill();

    let code = status.code().unwrap_or(NO_EXIT_CODE);
    info!(
        stage = %stage,
        exit_code = code,
        success = status.success(),
        "stage process exited"
    );

    Ok(ProcessExit::exited(code))
}

/// Process group of a spawned stage command, killed at most once.
struct ProcessGroup {
    stage: Stage,
    pgid: Option<u32>,
}

impl ProcessGroup {
    fn of(stage: Stage, leader: Option<u32>) -> Self {
        Self {
            stage,
            pgid: leader,
        }
    }

    /// SIGKILL every process still in the group.
    fn kill(&mut self) {
        let Some(pgid) = self.pgid.take() else {
            return;
        };
        if let Err(e) = kill_group(pgid) {
            warn!(stage = %self.stage, pgid, error = %e, "failed to kill process group");
        }
    }
}

impl Drop for ProcessGroup {
    fn drop(&mut self) {
        self.kill();
    }
}

#[cfg(unix)]
fn kill_group(pgid: u32) -> std::io::Result<()> {
    let pgid = libc::pid_t::try_from(pgid)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;

    // SAFETY: killpg only sends a signal; it has no memory-safety preconditions.
    let rc = unsafe { libc::killpg(pgid, libc::SIGKILL) };
    if rc == 0 {
        return Ok(());
    }

    let err = std::io::Error::last_os_error();
    // ESRCH: the group is already empty.
    if err.raw_os_error() == Some(libc::ESRCH) {
        Ok(())
    } else {
        Err(err)
    }
}

#[cfg(not(unix))]
fn kill_group(_pgid: u32) -> std::io::Result<()> {
    // No process groups; `kill_on_drop` covers the direct child.
    Ok(())
}

fn drain_lines<R>(stage: Stage, stream: &'static str, reader: R)
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut lines = BufReader::new(reader).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            debug!(stage = %stage, stream, "{}", line);
        }
    });
}
