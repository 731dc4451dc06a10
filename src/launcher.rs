use crate::command::ParsedCommand;
use crate::error::UninstallError;
use std::process::{Child, Command};
use std::time::{Duration, Instant};

/// How long to wait for the spawned uninstaller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitPolicy {
    Indefinite,
    /// Stop waiting after the duration. The process keeps running.
    Bounded(Duration),
}

impl WaitPolicy {
    /// A missing or zero timeout waits until the process exits.
    pub fn from_timeout(timeout: Option<Duration>) -> Self {
        match timeout {
            Some(d) if !d.is_zero() => WaitPolicy::Bounded(d),
            _ => WaitPolicy::Indefinite,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// Exit code of the process; `None` when it was ended by a signal.
    Exited(Option<i32>),
    TimedOut,
}

/// Build the [`Command`] for `parsed` without spawning it.
pub fn command_for(parsed: &ParsedCommand) -> Command {
    let mut command = Command::new(parsed.program());
    if parsed.has_args() {
        add_args(&mut command, &parsed.args);
    }
    command
}

#[cfg(target_os = "windows")]
fn add_args(command: &mut Command, args: &str) {
    use std::os::windows::process::CommandExt;
    // The tail is already a Windows command line; pass it through untouched.
    command.raw_arg(args);
}

#[cfg(not(target_os = "windows"))]
fn add_args(command: &mut Command, args: &str) {
    let args = args.trim();
    if args.is_empty() {
        return;
    }
    if let Some(list) = shlex::split(args) {
        command.args(list);
    } else {
        command.args(args.split_whitespace());
    }
}

pub fn launch(parsed: &ParsedCommand) -> Result<Child, UninstallError> {
    command_for(parsed)
        .spawn()
        .map_err(|source| UninstallError::Launch {
            program: parsed.executable.clone(),
            source,
        })
}

/// Wait for `child` according to `policy`. A bounded wait polls every
/// `poll_interval` and never kills the child.
pub fn wait(
    child: &mut Child,
    policy: WaitPolicy,
    poll_interval: Duration,
) -> Result<WaitOutcome, UninstallError> {
    let pid = child.id();
    let lost = |source| UninstallError::Wait { pid, source };

    let limit = match policy {
        WaitPolicy::Indefinite => {
            let status = child.wait().map_err(lost)?;
            return Ok(WaitOutcome::Exited(status.code()));
        }
        WaitPolicy::Bounded(limit) => limit,
    };

    let deadline = Instant::now() + limit;
    loop {
        if let Some(status) = child.try_wait().map_err(lost)? {
            return Ok(WaitOutcome::Exited(status.code()));
        }
        let now = Instant::now();
        if now >= deadline {
            tracing::debug!(pid, "stopped waiting; process left running");
            return Ok(WaitOutcome::TimedOut);
        }
        std::thread::sleep(poll_interval.min(deadline - now));
    }
}
