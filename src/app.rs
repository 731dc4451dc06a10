//! Ties lookup, splitting and launching together and emits the diagnostic
//! trail for one uninstall run.

use crate::cli::Invocation;
use crate::command::{self, ParsedCommand};
use crate::error::UninstallError;
use crate::launcher::{self, WaitOutcome, WaitPolicy};
use crate::registry::{Inventory, RegistryRoot, Resolver, REGISTRY_ROOTS};
use crate::settings::Settings;
use std::error::Error as _;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub command: ParsedCommand,
    pub pid: u32,
    pub outcome: WaitOutcome,
}

/// Run against the default uninstall roots.
pub fn run<I: Inventory>(
    invocation: &Invocation,
    inventory: I,
    settings: &Settings,
) -> Result<RunReport, UninstallError> {
    run_with_roots(invocation, &REGISTRY_ROOTS, inventory, settings)
}

pub fn run_with_roots<I: Inventory>(
    invocation: &Invocation,
    roots: &[RegistryRoot],
    inventory: I,
    settings: &Settings,
) -> Result<RunReport, UninstallError> {
    let program = invocation.program.as_str();
    tracing::info!("Uninstalling {program}.");

    let raw = Resolver::new(roots, inventory).resolve(program)?;
    if raw.is_empty() {
        tracing::warn!("No installed program matches \"{program}\".");
    }
    let command = command::parse(&raw)?;

    let mut child = launcher::launch(&command)?;
    let pid = child.id();
    tracing::info!("{command}");
    tracing::info!("Spawned process id {pid} for \"{program}\".");

    let policy = WaitPolicy::from_timeout(invocation.timeout);
    if let WaitPolicy::Bounded(limit) = policy {
        tracing::info!("Timeout: {} seconds.", limit.as_secs());
    }
    let outcome = launcher::wait(&mut child, policy, settings.poll_interval())?;
    match outcome {
        WaitOutcome::Exited(code) => tracing::debug!(pid, ?code, "uninstaller exited"),
        WaitOutcome::TimedOut => tracing::info!(pid, "uninstaller still running after timeout"),
    }
    tracing::info!("Finished uninstall process for \"{program}\".");

    Ok(RunReport {
        command,
        pid,
        outcome,
    })
}

/// Log `err` with its full cause chain.
pub fn report(err: &UninstallError) {
    if let UninstallError::Usage { detail } = err {
        if !detail.is_empty() {
            tracing::error!("{detail}");
        }
    }
    let mut source = err.source();
    while let Some(cause) = source {
        tracing::error!(cause = %cause, "caused by");
        source = cause.source();
    }
    tracing::error!(code = err.exit_code(), "{err}");
}
