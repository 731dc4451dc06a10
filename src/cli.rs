//! Command-line glue: `uninstall_by_name [--timeout-minutes T] PROGRAM_STRING`.

use crate::error::UninstallError;
use clap::Parser;
use std::ffi::OsString;
use std::time::Duration;

const MILLIS_PER_MINUTE: i64 = 60_000;
const TIMEOUT_FLAG: &str = "--timeout-minutes";

#[derive(Debug, Parser)]
#[command(
    name = "uninstall_by_name",
    version,
    about = "Find an installed program by display name and run its uninstaller"
)]
pub struct Cli {
    /// Stop waiting for the uninstaller after T minutes (it keeps running)
    #[arg(long = "timeout-minutes", value_name = "T", allow_hyphen_values = true)]
    pub timeout_minutes: Option<String>,

    /// Case-sensitive substring of the program's display name
    #[arg(value_name = "PROGRAM_STRING", allow_hyphen_values = true)]
    pub program: String,
}

/// What to uninstall and how long to wait for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    /// `None` waits until the uninstaller exits.
    pub timeout: Option<Duration>,
}

impl Cli {
    /// Validate the parsed arguments. `default_minutes` applies when the
    /// flag was not given.
    pub fn invocation(&self, default_minutes: Option<i64>) -> Result<Invocation, UninstallError> {
        if self.program.is_empty() {
            return Err(UninstallError::usage("PROGRAM_STRING must not be empty"));
        }
        let timeout = match &self.timeout_minutes {
            Some(raw) => parse_timeout(raw)?,
            None => match default_minutes {
                Some(minutes) => minutes_to_timeout(minutes, &minutes.to_string())?,
                None => None,
            },
        };
        Ok(Invocation {
            program: self.program.clone(),
            timeout,
        })
    }
}

/// Reject argument lists clap would accept but the tool does not: anything
/// other than `PROGRAM_STRING` alone or with `--timeout-minutes T`, the
/// `--timeout-minutes=T` form, and a `--` separator. `argv` includes the
/// program name.
pub fn check_shape(argv: &[OsString]) -> Result<(), UninstallError> {
    let args = argv.get(1..).unwrap_or_default();
    if args.len() != 1 && args.len() != 3 {
        return Err(UninstallError::usage(format!(
            "expected 1 or 3 arguments, got {}",
            args.len()
        )));
    }
    for arg in args {
        let arg = arg.to_string_lossy();
        if arg == "--" {
            return Err(UninstallError::usage("unexpected argument '--'"));
        }
        if arg.starts_with(&format!("{TIMEOUT_FLAG}=")) {
            return Err(UninstallError::usage(format!(
                "{TIMEOUT_FLAG} takes its value as the next argument"
            )));
        }
    }
    Ok(())
}

/// Parse a whole number of minutes that fits in 32 bits. Zero or negative
/// values mean "no timeout".
pub fn parse_timeout(raw: &str) -> Result<Option<Duration>, UninstallError> {
    let minutes = raw
        .trim()
        .parse::<i32>()
        .map_err(|e| UninstallError::TimeoutParse {
            value: raw.to_string(),
            source: Some(e),
        })?;
    minutes_to_timeout(i64::from(minutes), raw)
}

fn minutes_to_timeout(minutes: i64, raw: &str) -> Result<Option<Duration>, UninstallError> {
    let millis = minutes
        .checked_mul(MILLIS_PER_MINUTE)
        .ok_or_else(|| UninstallError::TimeoutParse {
            value: raw.to_string(),
            source: None,
        })?;
    if millis <= 0 {
        return Ok(None);
    }
    Ok(Some(Duration::from_millis(millis as u64)))
}
