//! Error taxonomy for the uninstall lookup and the exit codes each failure
//! terminates the process with.

use std::io;
use std::num::ParseIntError;
use thiserror::Error;

/// Process exit codes. Every non-zero code is a distinct fatal outcome.
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const LAUNCH_FAIL: i32 = 1;
    pub const OPEN_KEY_FAIL: i32 = 3;
    pub const ENUMERATE_SUBKEYS_FAIL: i32 = 5;
    pub const GET_UNINSTALL_KEY_FAIL: i32 = 7;
    pub const USAGE: i32 = 11;
    pub const PARSE_TIMEOUT: i32 = 13;
}

#[derive(Debug, Error)]
pub enum UninstallError {
    #[error("Usage: uninstall_by_name [--timeout-minutes T] PROGRAM_STRING")]
    Usage { detail: String },

    #[error("Could not parse timeout argument \"{value}\".")]
    TimeoutParse {
        value: String,
        #[source]
        source: Option<ParseIntError>,
    },

    #[error("Could not open key \"{path}\".")]
    OpenKey {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Could not enumerate subkeys of {path}")]
    EnumerateSubkeys {
        path: String,
        #[source]
        source: io::Error,
    },

    /// `path` is the full key path including the hive name.
    #[error("Could not get value of key \"{path}\\UninstallString\".")]
    GetUninstallKey {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Could not parse uninstall string \"{raw}\".")]
    UnparseableCommand { raw: String },

    #[error("Could not start \"{program}\".")]
    Launch {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("Lost track of process {pid}.")]
    Wait {
        pid: u32,
        #[source]
        source: io::Error,
    },
}

impl UninstallError {
    pub fn exit_code(&self) -> i32 {
        match self {
            UninstallError::Usage { .. } => exit_codes::USAGE,
            UninstallError::TimeoutParse { .. } => exit_codes::PARSE_TIMEOUT,
            UninstallError::OpenKey { .. } => exit_codes::OPEN_KEY_FAIL,
            UninstallError::EnumerateSubkeys { .. } => exit_codes::ENUMERATE_SUBKEYS_FAIL,
            // An unparseable command shares the code with a failed value read.
            UninstallError::GetUninstallKey { .. } | UninstallError::UnparseableCommand { .. } => {
                exit_codes::GET_UNINSTALL_KEY_FAIL
            }
            UninstallError::Launch { .. } | UninstallError::Wait { .. } => exit_codes::LAUNCH_FAIL,
        }
    }

    pub(crate) fn usage(detail: impl Into<String>) -> Self {
        UninstallError::Usage {
            detail: detail.into(),
        }
    }
}

impl From<clap::Error> for UninstallError {
    fn from(err: clap::Error) -> Self {
        // clap renders a multi-line message; the first line names the problem.
        let rendered = err.to_string();
        let detail = rendered
            .lines()
            .next()
            .unwrap_or_default()
            .trim_start_matches("error: ")
            .to_string();
        UninstallError::usage(detail)
    }
}
