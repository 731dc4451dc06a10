use clap::error::ErrorKind;
use clap::Parser;
use std::ffi::OsString;

use uninstall_by_name::app;
use uninstall_by_name::cli::{self, Cli};
use uninstall_by_name::error::{exit_codes, UninstallError};
use uninstall_by_name::logging;
use uninstall_by_name::registry::WindowsRegistry;
use uninstall_by_name::settings::Settings;

fn try_main(settings: &Settings) -> Result<(), UninstallError> {
    let argv: Vec<OsString> = std::env::args_os().collect();
    cli::check_shape(&argv)?;
    let cli = match Cli::try_parse_from(&argv) {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            e.exit()
        }
        Err(e) => return Err(e.into()),
    };
    let invocation = cli.invocation(settings.timeout_minutes)?;
    app::run(&invocation, WindowsRegistry::new(), settings)?;
    Ok(())
}

fn main() {
    let settings_path = Settings::default_path();
    let (settings, settings_err) = match Settings::load(&settings_path) {
        Ok(s) => (s, None),
        Err(e) => (Settings::default(), Some(e)),
    };
    logging::init(settings.debug_logging, settings.log_path());
    if let Some(e) = settings_err {
        tracing::warn!(
            path = %settings_path.display(),
            error = %e,
            "ignoring unreadable settings file"
        );
    }

    let code = match try_main(&settings) {
        Ok(()) => exit_codes::SUCCESS,
        Err(e) => {
            app::report(&e);
            e.exit_code()
        }
    };
    std::process::exit(code);
}
