use std::path::PathBuf;

use clap::ArgMatches;
use pulse_paths::PulsePaths;
use tracing::warn;

use crate::color;

/// Settings file from `--settings`, or `~/.pulse/settings.toml`.
///
/// Falls back to a directory under the system temp dir when the home
/// directory cannot be resolved, so commands still work in bare containers.
pub(crate) fn settings_path(matches: &ArgMatches) -> PathBuf {
    if let Some(path) = matches.get_one::<PathBuf>("settings") {
        return path.clone();
    }

    match PulsePaths::resolve() {
        Ok(paths) => paths.settings_file(),
        Err(e) => {
            let fallback = PulsePaths::from_dir(std::env::temp_dir().join(".pulse"));
            warn!(
                event = "cli.paths.resolve_failed",
                error = %e,
                fallback = %fallback.pulse_dir().display(),
            );
            eprintln!(
                "{} {}. Using {}",
                color::warning("Warning:"),
                e,
                fallback.pulse_dir().display()
            );
            fallback.settings_file()
        }
    }
}

/// Report a failed command to the user and the log, returning it as the command error.
pub(crate) fn report<E>(event: &'static str, e: E) -> Box<dyn std::error::Error>
where
    E: pulse_core::PulseError,
{
    if e.is_user_error() {
        warn!(event = event, code = e.error_code(), error = %e);
    } else {
        tracing::error!(event = event, code = e.error_code(), error = %e);
    }
    eprintln!("{} {}", color::error("Error:"), e);
    Box::new(e)
}
