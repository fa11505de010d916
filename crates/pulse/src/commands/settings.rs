use clap::ArgMatches;
use tracing::{error, info};

use pulse_config::{ConfigError, PulseSettings, SETTING_KEYS, SettingsStore, read_settings_file};

use super::helpers::{report, settings_path};
use crate::color;

pub(crate) fn handle_settings_command(
    global: &ArgMatches,
    matches: &ArgMatches,
) -> Result<(), Box<dyn std::error::Error>> {
    let path = settings_path(global);

    match matches.subcommand() {
        Some(("show", sub_matches)) => {
            let json_output = sub_matches.get_flag("json");
            info!(event = "cli.settings.show_started", path = %path.display(), json_output = json_output);

            let settings = match read_settings_file(&path) {
                Ok(settings) => settings,
                Err(ConfigError::IoError { source }) if source.kind() == std::io::ErrorKind::NotFound => {
                    PulseSettings::default()
                }
                Err(e) => return Err(report("cli.settings.show_failed", e)),
            };

            if json_output {
                println!("{}", serde_json::to_string_pretty(&settings)?);
            } else {
                print_settings(&settings)?;
            }
            info!(event = "cli.settings.show_completed");
            Ok(())
        }
        Some(("set", sub_matches)) => {
            let key = sub_matches
                .get_one::<String>("key")
                .ok_or("Key argument is required")?;
            let value = sub_matches
                .get_one::<String>("value")
                .ok_or("Value argument is required")?;
            info!(event = "cli.settings.set_started", key = %key, value = %value);

            let store = SettingsStore::open(path);
            let updated = store
                .update(key, value)
                .map_err(|e| report("cli.settings.set_failed", e))?;

            let normalized = key.replace('-', "_");
            let shown = serde_json::to_value(&updated)?
                .get(&normalized)
                .map(|v| v.to_string())
                .unwrap_or_else(|| value.clone());
            println!("{} = {}", color::accent(&normalized), shown);
            info!(event = "cli.settings.set_completed", key = %normalized);
            Ok(())
        }
        Some(("reset", _)) => {
            info!(event = "cli.settings.reset_started", path = %path.display());
            let store = SettingsStore::open(path);
            let defaults = store
                .reset()
                .map_err(|e| report("cli.settings.reset_failed", e))?;
            println!("{}", color::success("Settings restored to defaults."));
            print_settings(&defaults)?;
            info!(event = "cli.settings.reset_completed");
            Ok(())
        }
        Some(("path", _)) => {
            println!("{}", path.display());
            Ok(())
        }
        _ => {
            error!(event = "cli.settings.subcommand_unknown");
            Err("Unknown settings subcommand".into())
        }
    }
}

fn print_settings(settings: &PulseSettings) -> Result<(), serde_json::Error> {
    let values = serde_json::to_value(settings)?;
    for key in SETTING_KEYS {
        let value = values.get(key).map(|v| v.to_string()).unwrap_or_default();
        println!("{} {}", color::accent(&format!("{key:<24}")), value);
    }
    Ok(())
}
