use clap::ArgMatches;
use tracing::{error, info};

mod helpers;
mod settings;
mod watch;

pub fn run_command(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    info!(
        event = "cli.app.startup_completed",
        version = env!("CARGO_PKG_VERSION"),
    );

    match matches.subcommand() {
        Some(("settings", sub_matches)) => settings::handle_settings_command(matches, sub_matches),
        Some(("watch", sub_matches)) => watch::handle_watch_command(matches, sub_matches),
        _ => {
            error!(event = "cli.command_unknown");
            Err("Unknown command".into())
        }
    }
}
