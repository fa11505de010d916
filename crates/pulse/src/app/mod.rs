mod global;
mod settings;
mod watch;


use clap::Command;

pub fn build_cli() -> Command {
    global::root_command()
        .subcommand(settings::settings_command())
        .subcommand(watch::watch_command())
}
