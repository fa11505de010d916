use std::path::PathBuf;

use clap::{Arg, ArgAction, Command};

pub fn root_command() -> Command {
    Command::new("pulse")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Periodic refresh scheduling for feed, messages and notification views")
        .long_about("pulse keeps views fresh by re-running their refresh operation on a timer. Refreshing pauses while the app is hidden or offline and stops after too many consecutive failures until a manual refresh succeeds.")
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging output")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("no-color")
                .long("no-color")
                .help("Disable colored output")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("settings")
                .long("settings")
                .help("Settings file to use instead of ~/.pulse/settings.toml")
                .value_name("PATH")
                .value_parser(clap::value_parser!(PathBuf))
                .global(true),
        )
        .subcommand_required(true)
        .arg_required_else_help(true)
}
