use clap::{Arg, ArgAction, Command};

pub fn settings_command() -> Command {
    Command::new("settings")
        .about("Show or change persisted refresh settings")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("show")
                .about("Print the current settings record")
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Output in JSON format")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("set")
                .about("Validate and persist a single setting")
                .arg(
                    Arg::new("key")
                        .help("Setting name (e.g. refresh_interval_ms, feed_enabled)")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("value")
                        .help("New value")
                        .required(true)
                        .index(2),
                ),
        )
        .subcommand(Command::new("reset").about("Restore and persist default settings"))
        .subcommand(Command::new("path").about("Print the settings file location"))
}
