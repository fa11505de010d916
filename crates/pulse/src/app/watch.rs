use clap::builder::PossibleValuesParser;
use clap::{Arg, ArgAction, Command};

pub fn watch_command() -> Command {
    Command::new("watch")
        .about("Mount a view and refresh it by running a shell command")
        .long_about("Mount a view whose refresh operation runs COMMAND through `sh -c`. A non-zero exit counts as a failed refresh. Control lines are read from stdin: hide, show, offline, online, refresh, status, quit. Ctrl-C or end of input stops watching.")
        .arg(
            Arg::new("view")
                .help("View to mount")
                .required(true)
                .index(1)
                .value_parser(PossibleValuesParser::new(["feed", "messages", "notifications"])),
        )
        .arg(
            Arg::new("command")
                .long("command")
                .short('c')
                .help("Shell command that performs one refresh")
                .value_name("CMD")
                .required(true),
        )
        .arg(
            Arg::new("interval-ms")
                .long("interval-ms")
                .help("Override the refresh interval for this view")
                .value_name("MS")
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
        .arg(
            Arg::new("max-retries")
                .long("max-retries")
                .help("Override the consecutive failure budget (0 = never suspend)")
                .value_name("N")
                .value_parser(clap::value_parser!(u32)),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("Print each status change as a JSON line")
                .action(ArgAction::SetTrue),
        )
}
