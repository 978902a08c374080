use anyhow::Result;
use clap::{value_parser, Arg, ArgAction, Command};

use vitalstat::commands;

fn output_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("json")
                .long("json")
                .help("Print the snapshot as JSON")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("full")
                .short('f')
                .long("full")
                .help("Print every domain instead of the compact summary")
                .action(ArgAction::SetTrue)
                .conflicts_with("json"),
        )
}

fn main() -> Result<()> {
    let matches = Command::new("vitalstat")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Tiered system telemetry: CPU, memory, network, disk, battery, sensors")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(output_args(
            Command::new("watch")
                .about("Sample continuously (SIGUSR1 pauses, SIGUSR2 resumes)")
                .arg(
                    Arg::new("interval")
                        .short('i')
                        .long("interval")
                        .value_name("MS")
                        .help("Tick interval in milliseconds (default from config, 1000)")
                        .value_parser(value_parser!(u64)),
                )
                .arg(
                    Arg::new("count")
                        .short('n')
                        .long("count")
                        .value_name("TICKS")
                        .help("Stop after this many ticks")
                        .value_parser(value_parser!(u64)),
                )
                .arg(
                    Arg::new("background")
                        .long("background")
                        .help("Sample only CPU and network, print nothing")
                        .action(ArgAction::SetTrue),
                ),
        ))
        .subcommand(output_args(
            Command::new("snapshot").about("Take two samples one second apart and print once"),
        ))
        .get_matches();

    vitalstat::init_logging();

    match matches.subcommand() {
        Some(("watch", sub_matches)) => commands::watch::execute(sub_matches),
        Some(("snapshot", sub_matches)) => commands::snapshot::execute(sub_matches),
        _ => Ok(()),
    }
}
