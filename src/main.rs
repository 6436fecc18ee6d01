use clap::{Arg, ArgAction, ArgMatches, Command};
use colored::*;
use log::{error, info};
use std::io;

use nltool::cli::{self, CliArgs};
use nltool::Converter;

fn main() {
    let matches = create_cli().get_matches();

    let level = cli::log_level(matches.get_count("verbose"));
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    if let Err(e) = run_application(&matches) {
        error!("{}", format!("Error: {:#}", e).red());
        std::process::exit(1);
    }
}

fn create_cli() -> Command {
    Command::new("nltool")
        .version(nltool::VERSION)
        .about("Convert a SPICE netlist into netlist device statements")
        .arg(
            Arg::new("file")
                .short('f')
                .long("file")
                .value_name("FILE")
                .default_value(cli::STDIN_PATH)
                .help("SPICE netlist to convert (default is stdin)"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("FILE")
                .help("Write the converted netlist to FILE instead of stdout"),
        )
        .arg(
            Arg::new("format")
                .long("format")
                .value_name("FORMAT")
                .default_value("nl")
                .value_parser(["nl", "json"])
                .help("Output format"),
        )
        .arg(
            Arg::new("nested")
                .long("nested")
                .value_name("POLICY")
                .default_value("flatten")
                .value_parser(["flatten", "reject"])
                .help("How to treat a .SUBCKT inside an open subcircuit"),
        )
        .arg(
            Arg::new("prune-single-nets")
                .long("prune-single-nets")
                .action(ArgAction::SetTrue)
                .help("Do not emit NET_C for nets with a single terminal"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::Count)
                .help("Increase verbosity level"),
        )
}

fn run_application(matches: &ArgMatches) -> anyhow::Result<()> {
    let args = CliArgs::from_matches(matches)?;

    eprintln!("{}", "WARNING: This is Work In Progress! - It may fail anytime".yellow());
    info!("Input file: {}", args.input_file.bright_blue());

    let content = cli::read_input(&args.input_file)?;

    let mut converter = Converter::with_config(args.config.clone());
    let translation = converter.convert(&content);

    cli::write_diagnostics(io::stderr().lock(), &translation.diagnostics)?;

    let out = cli::open_output(args.output_file.as_deref())?;
    translation.export(out, args.output_format)?;

    if let Some(output_file) = &args.output_file {
        info!("Netlist written to: {}", output_file.bright_green());
    }
    Ok(())
}
