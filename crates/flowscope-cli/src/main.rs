//! `flowscope` command-line tool
//!
//! Offline access to the deterministic parts of the pipeline: repair and
//! score raw model output, lay it out, fingerprint a request and inspect
//! the file cache. Output is JSON on stdout; logs go to stderr.

use anyhow::Result;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use flowscope_core::FlowscopeConfig;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

fn cli() -> Command {
    let input = Arg::new("input")
        .value_name("FILE")
        .default_value("-")
        .help("Raw model output (JSON, optionally code-fenced); `-` reads stdin");

    Command::new("flowscope")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Repair, score and lay out model-generated process graphs")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("TOML configuration file"),
        )
        .arg(
            Arg::new("compact")
                .long("compact")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Print single-line JSON"),
        )
        .subcommand(
            Command::new("repair")
                .about("Repair raw model output into a DAG and score it")
                .arg(input.clone())
                .arg(
                    Arg::new("team-size")
                        .long("team-size")
                        .value_parser(value_parser!(u32))
                        .help("Team size for score calibration"),
                ),
        )
        .subcommand(
            Command::new("layout")
                .about("Repair raw model output and compute its layout")
                .arg(input)
                .arg(
                    Arg::new("hover")
                        .long("hover")
                        .value_name("STEP")
                        .help("Step in hover focus"),
                ),
        )
        .subcommand(
            Command::new("fingerprint")
                .about("Compute the cache fingerprint of a request")
                .arg(
                    Arg::new("description")
                        .required(true)
                        .help("Process description"),
                )
                .arg(
                    Arg::new("stages")
                        .long("stages")
                        .value_parser(value_parser!(PathBuf))
                        .help("JSON file with a stage list"),
                )
                .arg(
                    Arg::new("team-size")
                        .long("team-size")
                        .value_parser(value_parser!(u32))
                        .help("Team size"),
                ),
        )
        .subcommand(
            Command::new("cache")
                .about("Show a cached analysis from the cache directory")
                .arg(
                    Arg::new("fingerprint")
                        .required(true)
                        .help("Fingerprint (32 hex characters)"),
                ),
        )
}

fn load_config(matches: &ArgMatches) -> Result<FlowscopeConfig> {
    match matches.get_one::<PathBuf>("config") {
        Some(path) => Ok(FlowscopeConfig::load(path)?),
        None => Ok(FlowscopeConfig::default().with_env_overrides()),
    }
}

fn print_json(value: &impl serde::Serialize, compact: bool) -> Result<()> {
    let text = if compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    println!("{text}");
    Ok(())
}

async fn run(matches: ArgMatches) -> Result<()> {
    let config = load_config(&matches)?;
    let compact = matches.get_flag("compact");

    match matches.subcommand() {
        Some(("repair", args)) => {
            let text = commands::read_input(input_path(args))?;
            let team_size = args.get_one::<u32>("team-size").copied();
            let output = commands::repair(&text, team_size)?;
            if !output.report.is_clean() {
                tracing::info!("Repaired {} defects", output.report.repair_count());
            }
            print_json(&output, compact)
        }
        Some(("layout", args)) => {
            let text = commands::read_input(input_path(args))?;
            let hovered = args.get_one::<String>("hover").map(String::as_str);
            print_json(&commands::layout(&text, &config, hovered)?, compact)
        }
        Some(("fingerprint", args)) => {
            let description = args
                .get_one::<String>("description")
                .map(String::as_str)
                .unwrap_or_default();
            let stages = args
                .get_one::<PathBuf>("stages")
                .map(|path| commands::read_stages(path))
                .transpose()?;
            let team_size = args.get_one::<u32>("team-size").copied();
            let fingerprint =
                commands::fingerprint(description, stages.as_deref(), team_size, &config)?;
            println!("{fingerprint}");
            Ok(())
        }
        Some(("cache", args)) => {
            let fingerprint = args
                .get_one::<String>("fingerprint")
                .map(String::as_str)
                .unwrap_or_default();
            match commands::show_cached(fingerprint, &config).await? {
                Some(entry) => print_json(&entry, compact),
                None => {
                    eprintln!("no cached analysis for {fingerprint}");
                    std::process::exit(1);
                }
            }
        }
        _ => Ok(()),
    }
}

fn input_path(args: &ArgMatches) -> &str {
    args.get_one::<String>("input")
        .map_or("-", String::as_str)
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli().get_matches()).await {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
