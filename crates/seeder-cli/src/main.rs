use anyhow::Result;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::SimulateOptions;

fn cli() -> Command {
    Command::new("seeder")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Declarative seeding of cloud resource APIs")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON lines"),
        )
        .subcommand(
            Command::new("validate")
                .about("Check a seed document without contacting any API")
                .arg(
                    Arg::new("seed")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Seed document (YAML, or JSON with a .json extension)"),
                ),
        )
        .subcommand(
            Command::new("simulate")
                .about("Reconcile a seed against an in-memory remote")
                .arg(
                    Arg::new("seed")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Seed document"),
                )
                .arg(
                    Arg::new("state")
                        .long("state")
                        .value_parser(value_parser!(PathBuf))
                        .help("Initial remote state as a JSON snapshot"),
                )
                .arg(
                    Arg::new("save-state")
                        .long("save-state")
                        .value_parser(value_parser!(PathBuf))
                        .help("Write the final remote state to this file"),
                )
                .arg(
                    Arg::new("config")
                        .long("config")
                        .value_parser(value_parser!(PathBuf))
                        .help("Seeder configuration (TOML)"),
                )
                .arg(
                    Arg::new("passes")
                        .long("passes")
                        .default_value("1")
                        .value_parser(value_parser!(usize))
                        .help("Number of reconciliation passes"),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output the report as JSON"),
                ),
        )
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn run_validate(args: &ArgMatches) -> Result<bool> {
    let Some(seed) = args.get_one::<PathBuf>("seed") else {
        anyhow::bail!("missing seed path");
    };
    let problems = commands::validate(seed)?;
    if problems.is_empty() {
        println!("{}: ok", seed.display());
        return Ok(true);
    }
    for (category, problem) in &problems {
        println!("{category}: {problem}");
    }
    Ok(false)
}

async fn run_simulate(args: &ArgMatches) -> Result<bool> {
    let Some(seed) = args.get_one::<PathBuf>("seed") else {
        anyhow::bail!("missing seed path");
    };
    let options = SimulateOptions {
        seed,
        state: args.get_one::<PathBuf>("state").map(PathBuf::as_path),
        save_state: args.get_one::<PathBuf>("save-state").map(PathBuf::as_path),
        config: args.get_one::<PathBuf>("config").map(PathBuf::as_path),
        passes: args.get_one::<usize>("passes").copied().unwrap_or(1),
    };

    let report = commands::simulate(&options).await?;
    if args.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", report.to_text());
    }
    Ok(report.converged())
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = cli().get_matches();
    init_tracing(matches.get_flag("log-json"));

    let ok = match matches.subcommand() {
        Some(("validate", args)) => run_validate(args)?,
        Some(("simulate", args)) => run_simulate(args).await?,
        _ => anyhow::bail!("unknown subcommand"),
    };

    std::process::exit(if ok { 0 } else { 1 });
}
