// src/cli.rs
use anyhow::{Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;

use crate::core::config::AppConfig;
use crate::infra::LogLevel;

pub mod commands {
    pub mod report;
    pub mod run;
}

pub fn build_cli() -> Command {
    Command::new("osu-runner")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Runs the OSU MPI micro-benchmarks on EC2 hosts and reports the results.")
        .arg(
            Arg::new("config")
                .long("config")
                .help("TOML file with run settings; command line flags take precedence")
                .value_name("CONFIG")
                .value_parser(clap::value_parser!(PathBuf))
                .global(true)
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("loglevel")
                .short('l')
                .long("loglevel")
                .help("Log level: 1 Trace, 2 Info, 3 Warning, 4 Error")
                .value_name("LOGLEVEL")
                .value_parser(clap::value_parser!(u8).range(1..=4))
                .global(true)
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("log-file")
                .long("log-file")
                .help("File the log is appended to")
                .value_name("LOG_FILE")
                .value_parser(clap::value_parser!(PathBuf))
                .global(true)
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("host-name")
                .long("host-name")
                .help("Host name reported in the metrics file")
                .value_name("HOST")
                .global(true)
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("region")
                .long("region")
                .help("Region reported as the metrics marketplace")
                .value_name("REGION")
                .global(true)
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("metrics-dir")
                .long("metrics-dir")
                .help("Directory the hourly metrics files are appended to")
                .value_name("METRICS_DIR")
                .value_parser(clap::value_parser!(PathBuf))
                .global(true)
                .action(ArgAction::Set),
        )
        .subcommand(
            Command::new("run")
                .about("Run the benchmark catalog and build the report")
                .arg(
                    Arg::new("mpicount")
                        .short('c')
                        .long("mpicount")
                        .help("Number of MPI processes/cores")
                        .value_name("COUNT")
                        .value_parser(clap::value_parser!(u32))
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("hostfile")
                        .short('f')
                        .long("hostfile")
                        .help("Hostfile with MPI host info")
                        .value_name("FILE")
                        .value_parser(clap::value_parser!(PathBuf))
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("output-dir")
                        .long("output-dir")
                        .help("Base directory for per-run result directories")
                        .value_name("OUTPUT_DIR")
                        .value_parser(clap::value_parser!(PathBuf))
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("launcher")
                        .long("launcher")
                        .help("MPI launcher used to start each benchmark")
                        .value_name("LAUNCHER")
                        .action(ArgAction::Set),
                ),
        )
        .subcommand(
            Command::new("report")
                .about("Rebuild the JSON report and metrics block from an existing result directory")
                .arg(
                    Arg::new("result-dir")
                        .help("Result directory of a previous run")
                        .value_name("RESULT_DIR")
                        .required(true)
                        .value_parser(clap::value_parser!(PathBuf))
                        .action(ArgAction::Set),
                ),
        )
}

/// Loads the config file (if any) and applies the flags shared by every subcommand.
fn load_config(matches: &ArgMatches) -> Result<AppConfig> {
    let mut config = match matches.get_one::<PathBuf>("config") {
        Some(path) => AppConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => AppConfig::default(),
    };

    if let Some(level) = matches.get_one::<u8>("loglevel") {
        config.log_level = LogLevel::try_from(*level).map_err(anyhow::Error::msg)?;
    }
    if let Some(log_file) = matches.get_one::<PathBuf>("log-file") {
        config.log_file = log_file.clone();
    }
    if let Some(host) = matches.get_one::<String>("host-name") {
        config.host_name = host.clone();
    }
    if let Some(region) = matches.get_one::<String>("region") {
        config.region = region.clone();
    }
    if let Some(dir) = matches.get_one::<PathBuf>("metrics-dir") {
        config.metrics.dir = dir.clone();
    }
    Ok(config)
}

pub async fn run() -> Result<()> {
    let matches = build_cli().get_matches();

    match matches.subcommand() {
        Some(("run", run_matches)) => {
            let mut config = load_config(run_matches)?;
            if let Some(count) = run_matches.get_one::<u32>("mpicount") {
                config.mpi_count = *count;
            }
            if let Some(hostfile) = run_matches.get_one::<PathBuf>("hostfile") {
                config.hostfile = hostfile.clone();
            }
            if let Some(dir) = run_matches.get_one::<PathBuf>("output-dir") {
                config.output_base = dir.clone();
            }
            if let Some(launcher) = run_matches.get_one::<String>("launcher") {
                config.launcher = launcher.clone();
            }
            config.expand_paths()?;
            commands::run::execute(config).await?;
        }
        Some(("report", report_matches)) => {
            let mut config = load_config(report_matches)?;
            config.expand_paths()?;
            let result_dir = report_matches
                .get_one::<PathBuf>("result-dir")
                .cloned()
                .context("RESULT_DIR is required")?;
            commands::report::execute(config, result_dir)?;
        }
        _ => {
            // No subcommand given; print the help text.
            build_cli().print_help()?;
        }
    }
    Ok(())
}
