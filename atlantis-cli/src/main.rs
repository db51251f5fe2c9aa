//! Command-line interface for the Atlantis report converter
//! This binary converts Atlantis turn reports into structured JSON or YAML documents.
//!
//! Usage:
//!   atlantis `<path>...` [--format `<format>`] [--compact] [--config `<file>`] [-v]
//!
//! One path prints one document; several paths print an array with one document per
//! report, in argument order. If any report fails nothing is printed and the exit code
//! is 1.

use std::fs::File;
use std::io::{self, BufReader, Write};
use std::process;

use atlantis_config::{AtlantisConfig, Loader, OutputFormatConfig};
use atlantis_parser::{
    convert_reader, render_all, CancellationToken, ConvertOptions, OutputFormat, Report,
};
use clap::{Arg, ArgAction, ArgMatches, Command};
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

/// User configuration picked up from the working directory when `--config` is absent.
const LOCAL_CONFIG: &str = "atlantis.toml";

fn build_cli() -> Command {
    Command::new("atlantis")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Convert Atlantis turn reports into structured documents")
        .arg_required_else_help(true)
        .arg(
            Arg::new("paths")
                .help("Report files to convert")
                .required(true)
                .num_args(1..)
                .index(1),
        )
        .arg(
            Arg::new("format")
                .long("format")
                .short('f')
                .help("Output format (default from configuration: json)")
                .value_parser(["json", "yaml"]),
        )
        .arg(
            Arg::new("compact")
                .long("compact")
                .help("Print JSON on a single line")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .help("Configuration file layered over the built-in defaults"),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Log conversion progress to stderr")
                .action(ArgAction::SetTrue),
        )
}

fn main() {
    let matches = build_cli().get_matches();

    let config = load_config(&matches).unwrap_or_else(|e| {
        eprintln!("Configuration error: {}", e);
        process::exit(1);
    });
    init_logging(&config, matches.get_flag("verbose"));

    let paths: Vec<&String> = matches
        .get_many::<String>("paths")
        .map(|paths| paths.collect())
        .unwrap_or_default();
    let format = match matches.get_one::<String>("format") {
        Some(format) => format.parse().unwrap_or_default(),
        None => match config.output.format {
            OutputFormatConfig::Json => OutputFormat::Json,
            OutputFormatConfig::Yaml => OutputFormat::Yaml,
        },
    };
    let pretty = config.output.pretty && !matches.get_flag("compact");

    let options = conversion_options(&config);
    let reports = convert_all(&paths, &options).unwrap_or_else(|(path, e)| {
        error!(path = %path, "conversion failed");
        eprintln!("{}: {}", path, e);
        process::exit(1);
    });

    if let Err(e) = print_reports(&reports, format, pretty, &options.cancellation) {
        eprintln!("Output error: {}", e);
        process::exit(1);
    }
}

fn load_config(matches: &ArgMatches) -> Result<AtlantisConfig, atlantis_config::ConfigError> {
    let loader = match matches.get_one::<String>("config") {
        Some(path) => Loader::new().with_file(path),
        None => Loader::new().with_optional_file(LOCAL_CONFIG),
    };
    loader.build()
}

/// `RUST_LOG` wins over the configured filter; `-v` raises the configured one to debug.
fn init_logging(config: &AtlantisConfig, verbose: bool) {
    let fallback = if verbose {
        "debug"
    } else {
        config.logging.filter.as_str()
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn conversion_options(config: &AtlantisConfig) -> ConvertOptions {
    let cancellation = match config.conversion.deadline() {
        Some(timeout) => CancellationToken::with_timeout(timeout),
        None => CancellationToken::new(),
    };
    ConvertOptions::default()
        .with_history_size(config.conversion.history_size)
        .with_max_lines(config.conversion.line_limit())
        .with_cancellation(cancellation)
}

/// Convert every report, stopping at the first failure.
fn convert_all<'p>(
    paths: &[&'p String],
    options: &ConvertOptions,
) -> Result<Vec<Report>, (&'p str, String)> {
    let mut reports = Vec::with_capacity(paths.len());
    for &path in paths {
        debug!(path = %path, "converting report");
        let file = File::open(path).map_err(|e| (path.as_str(), e.to_string()))?;
        let report = convert_reader(BufReader::new(file), options)
            .map_err(|e| (path.as_str(), e.to_string()))?;
        reports.push(report);
    }
    Ok(reports)
}

fn print_reports(
    reports: &[Report],
    format: OutputFormat,
    pretty: bool,
    cancellation: &CancellationToken,
) -> Result<(), atlantis_parser::ConvertError> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match reports {
        [report] => report.write_to(&mut out, format, pretty, cancellation),
        _ => {
            let rendered = render_all(reports, format, pretty)?;
            cancellation.check()?;
            writeln!(out, "{}", rendered.trim_end())?;
            Ok(())
        }
    }
}
