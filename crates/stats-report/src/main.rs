//! stats-report — assemble a PDF report from a statistics directory.
//!
//! Usage: `stats-report <directory> [--options]`
//!
//! Converts `fan_activity.txt` and `stats_overall.txt` to PDF, merges them with
//! every `*.svg` plot in the directory into `report-<name>.pdf`, then removes
//! the intermediate `*.txt.pdf` files.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use clap::Parser;

use report_core::options::{ReportOptions, ToolCommand};
use report_core::pipeline::{PipelineBuilder, ReportOutcome};

const APP_NAME: &str = "stats-report";

#[derive(Parser)]
#[command(
    name = "stats-report",
    version,
    about = "Assemble a PDF report from text statistics and SVG plots"
)]
struct Cli {
    /// Statistics directory (e.g. stats_<author>)
    directory: Option<PathBuf>,

    /// Extra arguments are accepted and ignored
    #[arg(hide = true)]
    ignored: Vec<OsString>,

    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Read options from this TOML file instead of the default locations
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Also include the analyzer's secondary text outputs when present
    #[arg(long)]
    extended: bool,

    /// Text→PDF filter program (default: cupsfilter)
    #[arg(long, value_name = "PROGRAM")]
    text_filter: Option<String>,

    /// Merge/convert program (default: convert)
    #[arg(long, value_name = "PROGRAM")]
    merge_tool: Option<String>,

    /// Dump effective merged config as TOML and exit
    #[arg(long)]
    dump_config: bool,

    /// Check that the configured tools are installed and exit
    #[arg(long)]
    check_tools: bool,
}

/// Load config from global and project-local TOML files.
/// Later files override earlier ones. Missing files are silently ignored.
///
/// Parse failures are returned as warnings, since the logger is configured
/// from the loaded options and is not running yet.
fn discover_config(warnings: &mut Vec<String>) -> ReportOptions {
    let mut opts = ReportOptions::default();

    // 1. Global config: ~/.config/stats-report/config.toml
    if let Some(config_dir) = dirs::config_dir() {
        let global_path = config_dir.join(APP_NAME).join("config.toml");
        if let Some(parsed) = read_config_lenient(&global_path, warnings) {
            opts = parsed;
        }
    }

    // 2. Project-local config: ./.stats-report.toml
    let local_path = PathBuf::from(format!(".{}.toml", APP_NAME));
    if let Some(parsed) = read_config_lenient(&local_path, warnings) {
        // serde(default) fills every missing field, so the local file wins outright
        opts = parsed;
    }

    opts
}

fn read_config_lenient(path: &Path, warnings: &mut Vec<String>) -> Option<ReportOptions> {
    let contents = std::fs::read_to_string(path).ok()?;
    match toml::from_str::<ReportOptions>(&contents) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            warnings.push(format!("Failed to parse {}: {}", path.display(), e));
            None
        }
    }
}

/// An explicitly requested config file must exist and parse.
fn read_config_strict(path: &Path) -> Result<ReportOptions> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Cannot read config {}", path.display()))?;
    toml::from_str(&contents).with_context(|| format!("Invalid config {}", path.display()))
}

fn load_config(cli: &Cli, warnings: &mut Vec<String>) -> Result<ReportOptions> {
    let mut opts = match &cli.config {
        Some(path) => read_config_strict(path)?,
        None => discover_config(warnings),
    };
    apply_cli_overrides(&mut opts, cli);
    Ok(opts)
}

/// Apply CLI flags on top of config-loaded options.
/// Only overrides when the CLI flag was explicitly provided.
fn apply_cli_overrides(opts: &mut ReportOptions, cli: &Cli) {
    if cli.verbose > 0 {
        opts.verbose = cli.verbose;
    }

    if cli.extended {
        opts.extended = true;
    }

    if let Some(ref program) = cli.text_filter {
        opts.text_filter = ToolCommand::new(program.clone());
    }

    if let Some(ref program) = cli.merge_tool {
        opts.merge_tool = ToolCommand::new(program.clone());
    }
}

fn log_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

fn main() {
    let cli = Cli::parse();

    let mut warnings = Vec::new();
    let loaded = load_config(&cli, &mut warnings);

    // Config `verbose` applies unless -v was given; a fatal config error keeps the CLI level
    let verbose = loaded.as_ref().map_or(cli.verbose, |opts| opts.verbose);
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(log_filter(verbose)),
    )
    .init();

    for warning in &warnings {
        log::warn!("{}", warning);
    }

    let options = match loaded {
        Ok(options) => options,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    };

    // Handle --dump-config
    if cli.dump_config {
        match toml::to_string_pretty(&options) {
            Ok(s) => {
                println!("{}", s);
                process::exit(0);
            }
            Err(e) => {
                eprintln!("Error serializing config: {}", e);
                process::exit(1);
            }
        }
    }

    if cli.check_tools {
        process::exit(if check_tools(&options) { 0 } else { 1 });
    }

    let Some(directory) = cli.directory.as_deref() else {
        eprintln!("Usage: {} <directory> [options]", APP_NAME);
        eprintln!("   Run `{} --help` for the full option list", APP_NAME);
        process::exit(1);
    };

    if !cli.ignored.is_empty() {
        log::warn!("Ignoring {} extra argument(s)", cli.ignored.len());
    }

    if let Err(e) = run_report(directory, &options) {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn check_tools(options: &ReportOptions) -> bool {
    let statuses = report_tools::probe::check_tools(options);
    for status in &statuses {
        match &status.location {
            Some(path) => println!("{:<12} {} ({})", status.role, status.program, path.display()),
            None => println!("{:<12} {} (not found)", status.role, status.program),
        }
    }
    statuses.iter().all(|s| s.location.is_some())
}

fn run_report(directory: &Path, options: &ReportOptions) -> Result<()> {
    log::info!("Building report for {}", directory.display());

    let (filter, merger) = report_tools::tools_from_options(options);
    let pipeline = PipelineBuilder::new()
        .filter(filter)
        .merger(merger)
        .progress_reporter(Box::new(|frac, msg| {
            log::debug!("[{:3.0}%] {}", frac * 100.0, msg);
        }))
        .build()
        .context("Cannot set up report pipeline")?;

    let outcome = pipeline.run(directory, options);
    print_outcome(&outcome);

    // Conversion and merge failures are not fatal
    Ok(())
}

fn print_outcome(outcome: &ReportOutcome) {
    if let Some(report) = &outcome.report {
        println!("Report saved to {}", report.display());
    }
    log::info!(
        "{} converted, {} skipped, {} intermediates removed",
        outcome.converted.len(),
        outcome.failed.len(),
        outcome.removed.len()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_overrides() {
        let cli = Cli::parse_from([
            "stats-report",
            "stats_alice",
            "-vv",
            "--extended",
            "--merge-tool",
            "magick",
        ]);
        let mut opts = ReportOptions::default();
        apply_cli_overrides(&mut opts, &cli);

        assert_eq!(opts.verbose, 2);
        assert!(opts.extended);
        assert_eq!(opts.merge_tool, ToolCommand::new("magick"));
        assert_eq!(opts.text_filter, ToolCommand::new("cupsfilter"));
        assert_eq!(cli.directory, Some(PathBuf::from("stats_alice")));
    }

    #[test]
    fn test_no_overrides_keep_config() {
        let cli = Cli::parse_from(["stats-report", "dir"]);
        let mut opts = ReportOptions::default();
        opts.verbose = 1;
        opts.merge_tool = ToolCommand::with_args("magick", ["{inputs}", "{output}"]);
        apply_cli_overrides(&mut opts, &cli);

        assert_eq!(opts.verbose, 1);
        assert_eq!(opts.merge_tool.args.len(), 2);
    }

    #[test]
    fn test_extra_arguments_ignored() {
        let cli = Cli::try_parse_from(["stats-report", "stats_alice", "stats_bob", "more"]).unwrap();
        assert_eq!(cli.directory, Some(PathBuf::from("stats_alice")));
        assert_eq!(cli.ignored.len(), 2);
    }

    #[test]
    fn test_config_verbose_survives_without_flag() {
        let tmp = tempfile::TempDir::new().unwrap();
        let config = tmp.path().join("verbose.toml");
        std::fs::write(&config, "verbose = 2\n").unwrap();
        let cli = Cli::parse_from([
            OsString::from("stats-report"),
            OsString::from("--config"),
            config.clone().into_os_string(),
        ]);

        let mut warnings = Vec::new();
        let opts = load_config(&cli, &mut warnings).unwrap();
        assert_eq!(opts.verbose, 2);
        assert_eq!(log_filter(opts.verbose), "trace");
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_directory_is_optional_for_parsing() {
        let cli = Cli::parse_from(["stats-report", "--dump-config"]);
        assert!(cli.directory.is_none());
        assert!(cli.dump_config);
    }

    #[test]
    fn test_read_config_strict() {
        let tmp = tempfile::TempDir::new().unwrap();
        let good = tmp.path().join("good.toml");
        std::fs::write(&good, "extended = true\n").unwrap();
        assert!(read_config_strict(&good).unwrap().extended);

        let bad = tmp.path().join("bad.toml");
        std::fs::write(&bad, "extended = \"maybe\"\n").unwrap();
        assert!(read_config_strict(&bad).is_err());
        assert!(read_config_strict(&tmp.path().join("missing.toml")).is_err());
    }

    #[test]
    fn test_log_filter() {
        assert_eq!(log_filter(0), "info");
        assert_eq!(log_filter(1), "debug");
        assert_eq!(log_filter(5), "trace");
    }
}
