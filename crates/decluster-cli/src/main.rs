// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use decluster_cli::{LoadedCatalog, parse_catalog_csv, run_decluster};
use decluster_core::{DeclusterError, DeclusterResult, ExecutionContext, TimeSource};
use decluster_engine::DeclusterSpec;
use decluster_windows::{WindowMethod, Windows, compute_windows};
use serde::Serialize;
use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

const DEFAULT_LOG_LEVEL: &str = "warn";

struct Cli {
    command: Command,
}

enum Command {
    Run(RunArgs),
    Windows(WindowsArgs),
}

#[derive(Debug, Default)]
struct RunArgs {
    input: PathBuf,
    window: Option<WindowMethod>,
    fs_time_prop: Option<f64>,
    time_cutoff: Option<f64>,
    config: Option<PathBuf>,
    output: Option<PathBuf>,
    no_warnings: bool,
    log_level: Option<String>,
}

#[derive(Debug, Default)]
struct WindowsArgs {
    magnitudes: Vec<f64>,
    window: WindowMethod,
    time_cutoff: Option<f64>,
    output: Option<PathBuf>,
}

#[derive(Debug)]
enum CliError {
    Decluster(DeclusterError),
    Io {
        context: String,
        source: std::io::Error,
    },
    Json {
        context: String,
        source: serde_json::Error,
    },
    InvalidInput(String),
}

impl CliError {
    fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    fn json(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Json {
            context: context.into(),
            source,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Self::Decluster(err) => err.code(),
            Self::Io { .. } => "io_error",
            Self::Json { .. } => "json_error",
            Self::InvalidInput(_) => "invalid_input",
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Decluster(err) => write!(f, "{err}"),
            Self::Io { context, source } => write!(f, "{context}: {source}"),
            Self::Json { context, source } => write!(f, "{context}: {source}"),
            Self::InvalidInput(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Decluster(err) => Some(err),
            Self::Io { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
            Self::InvalidInput(_) => None,
        }
    }
}

impl From<DeclusterError> for CliError {
    fn from(value: DeclusterError) -> Self {
        Self::Decluster(value)
    }
}

#[derive(Serialize)]
struct InputSummary {
    path: String,
    format: &'static str,
    n: usize,
    time_source: TimeSource,
}

#[derive(Serialize)]
struct ClusterSummary {
    n_clusters: usize,
    independent_events: usize,
    clustered_events: usize,
}

#[derive(Serialize)]
struct RunOutput {
    command: &'static str,
    input: InputSummary,
    spec: DeclusterSpec,
    summary: ClusterSummary,
    result: DeclusterResult,
}

/// One magnitude's window. Extents are `null` when the window is empty.
#[derive(Debug, PartialEq, Serialize)]
struct WindowRow {
    magnitude: f64,
    empty: bool,
    space_km: Option<f64>,
    time_days: Option<f64>,
    time_ms: Option<i64>,
}

#[derive(Serialize)]
struct WindowsOutput {
    command: &'static str,
    window: WindowMethod,
    time_cutoff: Option<f64>,
    windows: Vec<WindowRow>,
}

#[derive(Serialize)]
struct ErrorEnvelope {
    error: ErrorPayload,
}

#[derive(Serialize)]
struct ErrorPayload {
    code: String,
    message: String,
}

fn main() {
    if let Err(err) = run() {
        emit_structured_error(&err);
        process::exit(1);
    }
}

fn run() -> Result<(), CliError> {
    let Some(cli) = parse_cli_from_env()? else {
        return Ok(());
    };

    match cli.command {
        Command::Run(args) => handle_run(args),
        Command::Windows(args) => handle_windows(args),
    }
}

fn parse_cli_from_env() -> Result<Option<Cli>, CliError> {
    let args = env::args().skip(1).collect::<Vec<_>>();
    parse_cli(&args)
}

fn parse_cli(args: &[String]) -> Result<Option<Cli>, CliError> {
    if args.is_empty() || matches!(args[0].as_str(), "-h" | "--help") {
        print_root_help();
        return Ok(None);
    }
    if matches!(args[0].as_str(), "-V" | "--version") {
        print_version();
        return Ok(None);
    }

    let command_name = args[0].as_str();
    let rest = &args[1..];

    if rest
        .iter()
        .any(|arg| matches!(arg.as_str(), "-h" | "--help"))
    {
        print_command_help(command_name)?;
        return Ok(None);
    }
    if rest
        .iter()
        .any(|arg| matches!(arg.as_str(), "-V" | "--version"))
    {
        print_version();
        return Ok(None);
    }

    let command = match command_name {
        "run" => Command::Run(parse_run_args(rest)?),
        "windows" => Command::Windows(parse_windows_args(rest)?),
        _ => {
            return Err(CliError::invalid_input(format!(
                "unknown command '{command_name}'; expected one of: run, windows"
            )));
        }
    };

    Ok(Some(Cli { command }))
}

fn parse_run_args(tokens: &[String]) -> Result<RunArgs, CliError> {
    let mut args = RunArgs::default();
    let mut idx = 0usize;
    while idx < tokens.len() {
        let (flag, inline_value) = split_flag(tokens[idx].as_str())?;
        match flag {
            "--input" => {
                let raw = take_flag_value(flag, inline_value, tokens, &mut idx)?;
                args.input = PathBuf::from(raw);
            }
            "--window" => {
                let raw = take_flag_value(flag, inline_value, tokens, &mut idx)?;
                args.window = Some(WindowMethod::parse(raw.as_str())?);
            }
            "--fs-time-prop" => {
                let raw = take_flag_value(flag, inline_value, tokens, &mut idx)?;
                args.fs_time_prop = Some(parse_f64_arg(raw.as_str(), flag)?);
            }
            "--time-cutoff" => {
                let raw = take_flag_value(flag, inline_value, tokens, &mut idx)?;
                args.time_cutoff = Some(parse_f64_arg(raw.as_str(), flag)?);
            }
            "--config" => {
                let raw = take_flag_value(flag, inline_value, tokens, &mut idx)?;
                args.config = Some(PathBuf::from(raw));
            }
            "--output" => {
                let raw = take_flag_value(flag, inline_value, tokens, &mut idx)?;
                args.output = Some(PathBuf::from(raw));
            }
            "--log-level" => {
                let raw = take_flag_value(flag, inline_value, tokens, &mut idx)?;
                args.log_level = Some(raw);
            }
            "--no-warnings" => {
                if inline_value.is_some() {
                    return Err(CliError::invalid_input("--no-warnings takes no value"));
                }
                args.no_warnings = true;
            }
            other => {
                return Err(CliError::invalid_input(format!(
                    "unknown run option '{other}'"
                )));
            }
        }
        idx += 1;
    }

    if args.input.as_os_str().is_empty() {
        return Err(CliError::invalid_input("run requires --input <path>"));
    }

    Ok(args)
}

fn parse_windows_args(tokens: &[String]) -> Result<WindowsArgs, CliError> {
    let mut args = WindowsArgs::default();
    let mut seen_magnitudes = false;
    let mut idx = 0usize;
    while idx < tokens.len() {
        let (flag, inline_value) = split_flag(tokens[idx].as_str())?;
        match flag {
            "--magnitudes" => {
                let raw = take_flag_value(flag, inline_value, tokens, &mut idx)?;
                args.magnitudes = parse_f64_list(raw.as_str(), flag)?;
                seen_magnitudes = true;
            }
            "--window" => {
                let raw = take_flag_value(flag, inline_value, tokens, &mut idx)?;
                args.window = WindowMethod::parse(raw.as_str())?;
            }
            "--time-cutoff" => {
                let raw = take_flag_value(flag, inline_value, tokens, &mut idx)?;
                args.time_cutoff = Some(parse_f64_arg(raw.as_str(), flag)?);
            }
            "--output" => {
                let raw = take_flag_value(flag, inline_value, tokens, &mut idx)?;
                args.output = Some(PathBuf::from(raw));
            }
            other => {
                return Err(CliError::invalid_input(format!(
                    "unknown windows option '{other}'"
                )));
            }
        }
        idx += 1;
    }

    if !seen_magnitudes {
        return Err(CliError::invalid_input(
            "windows requires --magnitudes <m1,m2,...>",
        ));
    }

    Ok(args)
}

fn split_flag(token: &str) -> Result<(&str, Option<String>), CliError> {
    if !token.starts_with("--") {
        return Err(CliError::invalid_input(format!(
            "unexpected positional argument '{token}'; expected --flag value"
        )));
    }
    if let Some((flag, value)) = token.split_once('=') {
        return Ok((flag, Some(value.to_string())));
    }
    Ok((token, None))
}

fn take_flag_value(
    flag: &str,
    inline_value: Option<String>,
    tokens: &[String],
    idx: &mut usize,
) -> Result<String, CliError> {
    if let Some(value) = inline_value {
        return Ok(value);
    }

    *idx += 1;
    let value = tokens
        .get(*idx)
        .ok_or_else(|| CliError::invalid_input(format!("{flag} requires a value")))?;
    if value.starts_with("--") {
        return Err(CliError::invalid_input(format!(
            "{flag} requires a value, but got option '{value}'"
        )));
    }
    Ok(value.clone())
}

fn parse_f64_arg(raw: &str, flag: &str) -> Result<f64, CliError> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| CliError::invalid_input(format!("{flag} expects a number, got '{raw}'")))
}

fn parse_f64_list(raw: &str, flag: &str) -> Result<Vec<f64>, CliError> {
    let values = raw
        .split(',')
        .filter(|item| !item.trim().is_empty())
        .map(|item| parse_f64_arg(item, flag))
        .collect::<Result<Vec<_>, _>>()?;
    if values.is_empty() {
        return Err(CliError::invalid_input(format!(
            "{flag} expects at least one number"
        )));
    }
    if let Some(bad) = values.iter().find(|value| !value.is_finite()) {
        return Err(CliError::invalid_input(format!(
            "{flag} values must be finite; got {bad}"
        )));
    }
    Ok(values)
}

fn print_version() {
    println!("decluster {}", env!("CARGO_PKG_VERSION"));
}

fn print_root_help() {
    println!(
        "decluster {}\n\nUSAGE:\n  decluster <COMMAND> [OPTIONS]\n\nCOMMANDS:\n  run       Decluster a CSV earthquake catalog\n  windows   Print space-time windows for a list of magnitudes\n\nGLOBAL OPTIONS:\n  -h, --help      Show help\n  -V, --version   Show version\n\nRun 'decluster <COMMAND> --help' for subcommand options.",
        env!("CARGO_PKG_VERSION")
    );
}

fn print_command_help(command: &str) -> Result<(), CliError> {
    match command {
        "run" => {
            println!(
                "USAGE:\n  decluster run --input <catalog.csv> [OPTIONS]\n\nOPTIONS:\n  --input <path>                                   Required CSV with a header row\n  --window <gardner_knopoff|gruenthal|uhrhammer>   Default: gardner_knopoff\n  --fs-time-prop <float>                           Default: 1.0, within [0, 1]\n  --time-cutoff <days>                             Cap every time window\n  --config <spec.json>                             Base settings; flags override them\n  --output <path>                                  Write JSON output to file\n  --no-warnings                                    Suppress warning log events\n  --log-level <filter>                             Default: warn (RUST_LOG wins)"
            );
            Ok(())
        }
        "windows" => {
            println!(
                "USAGE:\n  decluster windows --magnitudes <m1,m2,...> [OPTIONS]\n\nOPTIONS:\n  --magnitudes <list>                              Required comma-separated magnitudes\n  --window <gardner_knopoff|gruenthal|uhrhammer>   Default: gardner_knopoff\n  --time-cutoff <days>                             Cap every time window\n  --output <path>                                  Write JSON output to file"
            );
            Ok(())
        }
        _ => Err(CliError::invalid_input(format!(
            "unknown command '{command}'; expected one of: run, windows"
        ))),
    }
}

fn init_logging(level: &str) -> Result<(), CliError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level).map_err(|err| {
            CliError::invalid_input(format!("invalid --log-level '{level}': {err}"))
        })?,
    };

    // A subscriber may already be installed when running under a harness.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
    Ok(())
}

fn resolve_spec(args: &RunArgs) -> Result<DeclusterSpec, CliError> {
    let mut spec = match &args.config {
        Some(path) => read_spec(path)?,
        None => DeclusterSpec::default(),
    };
    if let Some(window) = args.window {
        spec.window = window;
    }
    if let Some(fs_time_prop) = args.fs_time_prop {
        spec.fs_time_prop = fs_time_prop;
    }
    if let Some(time_cutoff) = args.time_cutoff {
        spec.time_cutoff = Some(time_cutoff);
    }
    Ok(spec)
}

fn read_spec(path: &Path) -> Result<DeclusterSpec, CliError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| CliError::io(format!("failed to read '{}'", path.display()), source))?;
    serde_json::from_str(raw.as_str())
        .map_err(|source| CliError::json(format!("invalid spec JSON in '{}'", path.display()), source))
}

fn load_catalog(path: &Path) -> Result<LoadedCatalog, CliError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| CliError::io(format!("failed to read '{}'", path.display()), source))?;
    Ok(parse_catalog_csv(raw.as_str())?)
}

fn handle_run(args: RunArgs) -> Result<(), CliError> {
    init_logging(args.log_level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL))?;

    let spec = resolve_spec(&args)?;
    let catalog = load_catalog(&args.input)?;
    let view = catalog.as_view()?;
    tracing::debug!(
        path = %args.input.display(),
        n = view.len(),
        time_source = view.time_source().as_str(),
        window = spec.window.as_str(),
        "catalog loaded"
    );

    let ctx = ExecutionContext::new().with_warnings(!args.no_warnings);
    let result = run_decluster(&view, &spec, &ctx)?;

    let independent_events = result
        .independent_mask()
        .into_iter()
        .filter(|&keep| keep)
        .count();
    let output = RunOutput {
        command: "run",
        input: InputSummary {
            path: args.input.display().to_string(),
            format: "csv",
            n: view.len(),
            time_source: view.time_source(),
        },
        spec,
        summary: ClusterSummary {
            n_clusters: result.n_clusters(),
            independent_events,
            clustered_events: result.len() - result.background_indices().len(),
        },
        result,
    };
    write_json_output(&output, args.output.as_deref())
}

fn handle_windows(args: WindowsArgs) -> Result<(), CliError> {
    init_logging(DEFAULT_LOG_LEVEL)?;

    let windows = compute_windows(&args.window, &args.magnitudes, args.time_cutoff)?;
    let rows = window_rows(&args.magnitudes, &windows);

    let output = WindowsOutput {
        command: "windows",
        window: args.window,
        time_cutoff: args.time_cutoff,
        windows: rows,
    };
    write_json_output(&output, args.output.as_deref())
}

fn window_rows(magnitudes: &[f64], windows: &Windows) -> Vec<WindowRow> {
    magnitudes
        .iter()
        .enumerate()
        .map(|(idx, &magnitude)| {
            let window = windows.get(idx).filter(|window| !window.is_empty());
            WindowRow {
                magnitude,
                empty: window.is_none(),
                space_km: window.map(|window| window.space_km),
                time_days: window.map(|window| window.time_days),
                time_ms: windows.time_delta(idx).map(|delta| delta.num_milliseconds()),
            }
        })
        .collect()
}

fn write_json_output<T: Serialize>(
    payload: &T,
    output_path: Option<&Path>,
) -> Result<(), CliError> {
    let encoded = serde_json::to_string_pretty(payload)
        .map_err(|source| CliError::json("failed to serialize JSON output", source))?;

    if let Some(path) = output_path {
        fs::write(path, format!("{encoded}\n"))
            .map_err(|source| CliError::io(format!("failed to write '{}'", path.display()), source))
    } else {
        println!("{encoded}");
        Ok(())
    }
}

fn emit_structured_error(err: &CliError) {
    let envelope = ErrorEnvelope {
        error: ErrorPayload {
            code: err.code().to_string(),
            message: err.to_string(),
        },
    };

    match serde_json::to_string_pretty(&envelope) {
        Ok(json) => eprintln!("{json}"),
        Err(_) => eprintln!(
            "{{\"error\":{{\"code\":\"{}\",\"message\":\"{}\"}}}}",
            err.code(),
            err
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::{
        CliError, Command, RunArgs, WindowRow, parse_cli, parse_f64_list, parse_run_args,
        parse_windows_args, resolve_spec, window_rows,
    };
    use decluster_core::DeclusterError;
    use decluster_windows::{WindowMethod, compute_windows};
    use std::path::PathBuf;

    fn tokens(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|token| token.to_string()).collect()
    }

    #[test]
    fn run_args_accept_split_and_inline_values() {
        let args = parse_run_args(&tokens(&[
            "--input",
            "catalog.csv",
            "--window=gk",
            "--fs-time-prop",
            "0.5",
            "--time-cutoff=100",
            "--no-warnings",
            "--log-level",
            "debug",
        ]))
        .expect("args should parse");

        assert_eq!(args.input, PathBuf::from("catalog.csv"));
        assert_eq!(args.window, Some(WindowMethod::GardnerKnopoff));
        assert_eq!(args.fs_time_prop, Some(0.5));
        assert_eq!(args.time_cutoff, Some(100.0));
        assert!(args.no_warnings);
        assert_eq!(args.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn run_args_require_input_and_reject_unknown_flags() {
        let err = parse_run_args(&tokens(&["--window", "gk"])).expect_err("input is required");
        assert!(err.to_string().contains("run requires --input"));

        let err = parse_run_args(&tokens(&["--input", "a.csv", "--bogus"]))
            .expect_err("unknown flag must fail");
        assert!(err.to_string().contains("unknown run option '--bogus'"));

        let err = parse_run_args(&tokens(&["--input", "--window"]))
            .expect_err("missing value must fail");
        assert!(err.to_string().contains("--input requires a value"));

        let err = parse_run_args(&tokens(&["catalog.csv"])).expect_err("positional must fail");
        assert!(err.to_string().contains("unexpected positional argument"));
    }

    #[test]
    fn bad_window_name_maps_to_configuration_error() {
        let err = parse_run_args(&tokens(&["--input", "a.csv", "--window", "reasenberg"]))
            .expect_err("unknown window must fail");
        assert!(matches!(
            err,
            CliError::Decluster(DeclusterError::InvalidConfiguration(_))
        ));
        assert_eq!(err.code(), "invalid_configuration");
    }

    #[test]
    fn flags_override_default_spec() {
        let args = RunArgs {
            input: PathBuf::from("a.csv"),
            window: Some(WindowMethod::Uhrhammer),
            time_cutoff: Some(30.0),
            ..RunArgs::default()
        };
        let spec = resolve_spec(&args).expect("spec should resolve");
        assert_eq!(spec.window, WindowMethod::Uhrhammer);
        assert_eq!(spec.fs_time_prop, 1.0);
        assert_eq!(spec.time_cutoff, Some(30.0));
    }

    #[test]
    fn missing_config_file_is_an_io_error() {
        let args = RunArgs {
            input: PathBuf::from("a.csv"),
            config: Some(PathBuf::from("/definitely/not/here/spec.json")),
            ..RunArgs::default()
        };
        let err = resolve_spec(&args).expect_err("missing file must fail");
        assert_eq!(err.code(), "io_error");
    }

    #[test]
    fn windows_args_parse_magnitude_lists() {
        let args = parse_windows_args(&tokens(&[
            "--magnitudes",
            "2.0, 5.0,7",
            "--window",
            "gruenthal",
        ]))
        .expect("args should parse");
        assert_eq!(args.magnitudes, vec![2.0, 5.0, 7.0]);
        assert_eq!(args.window, WindowMethod::Gruenthal);

        let err = parse_windows_args(&tokens(&["--window", "gk"]))
            .expect_err("magnitudes are required");
        assert!(err.to_string().contains("windows requires --magnitudes"));

        let err = parse_f64_list(",,", "--magnitudes").expect_err("empty list must fail");
        assert!(err.to_string().contains("at least one number"));
        let err = parse_f64_list("2.0,abc", "--magnitudes").expect_err("bad number must fail");
        assert!(err.to_string().contains("got 'abc'"));
        let err = parse_f64_list("2.0,inf", "--magnitudes").expect_err("inf must fail");
        assert!(err.to_string().contains("must be finite"));
    }

    #[test]
    fn window_rows_render_capped_durations_and_empty_windows() {
        let magnitudes = [3.0, -0.5];
        let windows = compute_windows(&WindowMethod::Gruenthal, &magnitudes, Some(1.5))
            .expect("windows should compute");
        let rows = window_rows(&magnitudes, &windows);

        assert_eq!(rows.len(), 2);
        assert!(!rows[0].empty);
        assert_eq!(rows[0].time_days, Some(1.5));
        assert_eq!(rows[0].time_ms, Some(129_600_000));
        assert!(rows[0].space_km.is_some_and(|space| space > 30.0));
        assert_eq!(
            rows[1],
            WindowRow {
                magnitude: -0.5,
                empty: true,
                space_km: None,
                time_days: None,
                time_ms: None,
            }
        );
    }

    #[test]
    fn unknown_command_is_rejected() {
        let err = parse_cli(&tokens(&["analyze"])).err().expect("unknown command must fail");
        assert!(err.to_string().contains("unknown command 'analyze'"));
        assert_eq!(err.code(), "invalid_input");
    }

    #[test]
    fn dispatches_known_commands() {
        let cli = parse_cli(&tokens(&["windows", "--magnitudes", "3.0"]))
            .expect("should parse")
            .expect("command expected");
        assert!(matches!(cli.command, Command::Windows(_)));

        let cli = parse_cli(&tokens(&["run", "--input", "a.csv"]))
            .expect("should parse")
            .expect("command expected");
        assert!(matches!(cli.command, Command::Run(_)));
    }
}
