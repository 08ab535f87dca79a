use std::ffi::OsString;
use std::path::Path;

use clap::{ArgMatches, CommandFactory, FromArgMatches};

use crate::app::{self, RunReport};
use crate::args::LoadArgs;
use crate::config::{DEFAULT_CONFIG_FILES, LoadTestConfig};
use crate::error::{AppError, AppResult};

/// Parses the command line, runs the load test, and prints the report.
///
/// # Errors
///
/// Returns an error for invalid arguments or configuration, an HTTP client
/// that cannot be built, or a report that cannot be written.
pub fn run() -> AppResult<()> {
    let (mut args, matches) = match parse_args()? {
        Some(parsed) => parsed,
        None => return Ok(()),
    };

    crate::logger::init_logging(args.verbose, args.no_color);

    apply_config(&mut args, &matches)?;
    let config = LoadTestConfig::from_args(&args).map_err(|err| {
        tracing::error!("Invalid configuration: {}", err);
        AppError::from(err)
    })?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(run_async(&args, &config))
}

fn parse_args() -> AppResult<Option<(LoadArgs, ArgMatches)>> {
    let mut cmd = LoadArgs::command();
    let raw_args: Vec<OsString> = std::env::args_os().collect();

    if should_show_help(&raw_args) {
        cmd.print_help()?;
        println!();
        return Ok(None);
    }

    let matches = cmd.get_matches_from(raw_args);
    let args = LoadArgs::from_arg_matches(&matches)?;

    Ok(Some((args, matches)))
}

fn should_show_help(raw_args: &[OsString]) -> bool {
    let treat_as_empty =
        matches!(raw_args, [] | [_]) || matches!(raw_args, [_, second] if second == "--");
    if !treat_as_empty {
        return false;
    }

    !has_default_config() && std::env::var_os("LOADPROBE_URL").is_none()
}

fn has_default_config() -> bool {
    DEFAULT_CONFIG_FILES
        .iter()
        .any(|path| Path::new(path).exists())
}

fn apply_config(args: &mut LoadArgs, matches: &ArgMatches) -> AppResult<()> {
    if let Some(config) = crate::config::load_config(args.config.as_deref())? {
        crate::config::apply_config(args, matches, &config)?;
    }
    Ok(())
}

async fn run_async(args: &LoadArgs, config: &LoadTestConfig) -> AppResult<()> {
    let report = app::run_load_test(config).await?;
    app::print_summary(&report)?;
    write_output(args, &report).await
}

async fn write_output(args: &LoadArgs, report: &RunReport) -> AppResult<()> {
    let Some(path) = args.output.as_deref() else {
        if args.output_format.is_some() {
            tracing::warn!("--output-format has no effect without --output.");
        }
        return Ok(());
    };
    let format = app::resolve_output_format(path, args.output_format);
    app::export_report(path, format, report).await?;
    tracing::info!("Report written to {}.", path);
    Ok(())
}
