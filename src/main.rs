//! Dilution - VC investment calculator with a terminal form

mod batch;
mod config;
mod error;
mod logging;
#[cfg(feature = "tui")]
mod tui;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use dilution_core::{CsvSink, Session, SheetsSink};
use dilution_engine::format::parse_amount;

use batch::OutputFormat;
use config::{Config, load_config};

#[derive(Parser, Debug)]
#[command(
    name = "dilution",
    version,
    about = "Estimate ownership, dilution and exit value across two funding rounds."
)]
struct Args {
    /// Config file (default: <config dir>/dilution/config.toml).
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Calculate once from config and flags, print the results and exit.
    #[arg(short, long)]
    batch: bool,

    /// Output format for --batch.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Total fund size.
    #[arg(long, value_name = "AMOUNT", value_parser = parse_amount_arg)]
    fund_size: Option<f64>,

    /// Your investment in round 1.
    #[arg(long, value_name = "AMOUNT", value_parser = parse_amount_arg)]
    investment: Option<f64>,

    /// Total raised in round 1.
    #[arg(long, value_name = "AMOUNT", value_parser = parse_amount_arg)]
    raised: Option<f64>,

    /// Pre-money valuation in round 1.
    #[arg(long, value_name = "AMOUNT", value_parser = parse_amount_arg)]
    pre_money: Option<f64>,

    /// Include round 2.
    #[arg(long, conflicts_with = "no_round_two")]
    round_two: bool,

    /// Leave round 2 out.
    #[arg(long)]
    no_round_two: bool,

    /// New funds raised in round 2.
    #[arg(long, value_name = "AMOUNT", value_parser = parse_amount_arg)]
    new_raise: Option<f64>,

    /// Pre-money valuation in round 2.
    #[arg(long = "pre-money-2", value_name = "AMOUNT", value_parser = parse_amount_arg)]
    pre_money_2: Option<f64>,

    /// Google spreadsheet URL or title to append results to.
    #[arg(long, value_name = "URL|NAME")]
    sheet: Option<String>,

    /// Worksheet inside the spreadsheet (default: Sheet1).
    #[arg(long, value_name = "NAME")]
    worksheet: Option<String>,

    /// Local CSV file to append results to.
    #[arg(long, value_name = "FILE")]
    csv: Option<PathBuf>,

    /// Do not write results anywhere, even if configured.
    #[arg(long)]
    no_persist: bool,

    /// Append log records to this file.
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,

    /// Log level: off, error, warn, info, debug or trace.
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<String>,
}

fn parse_amount_arg(input: &str) -> std::result::Result<f64, String> {
    match parse_amount(input) {
        Some(value) if value >= 0.0 => Ok(value),
        Some(_) => Err("amount must not be negative".to_string()),
        None => Err(format!("'{}' is not an amount", input)),
    }
}

/// Layer command line flags over the config file.
fn apply_args(config: &mut Config, args: &Args) {
    let form = &mut config.defaults;
    let overrides = [
        (&mut form.fund_size, args.fund_size),
        (&mut form.your_investment, args.investment),
        (&mut form.total_raised_round1, args.raised),
        (&mut form.pre_money_round1, args.pre_money),
        (&mut form.new_raise, args.new_raise),
        (&mut form.pre_money_round2, args.pre_money_2),
    ];
    for (slot, value) in overrides {
        if let Some(value) = value {
            *slot = value;
        }
    }
    if args.round_two {
        form.include_round_two = true;
    }
    if args.no_round_two {
        form.include_round_two = false;
    }

    if let Some(sheet) = &args.sheet {
        config.sheet.target = Some(sheet.clone());
    }
    if let Some(worksheet) = &args.worksheet {
        config.sheet.worksheet = worksheet.clone();
    }
    if let Some(csv) = &args.csv {
        config.csv.path = Some(csv.clone());
    }
    if let Some(file) = &args.log_file {
        config.log.file = Some(file.clone());
    }
    if let Some(level) = &args.log_level {
        config.log.level = level.clone();
    }
}

/// Build the session and its sinks. Sinks that cannot be set up are
/// reported and left out; the calculator still works without them.
fn build_session(config: &Config, persist: bool) -> (Session, Vec<String>) {
    let mut session = Session::new(config.defaults);
    let mut errors = Vec::new();
    if !persist {
        return (session, errors);
    }

    if let Some(path) = &config.csv.path {
        session.add_sink(Box::new(CsvSink::new(path)));
    }
    if config.sheet.target.is_some() {
        match SheetsSink::from_config(&config.sheet) {
            Ok(sink) => session.add_sink(Box::new(sink)),
            Err(e) => {
                log::warn!("Spreadsheet ledger disabled: {}", e);
                errors.push(e.to_string());
            }
        }
    }
    (session, errors)
}

fn init_logging(config: &Config) -> Result<()> {
    let Some(path) = &config.log.file else {
        return Ok(());
    };
    let level = config.log.level_filter()?;
    logging::init(path, level).with_context(|| "could not start logging")?;
    Ok(())
}

fn main() {
    let args = Args::parse();

    let (mut config, warnings) = load_config(args.config.as_deref());
    for warning in &warnings {
        eprintln!("Warning: {}", warning);
    }
    apply_args(&mut config, &args);

    if let Err(e) = init_logging(&config) {
        eprintln!("Warning: {:#}", e);
    }

    let (mut session, setup_errors) = build_session(&config, !args.no_persist);

    if args.batch {
        let code = batch::run(&mut session, args.format, &setup_errors);
        std::process::exit(code);
    }

    if let Err(e) = run_interactive(session, setup_errors) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

#[cfg(feature = "tui")]
fn run_interactive(session: Session, setup_errors: Vec<String>) -> Result<()> {
    let mut app = tui::App::new(session, setup_errors);
    tui::run(&mut app).context("terminal error")
}

#[cfg(not(feature = "tui"))]
fn run_interactive(_session: Session, _setup_errors: Vec<String>) -> Result<()> {
    anyhow::bail!("built without the terminal UI; use --batch")
}
