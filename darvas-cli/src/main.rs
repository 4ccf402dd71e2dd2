//! Darvas CLI — channel breakout scan, raw signals, report refinement.
//!
//! Commands:
//! - `scan`: fetch every symbol, match breakout trades, write the refined
//!   trade report and manifest, then publish/notify
//! - `signals`: same inputs, writes every buy/sell bar instead of trades
//! - `refine`: dedup and re-sort an existing (possibly combined) trade report

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use darvas_core::data::load_symbol_list;
use darvas_runner::config::LoggingSection;
use darvas_runner::reporting::{refine_report, ReportPaths};
use darvas_runner::{
    init_from_config, publish_and_notify, run_scan, DataSources, DirectoryPublisher, LogNotifier,
    Notifier, PostReportStatus, Publisher, ReportSummary, ReportWriter, ScanConfig, ScanOptions,
    ScanOutcome, SourceKind,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "darvas",
    about = "Darvas box scanner: channel breakout trades from daily prices"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan the symbol list and write the refined trade report.
    Scan {
        #[command(flatten)]
        data: DataArgs,

        /// Copy the finished report into this directory.
        #[arg(long)]
        publish_dir: Option<PathBuf>,

        /// Log a summary notification once the report is written.
        #[arg(long, default_value_t = false)]
        notify: bool,

        /// Also write a pretty JSON copy of the report.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Write every buy/sell signal bar for the symbol list.
    Signals {
        #[command(flatten)]
        data: DataArgs,
    },
    /// Dedup and re-sort an existing trade report.
    Refine {
        /// Trade report CSV to read.
        #[arg(long)]
        input: PathBuf,

        /// Where to write the refined report. Defaults to overwriting --input.
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

/// Inputs shared by `scan` and `signals`. Flags override the config file.
#[derive(Args)]
struct DataArgs {
    /// Path to a TOML config file. Without it, defaults apply.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Symbol list CSV (column `stock_symbol`).
    #[arg(long)]
    symbols: Option<PathBuf>,

    /// Start date (YYYY-MM-DD).
    #[arg(long)]
    start: Option<String>,

    /// End date (YYYY-MM-DD). Defaults to today.
    #[arg(long)]
    end: Option<String>,

    /// Channel lookback in bars.
    #[arg(long)]
    window: Option<usize>,

    /// Worker threads.
    #[arg(long)]
    workers: Option<usize>,

    /// Where price history comes from.
    #[arg(long, value_enum)]
    source: Option<SourceArg>,

    /// Directory of <SYMBOL>.csv files for `--source csv_dir`.
    #[arg(long)]
    csv_dir: Option<PathBuf>,

    /// Do not fetch live quotes for open positions.
    #[arg(long, default_value_t = false)]
    no_quotes: bool,

    /// Report directory.
    #[arg(long)]
    output_dir: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum SourceArg {
    Yahoo,
    #[value(name = "csv_dir")]
    CsvDir,
    Synthetic,
}

impl From<SourceArg> for SourceKind {
    fn from(arg: SourceArg) -> Self {
        match arg {
            SourceArg::Yahoo => SourceKind::Yahoo,
            SourceArg::CsvDir => SourceKind::CsvDir,
            SourceArg::Synthetic => SourceKind::Synthetic,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Scan {
            data,
            publish_dir,
            notify,
            json,
        } => {
            let mut config = load_config(&data)?;
            if publish_dir.is_some() {
                config.publish.target_dir = publish_dir;
            }
            config.notify.enabled |= notify;
            config.output.write_json |= json;
            run_scan_cmd(&config)
        }
        Commands::Signals { data } => run_signals_cmd(&load_config(&data)?),
        Commands::Refine { input, output } => run_refine_cmd(input, output),
    }
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("invalid date '{s}', expected YYYY-MM-DD"))
}

fn load_config(args: &DataArgs) -> Result<ScanConfig> {
    let mut config = match &args.config {
        Some(path) => ScanConfig::from_file(path)?,
        None => ScanConfig::default(),
    };

    if let Some(symbols) = &args.symbols {
        config.scan.symbols_file = symbols.clone();
    }
    if let Some(start) = &args.start {
        config.scan.start_date = parse_date(start)?;
    }
    if let Some(end) = &args.end {
        config.scan.end_date = Some(parse_date(end)?);
    }
    if let Some(window) = args.window {
        config.scan.window = window;
    }
    if let Some(workers) = args.workers {
        config.scan.workers = workers;
    }
    if let Some(source) = args.source {
        config.data.source = source.into();
    }
    if let Some(csv_dir) = &args.csv_dir {
        config.data.csv_dir = csv_dir.clone();
    }
    if args.no_quotes {
        config.quote.enabled = false;
    }
    if let Some(dir) = &args.output_dir {
        config.output.dir = dir.clone();
    }

    config.validate()?;
    Ok(config)
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Shared front half of `scan` and `signals`: roster → outcome.
fn scan_from_config(config: &ScanConfig, with_quotes: bool) -> Result<(ScanOutcome, ScanOptions)> {
    init_from_config(&config.logging)?;

    let opts = config.scan_options(today());
    let symbols = load_symbol_list(&config.scan.symbols_file, &config.scan.symbol_column)?;
    if symbols.is_empty() {
        tracing::warn!(
            file = %config.scan.symbols_file.display(),
            "symbol list is empty"
        );
    }

    let sources = DataSources::from_config(config)?;
    let quotes = sources.quotes(with_quotes && config.quote.enabled, opts.start, opts.end);
    let outcome = run_scan(&symbols, sources.provider(), quotes.as_ref(), &opts)?;
    Ok((outcome, opts))
}

fn run_scan_cmd(config: &ScanConfig) -> Result<()> {
    let (outcome, opts) = scan_from_config(config, true)?;

    let writer = ReportWriter::new(&config.output)?;
    let paths = writer.save_scan(&outcome, &opts, config.data.source.as_str())?;

    let publisher = config.publish.target_dir.clone().map(DirectoryPublisher::new);
    let notifier = config.notify.enabled.then_some(LogNotifier);
    let summary = ReportSummary::new(today(), &outcome.trades);
    let status = publish_and_notify(
        &paths.report,
        &summary,
        publisher.as_ref().map(|p| p as &dyn Publisher),
        notifier.as_ref().map(|n| n as &dyn Notifier),
    );

    print_summary(&outcome, &paths, &status);
    Ok(())
}

fn run_signals_cmd(config: &ScanConfig) -> Result<()> {
    let (outcome, _) = scan_from_config(config, false)?;
    let writer = ReportWriter::new(&config.output)?;
    let path = writer.save_signals(&outcome.signals)?;

    println!(
        "Instruments: {} processed, {} skipped",
        outcome.processed,
        outcome.skipped.len()
    );
    println!("Signals:     {}", outcome.signals.len());
    println!("Report:      {}", path.display());
    Ok(())
}

fn run_refine_cmd(input: PathBuf, output: Option<PathBuf>) -> Result<()> {
    init_from_config(&LoggingSection::default())?;

    let path = output.unwrap_or_else(|| input.clone());
    let stats = refine_report(&input, &path)?;

    println!(
        "Rows: {} in, {} out ({} duplicate exit(s) dropped)",
        stats.input, stats.output, stats.collisions
    );
    println!("Report: {}", path.display());
    Ok(())
}

fn print_summary(outcome: &ScanOutcome, paths: &ReportPaths, status: &PostReportStatus) {
    println!();
    println!("=== Darvas Box Scan ===");
    println!("Processed:      {}", outcome.processed);
    println!("Skipped:        {}", outcome.skipped.len());
    for skipped in &outcome.skipped {
        println!("  {:<16} {}", skipped.symbol, skipped.reason);
    }
    println!("Trades:         {}", outcome.trades.len());
    println!("Open positions: {}", outcome.open_count());
    println!("Report:         {}", paths.report.display());
    if let Some(json) = &paths.report_json {
        println!("JSON:           {}", json.display());
    }
    println!("Manifest:       {}", paths.manifest.display());

    if let Some(dest) = &status.published_to {
        println!("Published:      {}", dest.display());
    }
    if let Some(err) = &status.publish_error {
        println!("Publish failed: {err}");
    }
    if let Some(err) = &status.notify_error {
        println!("Notify failed:  {err}");
    }
}
