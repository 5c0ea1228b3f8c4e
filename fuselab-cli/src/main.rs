//! FuseLab CLI — run, validate, and demo the fusion pipeline.
//!
//! Commands:
//! - `run` — execute the pipeline over an input directory of source CSVs
//! - `validate` — schema-check an input directory without running
//! - `synthetic` — generate deterministic synthetic source CSVs

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use fuselab_runner::loader::{load_sources, SourcePaths};
use fuselab_runner::pipeline::execute;
use fuselab_runner::synthetic::write_synthetic_sources;
use fuselab_runner::{CsvSink, PipelineConfig, StdoutProgress};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "fuselab",
    about = "FuseLab CLI — cross-source data fusion and derived metrics"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute the pipeline over an input directory of source CSVs.
    Run {
        /// Path to a TOML config file. Defaults are used when absent.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Directory holding the five source CSVs.
        #[arg(long, default_value = "data")]
        input_dir: PathBuf,

        /// Directory for the output tables.
        #[arg(long, default_value = "results")]
        output_dir: PathBuf,

        /// Analysis window start (YYYY-MM-DD), overriding the config.
        #[arg(long)]
        start: Option<String>,

        /// Analysis window end (YYYY-MM-DD), overriding the config.
        #[arg(long)]
        end: Option<String>,
    },
    /// Schema-check an input directory without running the pipeline.
    Validate {
        /// Directory holding the five source CSVs.
        #[arg(long, default_value = "data")]
        input_dir: PathBuf,
    },
    /// Generate deterministic synthetic source CSVs.
    Synthetic {
        /// Directory to write the source CSVs into.
        #[arg(long, default_value = "data")]
        output_dir: PathBuf,

        /// First date of generated data (YYYY-MM-DD).
        #[arg(long, default_value = "2018-01-01")]
        start: String,

        /// Last date of generated data (YYYY-MM-DD).
        #[arg(long, default_value = "2018-12-31")]
        end: String,

        /// Tickers to generate (e.g. AAPL MSFT XOM).
        #[arg(required = true)]
        tickers: Vec<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            input_dir,
            output_dir,
            start,
            end,
        } => run_pipeline_cmd(config, input_dir, output_dir, start, end),
        Commands::Validate { input_dir } => validate_cmd(input_dir),
        Commands::Synthetic {
            output_dir,
            start,
            end,
            tickers,
        } => synthetic_cmd(output_dir, &start, &end, tickers),
    }
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("invalid date '{s}' (expected YYYY-MM-DD)"))
}

fn run_pipeline_cmd(
    config_path: Option<PathBuf>,
    input_dir: PathBuf,
    output_dir: PathBuf,
    start: Option<String>,
    end: Option<String>,
) -> Result<()> {
    let mut config = match config_path {
        Some(path) => PipelineConfig::from_toml_file(&path)?,
        None => PipelineConfig::default(),
    };
    if let Some(s) = start {
        config.start = Some(parse_date(&s)?);
    }
    if let Some(e) = end {
        config.end = Some(parse_date(&e)?);
    }
    config.validate()?;

    let paths = SourcePaths::from_dir(&input_dir);
    let mut sink = CsvSink::new(&output_dir);
    let summary = execute(&paths, &config, &mut sink, Some(&StdoutProgress))?;

    println!("\n{}", summary.render_text());
    println!("output written to {}", output_dir.display());
    Ok(())
}

fn validate_cmd(input_dir: PathBuf) -> Result<()> {
    let paths = SourcePaths::from_dir(&input_dir);
    let sources = load_sources(&paths)?;
    println!("all 5 sources present and structurally valid:");
    println!("  stock: {} rows", sources.stock.height());
    println!("  index: {} rows", sources.index.height());
    println!("  weather: {} rows", sources.weather.height());
    println!("  sentiment_daily: {} rows", sources.sentiment_daily.height());
    println!(
        "  sentiment_weekly: {} rows",
        sources.sentiment_weekly.height()
    );
    Ok(())
}

fn synthetic_cmd(output_dir: PathBuf, start: &str, end: &str, tickers: Vec<String>) -> Result<()> {
    let start = parse_date(start)?;
    let end = parse_date(end)?;
    if start > end {
        bail!("start {start} is after end {end}");
    }
    std::fs::create_dir_all(&output_dir)
        .with_context(|| format!("cannot create {}", output_dir.display()))?;

    let ticker_refs: Vec<&str> = tickers.iter().map(String::as_str).collect();
    write_synthetic_sources(&output_dir, start, end, &ticker_refs)?;
    println!(
        "wrote synthetic sources for {} tickers ({start}..={end}) to {}",
        tickers.len(),
        output_dir.display()
    );
    Ok(())
}
