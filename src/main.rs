//! CLI entry point for the EVS attitude aggregation tool.
//!
//! Provides subcommands for computing the per-country attitude table and for
//! inspecting how a dataset classifies without writing anything.

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use evs_attitudes::analysis::analyzer::{AnalyzeOptions, OutputFormat, analyze, run};
use evs_attitudes::config::ColumnMap;
use evs_attitudes::dataset::{CountryOrder, load_respondents};
use evs_attitudes::output::print_pretty;
use std::ffi::OsStr;
use std::path::Path;
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "evs_attitudes")]
#[command(about = "Per-country attitude scores of religious and non-religious respondents", long_about = None)]
struct Cli {
    /// Also write JSON logs to this file (rotated daily)
    #[arg(long, global = true, value_name = "PATH")]
    log_file: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the per-country table and write it out
    Process {
        /// Survey dataset (CSV with value labels, optionally .gz)
        #[arg(short, long, default_value = "EVS2017.csv")]
        input: String,

        /// File to write results to
        #[arg(short, long, default_value = "processed_data.csv")]
        output: String,

        /// Output encoding
        #[arg(short, long, value_enum, default_value_t = Format::Csv)]
        format: Format,

        #[command(flatten)]
        selection: Selection,
    },
    /// Load and classify the dataset, logging per-country diagnostics
    Inspect {
        /// Survey dataset (CSV with value labels, optionally .gz)
        #[arg(short, long, default_value = "EVS2017.csv")]
        input: String,

        #[command(flatten)]
        selection: Selection,
    },
}

#[derive(clap::Args)]
struct Selection {
    /// Order of countries in the output
    #[arg(long, value_enum, default_value_t = Order::FirstSeen)]
    order: Order,

    /// Only include this country code (repeatable)
    #[arg(short, long = "country", value_name = "CODE")]
    countries: Vec<String>,

    /// JSON file overriding dataset column names
    #[arg(long, value_name = "FILE")]
    columns: Option<String>,
}

impl Selection {
    /// Loads the column mapping, if any, and builds the analysis options.
    fn resolve(self) -> Result<(ColumnMap, AnalyzeOptions)> {
        let columns = match &self.columns {
            Some(path) => ColumnMap::load(path)?,
            None => ColumnMap::default(),
        };
        let options = AnalyzeOptions {
            order: self.order.into(),
            countries: self.countries,
        };
        Ok((columns, options))
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Csv,
    Json,
}

impl From<Format> for OutputFormat {
    fn from(f: Format) -> Self {
        match f {
            Format::Csv => OutputFormat::Csv,
            Format::Json => OutputFormat::Json,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Order {
    FirstSeen,
    Sorted,
}

impl From<Order> for CountryOrder {
    fn from(o: Order) -> Self {
        match o {
            Order::FirstSeen => CountryOrder::FirstSeen,
            Order::Sorted => CountryOrder::Sorted,
        }
    }
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    let cli = Cli::parse();

    // Logging setup: colored stderr + optional JSON rolling log file
    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let (json_layer, _file_guard) = match &cli.log_file {
        Some(log_file_path) => {
            let log_dir = Path::new(log_file_path)
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or(Path::new("."));
            let log_file_name = Path::new(log_file_path)
                .file_name()
                .unwrap_or(OsStr::new("evs_attitudes.log"));

            let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
            let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

            let layer = fmt::layer()
                .json()
                .with_current_span(true)
                .with_span_list(true)
                .with_writer(non_blocking_file)
                .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    match cli.command {
        Commands::Process {
            input,
            output,
            format,
            selection,
        } => {
            let (columns, options) = selection.resolve()?;
            let aggregates = run(&input, &output, format.into(), &columns, &options)?;
            print_pretty(&aggregates);
        }
        Commands::Inspect { input, selection } => {
            let (columns, options) = selection.resolve()?;
            let respondents = load_respondents(&input, &columns)?;
            let aggregates = analyze(&respondents, &options);

            for a in &aggregates {
                let d = &a.diagnostics;
                info!(
                    country = %a.country,
                    total = d.total,
                    rel = a.rel,
                    nonrel = a.nonrel,
                    excluded = d.excluded,
                    n_adp_rel = d.n_adp_rel,
                    n_adp_nonrel = d.n_adp_nonrel,
                    n_div_rel = d.n_div_rel,
                    n_div_nonrel = d.n_div_nonrel,
                    "Country"
                );
            }

            let excluded: usize = aggregates.iter().map(|a| a.diagnostics.excluded).sum();
            let incomplete = aggregates
                .iter()
                .filter(|a| {
                    [a.a_adp_rel, a.a_adp_nonrel, a.a_div_rel, a.a_div_nonrel]
                        .iter()
                        .any(Option::is_none)
                })
                .count();
            if incomplete > 0 {
                warn!(incomplete, "Countries with at least one empty mean");
            }

            info!(
                respondents = respondents.len(),
                countries = aggregates.len(),
                excluded,
                "Dataset summary"
            );
        }
    }

    Ok(())
}
