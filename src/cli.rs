//! Command-line arguments.

use crate::pipeline::ReportOptions;
use clap::Parser;
use std::path::PathBuf;

/// Customer purchasing behavior report: summary statistics, segment analysis
/// and charts for a customer CSV
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input CSV file
    #[arg(short, long, default_value = "Customer-Purchasing-Behaviors.csv")]
    pub input: PathBuf,

    /// Show every row of the dataset in the raw data section
    #[arg(long)]
    pub raw: bool,

    /// Rows shown by the head and tail sections
    #[arg(long, default_value = "5")]
    pub preview_rows: usize,

    /// Rows drawn at random for the sample section
    #[arg(long, default_value = "10")]
    pub sample_size: usize,

    /// Number of top spenders per visit to list
    #[arg(long, default_value = "5")]
    pub top: usize,

    /// Directory the chart images are written to
    #[arg(long, default_value = ".")]
    pub charts_dir: PathBuf,

    /// Skip chart rendering
    #[arg(long)]
    pub no_charts: bool,

    /// Also write headline findings as JSON to this path
    #[arg(long)]
    pub summary_json: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    pub fn report_options(&self) -> ReportOptions {
        ReportOptions {
            show_raw: self.raw,
            preview_rows: self.preview_rows,
            sample_size: self.sample_size,
            top_k: self.top,
            charts_dir: (!self.no_charts).then(|| self.charts_dir.clone()),
        }
    }

    /// Default log filter for the verbosity level; `RUST_LOG` wins when set.
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }
}
