// Entry point: load the dataset once, build the report, print it.
//
// A load failure aborts with a non-zero exit; everything after that is
// best-effort (chart problems are reported inside the report itself).
use anyhow::{Context, Result};
use clap::Parser;
use purchase_dashboard::{build_report, load_table, output, Args};
use std::io::{self, Write};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let args = Args::parse();

    // RUST_LOG wins over -v
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(args.log_filter()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    let (table, load_report) = load_table(&args.input)
        .with_context(|| format!("failed to load dataset from {}", args.input.display()))?;

    let opts = args.report_options();
    if let Some(dir) = &opts.charts_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create chart directory {}", dir.display()))?;
    }

    let (report, summary) = build_report(&table, &load_report, &opts, &mut rand::thread_rng());

    let stdout = io::stdout();
    let mut out = stdout.lock();
    output::render(&report, &mut out)?;
    out.flush()?;

    if let Some(path) = &args.summary_json {
        output::write_json(path, &summary)
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!(path = %path.display(), "summary written");
    }
    Ok(())
}
