//! Assembles the report: enrich, compute, then lay out the sections in their
//! fixed order. The table is passed in explicitly; nothing is held globally.

use crate::charts::{render_age_histogram, render_income_scatter, ChartArtifact};
use crate::enrich::enrich;
use crate::error::ChartError;
use crate::loader::LoadReport;
use crate::output::{Report, Section};
use crate::segments::{
    self, frequency_by_age, frequency_by_region_pair, frequency_loyalty_correlation,
    loyalty_tier_counts, region_counts, sales_by_region, top_spenders_per_visit, GroupMean,
};
use crate::summary::{self, IndexedRow};
use crate::types::{
    DescribeRow, DtypeRow, MissingRow, RecordRow, RegionCountRow, RegionTotalRow,
    SummaryStats, Table, TierCountRow, TopSpenderRow,
};
use crate::util::{format_float, format_int, format_number, format_opt};
use rand::Rng;
use std::path::PathBuf;
use tracing::{debug, warn};

pub const TITLE: &str = "Customer Purchasing Behavior Dataset Analysis";
pub const REGION_PAIR: (&str, &str) = ("North", "South");

#[derive(Debug, Clone)]
pub struct ReportOptions {
    /// Show every row in the raw-data section.
    pub show_raw: bool,
    pub preview_rows: usize,
    pub sample_size: usize,
    pub top_k: usize,
    /// Where to write chart PNGs; `None` skips chart rendering.
    pub charts_dir: Option<PathBuf>,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            show_raw: false,
            preview_rows: 5,
            sample_size: 10,
            top_k: 5,
            charts_dir: Some(PathBuf::from(".")),
        }
    }
}

fn record_rows(rows: Vec<IndexedRow<'_>>) -> Vec<RecordRow> {
    rows.into_iter()
        .map(|(index, r)| RecordRow {
            index,
            user_id: r.user_id.map(|v| v.to_string()).unwrap_or_else(|| "NaN".into()),
            age: r.age.map(|v| v.to_string()).unwrap_or_else(|| "NaN".into()),
            annual_income: format_opt(r.annual_income, 2),
            purchase_amount: format_opt(r.purchase_amount, 2),
            loyalty_score: format_opt(r.loyalty_score, 2),
            region: r.region.clone().unwrap_or_else(|| "NaN".into()),
            purchase_frequency: format_opt(r.purchase_frequency, 2),
        })
        .collect()
}

fn describe_group(label: &str, g: &GroupMean) -> String {
    match g.value() {
        Ok(v) => format!("{}: {} ({} rows)", label, format_float(v, 2), g.rows),
        Err(e) => format!("{}: NaN ({})", label, e),
    }
}

fn chart_section(
    title: &str,
    result: Option<Result<ChartArtifact, ChartError>>,
) -> Section {
    let section = Section::new(title);
    match result {
        Some(Ok(artifact)) => section.chart(artifact.path, artifact.data_path),
        Some(Err(e)) => {
            warn!(chart = title, error = %e, "chart not rendered");
            section.text(format!("Chart unavailable: {}", e))
        }
        None => section.text("Chart rendering disabled."),
    }
}

/// Run every computation over `table` and lay the results out as sections.
///
/// `rng` drives the Sample section only.
pub fn build_report<R: Rng + ?Sized>(
    table: &Table,
    load: &LoadReport,
    opts: &ReportOptions,
    rng: &mut R,
) -> (Report, SummaryStats) {
    let mut sections: Vec<Section> = Vec::new();

    // raw data toggle
    let mut raw = Section::new("Raw Data").text(format!(
        "{} rows loaded; {} values could not be read as numbers and were treated as missing.",
        format_int(load.total_rows),
        format_int(load.coercion_errors.len())
    ));
    raw = if opts.show_raw {
        raw.table(record_rows(summary::head(table, table.len())))
    } else {
        raw.text("(hidden; pass --raw to show every row)")
    };
    sections.push(raw);

    let describe: Vec<DescribeRow> = summary::describe(table)
        .into_iter()
        .map(|s| DescribeRow {
            column: s.column.name().to_string(),
            count: s.count,
            mean: format_float(s.mean, 4),
            std: format_float(s.std, 4),
            min: format_float(s.min, 4),
            p25: format_float(s.p25, 4),
            p50: format_float(s.p50, 4),
            p75: format_float(s.p75, 4),
            max: format_float(s.max, 4),
        })
        .collect();
    sections.push(Section::new("Summary Statistics").table(describe));

    let (rows, cols) = summary::shape(table);
    sections.push(Section::new("Shape").text(format!("({}, {})", rows, cols)));

    sections.push(
        Section::new("Head").table(record_rows(summary::head(table, opts.preview_rows))),
    );
    sections.push(
        Section::new("Tail").table(record_rows(summary::tail(table, opts.preview_rows))),
    );
    sections.push(
        Section::new("Sample").table(record_rows(summary::sample(table, opts.sample_size, rng))),
    );

    sections.push(Section::new("Columns").text(summary::columns(table).join(", ")));

    let dtypes: Vec<DtypeRow> = summary::dtypes(table)
        .into_iter()
        .map(|(c, t)| DtypeRow {
            column: c.name().to_string(),
            dtype: t.to_string(),
        })
        .collect();
    sections.push(Section::new("Data types").table(dtypes));

    let missing: Vec<MissingRow> = summary::missing_counts(table)
        .into_iter()
        .map(|(c, n)| MissingRow {
            column: c.name().to_string(),
            missing: n,
        })
        .collect();
    sections.push(Section::new("Missing values").table(missing));

    let corr = summary::correlation_matrix(table);
    let mut header = vec![String::new()];
    header.extend(corr.columns.iter().map(|c| c.name().to_string()));
    let grid: Vec<Vec<String>> = corr
        .columns
        .iter()
        .zip(&corr.values)
        .map(|(c, row)| {
            let mut cells = vec![c.name().to_string()];
            cells.extend(row.iter().map(|v| format_float(*v, 4)));
            cells
        })
        .collect();
    sections.push(Section::new("Correlation Matrix").grid(header, grid));

    // segments
    let sales = sales_by_region(table);
    let totals: Vec<RegionTotalRow> = sales
        .totals
        .iter()
        .map(|(region, total)| RegionTotalRow {
            region: region.clone(),
            purchase_amount: format_number(*total, 2),
        })
        .collect();
    let top_line = match &sales.top {
        Some((region, total)) => format!(
            "Highest purchasing region: {} with ${}",
            region,
            format_number(*total, 2)
        ),
        None => "Highest purchasing region: none (no rows with a region)".to_string(),
    };
    let mut regional = Section::new("Regional sale performance")
        .text("Total Sales by Region:")
        .table(totals)
        .text(top_line);
    if sales.unassigned > 0 {
        regional = regional.text(format!(
            "{} rows without a region (${}) are not included in the totals.",
            format_int(sales.unassigned),
            format_number(sales.unassigned_total, 2)
        ));
    }
    sections.push(regional);

    let counts: Vec<RegionCountRow> = region_counts(table)
        .into_iter()
        .map(|(region, count)| RegionCountRow { region, count })
        .collect();
    sections.push(Section::new("Customers Per Region").table(counts));

    let age = frequency_by_age(table);
    sections.push(
        Section::new("Purchase Frequency by Age Group")
            .text(describe_group(
                &format!("Young (age < {}) mean purchase frequency", segments::YOUNG_BELOW),
                &age.young,
            ))
            .text(describe_group(
                &format!("Senior (age > {}) mean purchase frequency", segments::SENIOR_ABOVE),
                &age.senior,
            ))
            .text(format!("Higher purchase frequency: {}", age.higher())),
    );

    let freq_loyalty = frequency_loyalty_correlation(table);
    sections.push(Section::new("Purchase Frequency vs Loyalty Score").text(format!(
        "Pearson correlation between purchase_frequency and loyalty_score: {}",
        format_float(freq_loyalty, 4)
    )));

    let enriched = enrich(table);
    debug!(
        with_spending = enriched.iter().filter(|r| r.spending_per_visit.is_some()).count(),
        "rows enriched"
    );

    let top: Vec<TopSpenderRow> = top_spenders_per_visit(&enriched, opts.top_k)
        .into_iter()
        .map(|s| TopSpenderRow {
            index: s.index,
            user_id: s
                .record
                .user_id
                .map(|v| v.to_string())
                .unwrap_or_else(|| "NaN".into()),
            spending_per_visit: format_float(s.spending_per_visit, 2),
            purchase_amount: format_opt(s.record.purchase_amount, 2),
            purchase_frequency: format_opt(s.record.purchase_frequency, 2),
        })
        .collect();
    sections.push(Section::new(format!("Top {} Spenders per Visit", opts.top_k)).table(top));

    let tiers = loyalty_tier_counts(&enriched);
    let tier_rows: Vec<TierCountRow> = tiers
        .counts
        .iter()
        .map(|(tier, count)| TierCountRow {
            loyalty_tier: tier.to_string(),
            count: *count,
        })
        .collect();
    let mut tier_section = Section::new("Loyalty Tier Distribution").table(tier_rows);
    if tiers.unclassified > 0 {
        tier_section = tier_section.text(format!(
            "{} rows have a loyalty score outside 0-10 and are not in any tier.",
            tiers.unclassified
        ));
    }
    sections.push(tier_section);

    let (first, second) = REGION_PAIR;
    let pair = frequency_by_region_pair(table, first, second);
    sections.push(
        Section::new(format!("{} vs {} Purchase Frequency", first, second))
            .text(describe_group(
                &format!("{} mean purchase frequency", first),
                &pair.first,
            ))
            .text(describe_group(
                &format!("{} mean purchase frequency", second),
                &pair.second,
            ))
            .text(format!(
                "Absolute difference: {}",
                format_float(pair.abs_difference(), 2)
            )),
    );

    // charts
    let dir = opts.charts_dir.as_deref();
    sections.push(chart_section(
        "Age Distribution",
        dir.map(|d| render_age_histogram(table, d)),
    ));
    sections.push(chart_section(
        "Annual Income vs Purchase Amount",
        dir.map(|d| render_income_scatter(table, d)),
    ));

    let finite = |v: f64| (!v.is_nan()).then_some(v);
    let stats = SummaryStats {
        rows,
        columns: cols,
        coercion_errors: load.coercion_errors.len(),
        top_region: sales.top.as_ref().map(|(r, _)| r.clone()),
        top_region_sales: sales.top.as_ref().map(|(_, v)| *v),
        higher_frequency_age_group: age.higher().to_string(),
        frequency_loyalty_correlation: finite(freq_loyalty),
        loyalty_tiers: tiers
            .counts
            .iter()
            .map(|(t, n)| (t.to_string(), *n))
            .collect(),
        region_pair_frequency_gap: finite(pair.abs_difference()),
    };

    let report = Report {
        title: TITLE.to_string(),
        sections,
    };
    (report, stats)
}

/// Section titles in the order `build_report` emits them for `top_k`.
pub fn section_titles(top_k: usize) -> Vec<String> {
    let (first, second) = REGION_PAIR;
    vec![
        "Raw Data".into(),
        "Summary Statistics".into(),
        "Shape".into(),
        "Head".into(),
        "Tail".into(),
        "Sample".into(),
        "Columns".into(),
        "Data types".into(),
        "Missing values".into(),
        "Correlation Matrix".into(),
        "Regional sale performance".into(),
        "Customers Per Region".into(),
        "Purchase Frequency by Age Group".into(),
        "Purchase Frequency vs Loyalty Score".into(),
        format!("Top {} Spenders per Visit", top_k),
        "Loyalty Tier Distribution".into(),
        format!("{} vs {} Purchase Frequency", first, second),
        "Age Distribution".into(),
        "Annual Income vs Purchase Amount".into(),
    ]
}
