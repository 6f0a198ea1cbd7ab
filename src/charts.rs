//! PNG charts drawn with Plotters: an age histogram and an income vs
//! purchase scatter coloured by loyalty score.

use crate::error::ChartError;
use crate::types::{Column, Table};
use plotters::prelude::*;
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::info;

pub const AGE_BINS: usize = 15;

const WIDTH: u32 = 900;
const HEIGHT: u32 = 600;

/// A chart written to disk.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartArtifact {
    pub path: PathBuf,
    /// Per-point data that a static image cannot show (hover fields).
    pub data_path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

/// Equal-width bins spanning `[min, max]`; the last bin is closed on the
/// right. A constant input gets a unit-wide range centred on the value.
pub fn histogram_bins(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    if values.is_empty() || bins == 0 {
        return Vec::new();
    }
    let mut lo = values.iter().copied().fold(f64::INFINITY, f64::min);
    let mut hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if lo == hi {
        lo -= 0.5;
        hi += 0.5;
    }
    let width = (hi - lo) / bins as f64;
    let mut out: Vec<HistogramBin> = (0..bins)
        .map(|i| HistogramBin {
            start: lo + width * i as f64,
            end: if i + 1 == bins { hi } else { lo + width * (i + 1) as f64 },
            count: 0,
        })
        .collect();
    for v in values {
        let idx = (((v - lo) / width).floor() as usize).min(bins - 1);
        out[idx].count += 1;
    }
    out
}

/// One scatter point with the extra fields shown on hover.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterPoint {
    pub annual_income: f64,
    pub purchase_amount: f64,
    pub loyalty_score: f64,
    pub age: Option<i64>,
    pub region: Option<String>,
    pub purchase_frequency: Option<f64>,
}

/// Rows with income, purchase amount and loyalty score all present.
pub fn scatter_points(table: &Table) -> Vec<ScatterPoint> {
    table
        .records()
        .iter()
        .filter_map(|r| {
            Some(ScatterPoint {
                annual_income: r.annual_income?,
                purchase_amount: r.purchase_amount?,
                loyalty_score: r.loyalty_score?,
                age: r.age,
                region: r.region.clone(),
                purchase_frequency: r.purchase_frequency,
            })
        })
        .collect()
}

/// Blue for low loyalty through to red for high, over the 0..=10 scale.
fn loyalty_color(score: f64) -> HSLColor {
    let t = (score / 10.0).clamp(0.0, 1.0);
    HSLColor((1.0 - t) * 0.66, 0.8, 0.45)
}

fn drawing<E: std::fmt::Display>(e: E) -> ChartError {
    ChartError::Drawing(e.to_string())
}

pub fn render_age_histogram(table: &Table, dir: &Path) -> Result<ChartArtifact, ChartError> {
    let bins = histogram_bins(&table.present_values(Column::Age), AGE_BINS);
    let (Some(first), Some(last)) = (bins.first(), bins.last()) else {
        return Err(ChartError::NoData("age histogram"));
    };
    let (x_min, x_max) = (first.start, last.end);
    let y_max = bins.iter().map(|b| b.count).max().unwrap_or(1) as f64 * 1.1;

    let path = dir.join("age_histogram.png");
    draw_histogram(&bins, x_min..x_max, y_max, &path)?;
    info!(path = %path.display(), "age histogram written");
    Ok(ChartArtifact {
        path,
        data_path: None,
    })
}

fn draw_histogram(
    bins: &[HistogramBin],
    x_range: std::ops::Range<f64>,
    y_max: f64,
    path: &Path,
) -> Result<(), ChartError> {
    let root = BitMapBackend::new(path, (WIDTH, HEIGHT)).into_drawing_area();
    root.fill(&WHITE).map_err(drawing)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Age Distribution", ("sans-serif", 28))
        .margin(10)
        .x_label_area_size(45)
        .y_label_area_size(55)
        .build_cartesian_2d(x_range, 0f64..y_max)
        .map_err(drawing)?;

    chart
        .configure_mesh()
        .x_desc("age")
        .y_desc("count")
        .axis_desc_style(("sans-serif", 15))
        .draw()
        .map_err(drawing)?;

    chart
        .draw_series(bins.iter().map(|b| {
            Rectangle::new([(b.start, 0.0), (b.end, b.count as f64)], BLUE.mix(0.6).filled())
        }))
        .map_err(drawing)?;

    root.present().map_err(drawing)
}

pub fn render_income_scatter(table: &Table, dir: &Path) -> Result<ChartArtifact, ChartError> {
    let points = scatter_points(table);
    if points.is_empty() {
        return Err(ChartError::NoData("income vs purchase scatter"));
    }
    let bounds = |f: fn(&ScatterPoint) -> f64| {
        let lo = points.iter().map(f).fold(f64::INFINITY, f64::min);
        let hi = points.iter().map(f).fold(f64::NEG_INFINITY, f64::max);
        let pad = ((hi - lo) * 0.05).max(1.0);
        (lo - pad)..(hi + pad)
    };
    let x_range = bounds(|p| p.annual_income);
    let y_range = bounds(|p| p.purchase_amount);

    let path = dir.join("income_vs_purchase.png");
    draw_scatter(&points, x_range, y_range, &path)?;

    let data_path = dir.join("income_vs_purchase.json");
    serde_json::to_writer_pretty(BufWriter::new(File::create(&data_path)?), &points)?;
    info!(path = %path.display(), data = %data_path.display(), "scatter written");

    Ok(ChartArtifact {
        path,
        data_path: Some(data_path),
    })
}

fn draw_scatter(
    points: &[ScatterPoint],
    x_range: std::ops::Range<f64>,
    y_range: std::ops::Range<f64>,
    path: &Path,
) -> Result<(), ChartError> {
    let root = BitMapBackend::new(path, (WIDTH, HEIGHT)).into_drawing_area();
    root.fill(&WHITE).map_err(drawing)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(
            "Annual Income vs Purchase Amount (colour: loyalty score)",
            ("sans-serif", 24),
        )
        .margin(10)
        .x_label_area_size(45)
        .y_label_area_size(65)
        .build_cartesian_2d(x_range, y_range)
        .map_err(drawing)?;

    chart
        .configure_mesh()
        .x_desc("annual_income")
        .y_desc("purchase_amount")
        .axis_desc_style(("sans-serif", 15))
        .draw()
        .map_err(drawing)?;

    chart
        .draw_series(points.iter().map(|p| {
            Circle::new(
                (p.annual_income, p.purchase_amount),
                5,
                loyalty_color(p.loyalty_score).filled(),
            )
        }))
        .map_err(drawing)?;

    root.present().map_err(drawing)
}
