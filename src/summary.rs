//! Whole-table descriptive statistics and row previews.

use crate::types::{Column, DType, Record, Table};
use crate::util::{mean, pearson, quantile_sorted, sample_std};
use rand::Rng;

/// A row paired with its position in the table.
pub type IndexedRow<'a> = (usize, &'a Record);

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSummary {
    pub column: Column,
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub max: f64,
}

impl ColumnSummary {
    fn of(column: Column, values: &[f64]) -> Self {
        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));
        Self {
            column,
            count: values.len(),
            mean: mean(values),
            std: sample_std(values),
            min: sorted.first().copied().unwrap_or(f64::NAN),
            p25: quantile_sorted(&sorted, 0.25),
            p50: quantile_sorted(&sorted, 0.50),
            p75: quantile_sorted(&sorted, 0.75),
            max: sorted.last().copied().unwrap_or(f64::NAN),
        }
    }
}

/// count/mean/std/min/quartiles/max for every numeric column.
pub fn describe(table: &Table) -> Vec<ColumnSummary> {
    table
        .numeric_columns()
        .into_iter()
        .map(|c| ColumnSummary::of(c, &table.present_values(c)))
        .collect()
}

/// `(rows, columns)`.
pub fn shape(table: &Table) -> (usize, usize) {
    (table.len(), Column::ALL.len())
}

pub fn head(table: &Table, n: usize) -> Vec<IndexedRow<'_>> {
    table.records().iter().enumerate().take(n).collect()
}

pub fn tail(table: &Table, n: usize) -> Vec<IndexedRow<'_>> {
    let skip = table.len().saturating_sub(n);
    table.records().iter().enumerate().skip(skip).collect()
}

/// Draw `min(n, rows)` distinct rows uniformly at random, in draw order.
pub fn sample<'a, R: Rng + ?Sized>(
    table: &'a Table,
    n: usize,
    rng: &mut R,
) -> Vec<IndexedRow<'a>> {
    let amount = n.min(table.len());
    let records = table.records();
    rand::seq::index::sample(rng, table.len(), amount)
        .into_iter()
        .map(|i| (i, &records[i]))
        .collect()
}

pub fn columns(_table: &Table) -> Vec<&'static str> {
    Column::ALL.iter().map(|c| c.name()).collect()
}

pub fn dtypes(table: &Table) -> Vec<(Column, DType)> {
    Column::ALL.iter().map(|c| (*c, table.dtype(*c))).collect()
}

pub fn missing_counts(table: &Table) -> Vec<(Column, usize)> {
    Column::ALL
        .iter()
        .map(|c| (*c, table.records().iter().filter(|r| c.is_missing(r)).count()))
        .collect()
}

/// Symmetric Pearson correlation matrix over the numeric columns.
#[derive(Debug, Clone)]
pub struct CorrelationMatrix {
    pub columns: Vec<Column>,
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    pub fn get(&self, a: Column, b: Column) -> Option<f64> {
        let i = self.columns.iter().position(|c| *c == a)?;
        let j = self.columns.iter().position(|c| *c == b)?;
        Some(self.values[i][j])
    }
}

/// Pairs of values where both columns are present in the same row.
pub fn paired_values(table: &Table, a: Column, b: Column) -> Vec<(f64, f64)> {
    table
        .records()
        .iter()
        .filter_map(|r| Some((a.value(r)?, b.value(r)?)))
        .collect()
}

pub fn correlation_matrix(table: &Table) -> CorrelationMatrix {
    let columns = table.numeric_columns();
    let n = columns.len();
    let mut values = vec![vec![f64::NAN; n]; n];
    for i in 0..n {
        for j in i..n {
            let r = pearson(&paired_values(table, columns[i], columns[j]));
            // a column against itself is exactly 1 unless it has no variance
            let r = if i == j && !r.is_nan() { 1.0 } else { r };
            values[i][j] = r;
            values[j][i] = r;
        }
    }
    CorrelationMatrix { columns, values }
}
