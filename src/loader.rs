use crate::error::{CoercionError, DataLoadError};
use crate::types::{Column, DType, RawRow, Record, Table};
use crate::util::{parse_f64_cell, Cell};
use csv::{ReaderBuilder, Trim};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    pub total_rows: usize,
    pub coercion_errors: Vec<CoercionError>,
}

/// Tracks what the values of one column looked like, so its dtype can be
/// inferred the way a dataframe reader would.
#[derive(Debug, Clone, Copy)]
struct DTypeProbe {
    seen: bool,
    integral: bool,
    missing: bool,
}

impl Default for DTypeProbe {
    fn default() -> Self {
        Self { seen: false, integral: true, missing: false }
    }
}

impl DTypeProbe {
    fn observe(&mut self, cell: Cell<f64>) {
        self.seen = true;
        match cell {
            // an unreadable cell is already recorded as an error, after that
            // it counts as a gap like any empty cell
            Cell::Missing | Cell::Invalid => self.missing = true,
            Cell::Value(v) => {
                if v.fract() != 0.0 {
                    self.integral = false;
                }
            }
        }
    }

    fn dtype(&self) -> DType {
        if !self.seen {
            // header-only file: nothing to infer from
            DType::Object
        } else if self.integral && !self.missing {
            DType::Int64
        } else {
            DType::Float64
        }
    }
}

pub fn load_table(path: &Path) -> Result<(Table, LoadReport), DataLoadError> {
    let file = File::open(path).map_err(|source| DataLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), "loading dataset");
    load_table_from_reader(file)
}

/// Read the whole dataset. Any malformed CSV record aborts the load; cells
/// that fail numeric conversion become missing and are reported.
pub fn load_table_from_reader<R: Read>(reader: R) -> Result<(Table, LoadReport), DataLoadError> {
    let mut rdr = ReaderBuilder::new().trim(Trim::Headers).from_reader(reader);

    let headers = rdr.headers()?.clone();
    for column in Column::ALL {
        if !headers.iter().any(|h| h == column.name()) {
            return Err(DataLoadError::MissingColumn(column.name()));
        }
    }

    let mut probes = [DTypeProbe::default(); 7];
    let mut errors: Vec<CoercionError> = Vec::new();
    let mut records: Vec<Record> = Vec::new();

    for (row, result) in rdr.deserialize::<RawRow>().enumerate() {
        let raw = result?;
        let mut coerce = |column: Column, text: Option<&str>, integral: bool| -> Cell<f64> {
            // integer columns take "42.0" but not "42.5"
            let cell = match parse_f64_cell(text) {
                Cell::Value(v) if integral && v.fract() != 0.0 => Cell::Invalid,
                cell => cell,
            };
            probes[column as usize].observe(cell);
            // the bad value becomes missing for this row only
            if cell == Cell::Invalid {
                let err = CoercionError {
                    row,
                    column: column.name(),
                    value: text.unwrap_or_default().to_string(),
                };
                debug!(%err, "treating value as missing");
                errors.push(err);
            }
            cell
        };

        let user_id = value(coerce(Column::UserId, raw.user_id.as_deref(), true)).map(|v| v as i64);
        let age = value(coerce(Column::Age, raw.age.as_deref(), true)).map(|v| v as i64);
        let annual_income =
            value(coerce(Column::AnnualIncome, raw.annual_income.as_deref(), false));
        let purchase_amount =
            value(coerce(Column::PurchaseAmount, raw.purchase_amount.as_deref(), false));
        let loyalty_score =
            value(coerce(Column::LoyaltyScore, raw.loyalty_score.as_deref(), false));
        let purchase_frequency =
            value(coerce(Column::PurchaseFrequency, raw.purchase_frequency.as_deref(), false));
        let region = raw
            .region
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty());

        records.push(Record {
            user_id,
            age,
            annual_income,
            purchase_amount,
            loyalty_score,
            region,
            purchase_frequency,
        });
    }

    let mut dtypes = probes.map(|p| p.dtype());
    // region is text whatever it contains
    dtypes[Column::Region as usize] = DType::Object;
    let report = LoadReport {
        total_rows: records.len(),
        coercion_errors: errors,
    };
    info!(rows = report.total_rows, "dataset loaded");
    if !report.coercion_errors.is_empty() {
        warn!(
            count = report.coercion_errors.len(),
            "some values could not be read as numbers and were treated as missing"
        );
    }
    Ok((Table::new(records, dtypes), report))
}

fn value(cell: Cell<f64>) -> Option<f64> {
    match cell {
        Cell::Value(v) => Some(v),
        _ => None,
    }
}
