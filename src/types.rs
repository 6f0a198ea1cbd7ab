use serde::{Deserialize, Serialize};
use std::fmt;
use tabled::Tabled;

/// One CSV row exactly as read, before any numeric coercion.
#[derive(Debug, Deserialize)]
pub struct RawRow {
    pub user_id: Option<String>,
    pub age: Option<String>,
    pub annual_income: Option<String>,
    pub purchase_amount: Option<String>,
    pub loyalty_score: Option<String>,
    pub region: Option<String>,
    pub purchase_frequency: Option<String>,
}

/// A typed customer row. `None` marks a missing or uncoercible value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    pub user_id: Option<i64>,
    pub age: Option<i64>,
    pub annual_income: Option<f64>,
    pub purchase_amount: Option<f64>,
    pub loyalty_score: Option<f64>,
    pub region: Option<String>,
    pub purchase_frequency: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    UserId,
    Age,
    AnnualIncome,
    PurchaseAmount,
    LoyaltyScore,
    Region,
    PurchaseFrequency,
}

impl Column {
    /// Columns in file order.
    pub const ALL: [Column; 7] = [
        Column::UserId,
        Column::Age,
        Column::AnnualIncome,
        Column::PurchaseAmount,
        Column::LoyaltyScore,
        Column::Region,
        Column::PurchaseFrequency,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Column::UserId => "user_id",
            Column::Age => "age",
            Column::AnnualIncome => "annual_income",
            Column::PurchaseAmount => "purchase_amount",
            Column::LoyaltyScore => "loyalty_score",
            Column::Region => "region",
            Column::PurchaseFrequency => "purchase_frequency",
        }
    }

    fn index(self) -> usize {
        // declaration order matches `ALL`
        self as usize
    }

    /// Numeric view of this column for a record; always `None` for `region`.
    pub fn value(self, r: &Record) -> Option<f64> {
        match self {
            Column::UserId => r.user_id.map(|v| v as f64),
            Column::Age => r.age.map(|v| v as f64),
            Column::AnnualIncome => r.annual_income,
            Column::PurchaseAmount => r.purchase_amount,
            Column::LoyaltyScore => r.loyalty_score,
            Column::Region => None,
            Column::PurchaseFrequency => r.purchase_frequency,
        }
    }

    pub fn is_missing(self, r: &Record) -> bool {
        match self {
            Column::Region => r.region.is_none(),
            _ => self.value(r).is_none(),
        }
    }
}

/// Column type as a dataframe library would infer it from the raw text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DType {
    Int64,
    Float64,
    Object,
}

impl DType {
    pub fn is_numeric(self) -> bool {
        matches!(self, DType::Int64 | DType::Float64)
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DType::Int64 => "int64",
            DType::Float64 => "float64",
            DType::Object => "object",
        })
    }
}

/// The in-memory dataset: typed records plus the inferred type of each column.
#[derive(Debug, Clone)]
pub struct Table {
    records: Vec<Record>,
    dtypes: [DType; 7],
}

impl Table {
    pub fn new(records: Vec<Record>, dtypes: [DType; 7]) -> Self {
        Self { records, dtypes }
    }

    /// Build a table from already-typed records, deriving dtypes from the
    /// values present (integer columns with gaps widen to `float64`).
    pub fn from_records(records: Vec<Record>) -> Self {
        let dtypes = Column::ALL.map(|c| match c {
            Column::Region => DType::Object,
            Column::UserId | Column::Age => {
                if records.iter().any(|r| c.is_missing(r)) {
                    DType::Float64
                } else {
                    DType::Int64
                }
            }
            _ => DType::Float64,
        });
        Self { records, dtypes }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn dtype(&self, column: Column) -> DType {
        self.dtypes[column.index()]
    }

    /// Columns whose inferred dtype is numeric, in file order.
    pub fn numeric_columns(&self) -> Vec<Column> {
        Column::ALL
            .into_iter()
            .filter(|c| self.dtype(*c).is_numeric())
            .collect()
    }

    /// Non-missing values of a numeric column, in row order.
    pub fn present_values(&self, column: Column) -> Vec<f64> {
        self.records.iter().filter_map(|r| column.value(r)).collect()
    }
}

// ---- display rows ---------------------------------------------------------

#[derive(Debug, Tabled, Clone)]
pub struct RecordRow {
    #[tabled(rename = "")]
    pub index: usize,
    pub user_id: String,
    pub age: String,
    pub annual_income: String,
    pub purchase_amount: String,
    pub loyalty_score: String,
    pub region: String,
    pub purchase_frequency: String,
}

#[derive(Debug, Tabled, Clone)]
pub struct DescribeRow {
    pub column: String,
    pub count: usize,
    pub mean: String,
    pub std: String,
    pub min: String,
    #[tabled(rename = "25%")]
    pub p25: String,
    #[tabled(rename = "50%")]
    pub p50: String,
    #[tabled(rename = "75%")]
    pub p75: String,
    pub max: String,
}

#[derive(Debug, Tabled, Clone)]
pub struct DtypeRow {
    pub column: String,
    pub dtype: String,
}

#[derive(Debug, Tabled, Clone)]
pub struct MissingRow {
    pub column: String,
    pub missing: usize,
}

#[derive(Debug, Tabled, Clone)]
pub struct RegionTotalRow {
    pub region: String,
    pub purchase_amount: String,
}

#[derive(Debug, Tabled, Clone)]
pub struct RegionCountRow {
    pub region: String,
    pub count: usize,
}

#[derive(Debug, Tabled, Clone)]
pub struct TopSpenderRow {
    #[tabled(rename = "")]
    pub index: usize,
    pub user_id: String,
    pub spending_per_visit: String,
    pub purchase_amount: String,
    pub purchase_frequency: String,
}

#[derive(Debug, Tabled, Clone)]
pub struct TierCountRow {
    pub loyalty_tier: String,
    pub count: usize,
}

/// Headline findings written by `--summary-json`.
#[derive(Debug, Serialize)]
pub struct SummaryStats {
    pub rows: usize,
    pub columns: usize,
    pub coercion_errors: usize,
    pub top_region: Option<String>,
    pub top_region_sales: Option<f64>,
    pub higher_frequency_age_group: String,
    pub frequency_loyalty_correlation: Option<f64>,
    pub loyalty_tiers: Vec<(String, usize)>,
    pub region_pair_frequency_gap: Option<f64>,
}
