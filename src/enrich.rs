//! Derived per-row columns: spending per visit and loyalty tier.

use crate::types::{Record, Table};
use std::fmt;

/// Loyalty bucket. Edges are right-closed with the lowest bin also closed on
/// the left: Low `[0, 5]`, Medium `(5, 7]`, High `(7, 10]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LoyaltyTier {
    Low,
    Medium,
    High,
}

impl LoyaltyTier {
    pub const ALL: [LoyaltyTier; 3] = [LoyaltyTier::Low, LoyaltyTier::Medium, LoyaltyTier::High];

    /// `None` for scores outside `[0, 10]` (including `NaN`).
    pub fn classify(score: f64) -> Option<Self> {
        if (0.0..=5.0).contains(&score) {
            Some(LoyaltyTier::Low)
        } else if score > 5.0 && score <= 7.0 {
            Some(LoyaltyTier::Medium)
        } else if score > 7.0 && score <= 10.0 {
            Some(LoyaltyTier::High)
        } else {
            None
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            LoyaltyTier::Low => "Low",
            LoyaltyTier::Medium => "Medium",
            LoyaltyTier::High => "High",
        }
    }
}

impl fmt::Display for LoyaltyTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A record together with its derived columns.
#[derive(Debug, Clone, Copy)]
pub struct EnrichedRow<'a> {
    /// Position in the source table.
    pub index: usize,
    pub record: &'a Record,
    /// Only defined where purchase frequency is present and positive.
    pub spending_per_visit: Option<f64>,
    pub loyalty_tier: Option<LoyaltyTier>,
}

pub fn spending_per_visit(r: &Record) -> Option<f64> {
    let freq = r.purchase_frequency.filter(|f| *f > 0.0)?;
    Some(r.purchase_amount? / freq)
}

/// Attach the derived columns to every row of the table.
pub fn enrich(table: &Table) -> Vec<EnrichedRow<'_>> {
    table
        .records()
        .iter()
        .enumerate()
        .map(|(index, record)| EnrichedRow {
            index,
            record,
            spending_per_visit: spending_per_visit(record),
            loyalty_tier: record.loyalty_score.and_then(LoyaltyTier::classify),
        })
        .collect()
}
