//! Grouped aggregates: regions, age brackets, loyalty tiers.

use crate::enrich::{EnrichedRow, LoyaltyTier};
use crate::error::EmptyGroupError;
use crate::summary::paired_values;
use crate::types::{Column, Record, Table};
use crate::util::mean;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

/// Mean of some column over a named group of rows.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupMean {
    pub group: String,
    pub rows: usize,
    /// `NaN` when the group is empty.
    pub mean: f64,
}

impl GroupMean {
    fn of(group: impl Into<String>, values: &[f64]) -> Self {
        Self {
            group: group.into(),
            rows: values.len(),
            mean: mean(values),
        }
    }

    pub fn value(&self) -> Result<f64, EmptyGroupError> {
        if self.rows == 0 {
            return Err(EmptyGroupError {
                group: self.group.clone(),
            });
        }
        Ok(self.mean)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RegionSales {
    /// Ascending by region name.
    pub totals: Vec<(String, f64)>,
    /// Region with the largest total; first in group order on ties.
    pub top: Option<(String, f64)>,
    /// Rows with a purchase amount but no region. They are left out of
    /// `totals`, so `totals` plus `unassigned_total` is the grand total.
    pub unassigned: usize,
    pub unassigned_total: f64,
}

/// Sum of purchase amount per region. Rows without a region are dropped
/// from the grouping and counted separately.
pub fn sales_by_region(table: &Table) -> RegionSales {
    let mut map: BTreeMap<&str, f64> = BTreeMap::new();
    let mut unassigned = 0;
    let mut unassigned_total = 0.0;
    for r in table.records() {
        match (r.region.as_deref(), r.purchase_amount) {
            (Some(region), amount) => {
                *map.entry(region).or_insert(0.0) += amount.unwrap_or(0.0);
            }
            (None, Some(amount)) => {
                unassigned += 1;
                unassigned_total += amount;
            }
            (None, None) => {}
        }
    }
    let totals: Vec<(String, f64)> = map.into_iter().map(|(k, v)| (k.to_string(), v)).collect();

    // strict `>` keeps the earliest region on a tie
    let mut top: Option<(String, f64)> = None;
    for (region, total) in &totals {
        if top.as_ref().map_or(true, |(_, best)| *total > *best) {
            top = Some((region.clone(), *total));
        }
    }
    RegionSales {
        totals,
        top,
        unassigned,
        unassigned_total,
    }
}

/// Rows per region, descending by count; ties keep first-appearance order.
pub fn region_counts(table: &Table) -> Vec<(String, usize)> {
    let mut order: Vec<&str> = Vec::new();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for region in table.records().iter().filter_map(|r| r.region.as_deref()) {
        // remember where each region first shows up; the sort below is
        // stable, so equal counts come out in that order
        let e = counts.entry(region).or_insert_with(|| {
            order.push(region);
            0
        });
        *e += 1;
    }
    let mut out: Vec<(String, usize)> = order
        .into_iter()
        .map(|r| (r.to_string(), counts.get(r).copied().unwrap_or(0)))
        .collect();
    out.sort_by(|a, b| b.1.cmp(&a.1));
    out
}

#[derive(Debug, Clone, PartialEq)]
pub struct AgeFrequency {
    pub young: GroupMean,
    pub senior: GroupMean,
}

impl AgeFrequency {
    /// "Young" only when the young mean is strictly greater; any other
    /// outcome, ties and undefined means included, reads "Senior".
    pub fn higher(&self) -> &'static str {
        if self.young.mean > self.senior.mean {
            "Young"
        } else {
            "Senior"
        }
    }
}

pub const YOUNG_BELOW: i64 = 30;
pub const SENIOR_ABOVE: i64 = 50;

/// Mean purchase frequency for customers under 30 versus over 50.
pub fn frequency_by_age(table: &Table) -> AgeFrequency {
    let freq_where = |pred: &dyn Fn(i64) -> bool| -> Vec<f64> {
        table
            .records()
            .iter()
            .filter(|r| r.age.is_some_and(pred))
            .filter_map(|r| r.purchase_frequency)
            .collect()
    };
    AgeFrequency {
        young: GroupMean::of("Young", &freq_where(&|a: i64| a < YOUNG_BELOW)),
        senior: GroupMean::of("Senior", &freq_where(&|a: i64| a > SENIOR_ABOVE)),
    }
}

pub fn frequency_loyalty_correlation(table: &Table) -> f64 {
    crate::util::pearson(&paired_values(
        table,
        Column::PurchaseFrequency,
        Column::LoyaltyScore,
    ))
}

#[derive(Debug, Clone, PartialEq)]
pub struct TopSpender<'a> {
    pub index: usize,
    pub record: &'a Record,
    pub spending_per_visit: f64,
}

/// The `k` rows with the highest spending per visit. Rows without a defined
/// value (zero, negative or missing frequency) never qualify; equal values
/// keep table order.
pub fn top_spenders_per_visit<'a>(rows: &[EnrichedRow<'a>], k: usize) -> Vec<TopSpender<'a>> {
    let mut ranked: Vec<TopSpender<'a>> = rows
        .iter()
        .filter_map(|row| {
            Some(TopSpender {
                index: row.index,
                record: row.record,
                spending_per_visit: row.spending_per_visit?,
            })
        })
        .collect();
    ranked.sort_by(|a, b| {
        b.spending_per_visit
            .partial_cmp(&a.spending_per_visit)
            .unwrap_or(Ordering::Equal)
    });
    ranked.truncate(k);
    ranked
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierCounts {
    /// Low, Medium, High in that order.
    pub counts: Vec<(LoyaltyTier, usize)>,
    /// Scores present but outside `[0, 10]`.
    pub unclassified: usize,
}

impl TierCounts {
    pub fn total(&self) -> usize {
        self.counts.iter().map(|(_, n)| n).sum()
    }
}

pub fn loyalty_tier_counts(rows: &[EnrichedRow<'_>]) -> TierCounts {
    let counts = LoyaltyTier::ALL
        .iter()
        .map(|tier| {
            let n = rows.iter().filter(|r| r.loyalty_tier == Some(*tier)).count();
            (*tier, n)
        })
        .collect();
    let unclassified = rows
        .iter()
        .filter(|r| r.record.loyalty_score.is_some() && r.loyalty_tier.is_none())
        .count();
    TierCounts {
        counts,
        unclassified,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RegionPairFrequency {
    pub first: GroupMean,
    pub second: GroupMean,
}

impl RegionPairFrequency {
    /// `NaN` when either region has no rows.
    pub fn abs_difference(&self) -> f64 {
        (self.first.mean - self.second.mean).abs()
    }
}

/// Mean purchase frequency of two named regions.
pub fn frequency_by_region_pair(table: &Table, first: &str, second: &str) -> RegionPairFrequency {
    let freq_in = |region: &str| -> Vec<f64> {
        table
            .records()
            .iter()
            .filter(|r| r.region.as_deref() == Some(region))
            .filter_map(|r| r.purchase_frequency)
            .collect()
    };
    RegionPairFrequency {
        first: GroupMean::of(first, &freq_in(first)),
        second: GroupMean::of(second, &freq_in(second)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrich::enrich;

    fn rec(id: i64, age: i64, region: &str, amount: f64, score: f64, freq: f64) -> Record {
        Record {
            user_id: Some(id),
            age: Some(age),
            annual_income: Some(50000.0),
            purchase_amount: Some(amount),
            loyalty_score: Some(score),
            region: Some(region.to_string()),
            purchase_frequency: Some(freq),
        }
    }

    #[test]
    fn test_sales_by_region_argmax() {
        let t = Table::from_records(vec![
            rec(1, 30, "North", 200.0, 5.0, 3.0),
            rec(2, 30, "South", 700.0, 5.0, 3.0),
            rec(3, 30, "North", 300.0, 5.0, 3.0),
        ]);
        let sales = sales_by_region(&t);
        assert_eq!(
            sales.totals,
            vec![("North".to_string(), 500.0), ("South".to_string(), 700.0)]
        );
        assert_eq!(sales.top, Some(("South".to_string(), 700.0)));
    }

    #[test]
    fn test_sales_by_region_tie_goes_to_first_group() {
        let t = Table::from_records(vec![
            rec(1, 30, "West", 400.0, 5.0, 3.0),
            rec(2, 30, "East", 400.0, 5.0, 3.0),
        ]);
        assert_eq!(sales_by_region(&t).top, Some(("East".to_string(), 400.0)));
    }

    #[test]
    fn test_region_totals_sum_to_grand_total() {
        let t = Table::from_records(vec![
            rec(1, 30, "North", 120.5, 5.0, 3.0),
            rec(2, 30, "South", 99.5, 5.0, 3.0),
            rec(3, 30, "East", 80.0, 5.0, 3.0),
            rec(4, 30, "North", 10.0, 5.0, 3.0),
        ]);
        let grand: f64 = t.present_values(Column::PurchaseAmount).iter().sum();
        let sales = sales_by_region(&t);
        let by_region: f64 = sales.totals.iter().map(|(_, v)| v).sum();
        assert!((grand - by_region).abs() < 1e-9);
        assert_eq!(sales.unassigned, 0);
    }

    #[test]
    fn test_sales_by_region_counts_rows_without_region() {
        let mut records = vec![
            rec(1, 30, "North", 120.0, 5.0, 3.0),
            rec(2, 30, "South", 80.0, 5.0, 3.0),
            rec(3, 30, "North", 45.5, 5.0, 3.0),
            rec(4, 30, "North", 10.0, 5.0, 3.0),
        ];
        records[2].region = None;
        records[3].region = None;
        records[3].purchase_amount = None;
        let t = Table::from_records(records);

        let sales = sales_by_region(&t);
        assert_eq!(
            sales.totals,
            vec![("North".to_string(), 120.0), ("South".to_string(), 80.0)]
        );
        assert_eq!(sales.unassigned, 1);
        assert_eq!(sales.unassigned_total, 45.5);

        let grand: f64 = t.present_values(Column::PurchaseAmount).iter().sum();
        let by_region: f64 = sales.totals.iter().map(|(_, v)| v).sum();
        assert!((grand - by_region - sales.unassigned_total).abs() < 1e-9);
    }

    #[test]
    fn test_sales_by_region_empty_table() {
        let sales = sales_by_region(&Table::from_records(vec![]));
        assert!(sales.totals.is_empty());
        assert_eq!(sales.top, None);
        assert_eq!(sales.unassigned, 0);
    }

    #[test]
    fn test_region_counts_descending_stable() {
        let t = Table::from_records(vec![
            rec(1, 30, "West", 1.0, 5.0, 1.0),
            rec(2, 30, "North", 1.0, 5.0, 1.0),
            rec(3, 30, "North", 1.0, 5.0, 1.0),
            rec(4, 30, "East", 1.0, 5.0, 1.0),
        ]);
        assert_eq!(
            region_counts(&t),
            vec![
                ("North".to_string(), 2),
                ("West".to_string(), 1),
                ("East".to_string(), 1)
            ]
        );
    }

    #[test]
    fn test_frequency_by_age_groups() {
        let t = Table::from_records(vec![
            rec(1, 22, "North", 1.0, 5.0, 10.0),
            rec(2, 29, "North", 1.0, 5.0, 20.0),
            rec(3, 30, "North", 1.0, 5.0, 99.0),
            rec(4, 50, "North", 1.0, 5.0, 99.0),
            rec(5, 51, "North", 1.0, 5.0, 4.0),
        ]);
        let af = frequency_by_age(&t);
        assert_eq!(af.young.rows, 2);
        assert_eq!(af.young.mean, 15.0);
        assert_eq!(af.senior.rows, 1);
        assert_eq!(af.senior.mean, 4.0);
        assert_eq!(af.higher(), "Young");
    }

    #[test]
    fn test_frequency_by_age_tie_reads_senior() {
        let t = Table::from_records(vec![
            rec(1, 25, "North", 1.0, 5.0, 8.0),
            rec(2, 60, "North", 1.0, 5.0, 8.0),
        ]);
        assert_eq!(frequency_by_age(&t).higher(), "Senior");
    }

    #[test]
    fn test_frequency_by_age_empty_group_is_nan() {
        let t = Table::from_records(vec![rec(1, 25, "North", 1.0, 5.0, 8.0)]);
        let af = frequency_by_age(&t);
        assert!(af.senior.mean.is_nan());
        assert_eq!(
            af.senior.value(),
            Err(EmptyGroupError {
                group: "Senior".into()
            })
        );
        assert_eq!(af.higher(), "Senior");
    }

    #[test]
    fn test_frequency_loyalty_correlation() {
        let t = Table::from_records(vec![
            rec(1, 25, "North", 1.0, 2.0, 4.0),
            rec(2, 25, "North", 1.0, 4.0, 8.0),
            rec(3, 25, "North", 1.0, 6.0, 12.0),
        ]);
        assert!((frequency_loyalty_correlation(&t) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_top_spenders_example() {
        let t = Table::from_records(vec![
            rec(1, 25, "North", 100.0, 5.0, 2.0),
            rec(2, 25, "North", 300.0, 5.0, 1.0),
        ]);
        let rows = enrich(&t);
        let values: Vec<f64> = rows.iter().filter_map(|r| r.spending_per_visit).collect();
        assert_eq!(values, vec![50.0, 300.0]);
        let top = top_spenders_per_visit(&rows, 1);
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].record.user_id, Some(2));
        assert_eq!(top[0].spending_per_visit, 300.0);
    }

    #[test]
    fn test_top_spenders_exclude_zero_frequency() {
        let t = Table::from_records(vec![
            rec(1, 25, "North", 100.0, 5.0, 2.0),
            rec(2, 25, "North", 9999.0, 5.0, 0.0),
            rec(3, 25, "North", 40.0, 5.0, 1.0),
        ]);
        let rows = enrich(&t);
        let top = top_spenders_per_visit(&rows, 5);
        assert_eq!(top.len(), 2);
        assert!(top.iter().all(|s| s.record.user_id != Some(2)));
    }

    #[test]
    fn test_top_spenders_ties_keep_table_order() {
        let t = Table::from_records(vec![
            rec(1, 25, "North", 10.0, 5.0, 1.0),
            rec(2, 25, "North", 60.0, 5.0, 2.0),
            rec(3, 25, "North", 30.0, 5.0, 1.0),
            rec(4, 25, "North", 90.0, 5.0, 3.0),
        ]);
        let rows = enrich(&t);
        let ids: Vec<Option<i64>> = top_spenders_per_visit(&rows, 3)
            .iter()
            .map(|s| s.record.user_id)
            .collect();
        assert_eq!(ids, vec![Some(2), Some(3), Some(4)]);
    }

    #[test]
    fn test_loyalty_tier_counts_partition() {
        let mut records = vec![
            rec(1, 25, "North", 1.0, 5.0, 1.0),
            rec(2, 25, "North", 1.0, 5.01, 1.0),
            rec(3, 25, "North", 1.0, 7.0, 1.0),
            rec(4, 25, "North", 1.0, 7.01, 1.0),
            rec(5, 25, "North", 1.0, 0.0, 1.0),
            rec(6, 25, "North", 1.0, 3.0, 1.0),
        ];
        records[5].loyalty_score = None;
        let t = Table::from_records(records);
        let tiers = loyalty_tier_counts(&enrich(&t));
        assert_eq!(
            tiers.counts,
            vec![
                (LoyaltyTier::Low, 2),
                (LoyaltyTier::Medium, 2),
                (LoyaltyTier::High, 1)
            ]
        );
        assert_eq!(tiers.unclassified, 0);
        let missing = t.records().iter().filter(|r| r.loyalty_score.is_none()).count();
        assert_eq!(tiers.total(), t.len() - missing);
    }

    #[test]
    fn test_loyalty_tier_counts_out_of_range() {
        let t = Table::from_records(vec![rec(1, 25, "North", 1.0, 12.0, 1.0)]);
        let tiers = loyalty_tier_counts(&enrich(&t));
        assert_eq!(tiers.total(), 0);
        assert_eq!(tiers.unclassified, 1);
    }

    #[test]
    fn test_region_pair_frequency() {
        let t = Table::from_records(vec![
            rec(1, 25, "North", 1.0, 5.0, 10.0),
            rec(2, 25, "North", 1.0, 5.0, 14.0),
            rec(3, 25, "South", 1.0, 5.0, 20.0),
        ]);
        let pair = frequency_by_region_pair(&t, "North", "South");
        assert_eq!(pair.first.value(), Ok(12.0));
        assert_eq!(pair.second.value(), Ok(20.0));
        assert_eq!(pair.abs_difference(), 8.0);
    }

    #[test]
    fn test_region_pair_empty_region_is_surfaced() {
        let t = Table::from_records(vec![rec(1, 25, "North", 1.0, 5.0, 10.0)]);
        let pair = frequency_by_region_pair(&t, "North", "South");
        assert!(pair.second.mean.is_nan());
        assert_eq!(
            pair.second.value(),
            Err(EmptyGroupError {
                group: "South".into()
            })
        );
        assert!(pair.abs_difference().is_nan());
    }
}
