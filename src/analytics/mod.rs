//! The aggregation engine: totals, monthly series, net worth trend, month-over-month growth and
//! category allocation.
//!
//! Everything here is a pure function over normalized entries. Empty input gives empty or zero
//! output, never an error. Percentages are in percent (`50` means 50%) and a percentage whose
//! predecessor is zero is reported as `0`. Sheet cells can hold any value that fits a `Decimal`,
//! so sums, differences and percentages saturate at `Decimal::MIN` and `Decimal::MAX` instead of
//! overflowing.

mod dashboard;
mod series;

pub use dashboard::{Dashboard, NetWorthPoint};
pub use series::{SeriesPoint, TimeSeries};

use crate::model::{Entry, Month};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// The sum of all entry values.
pub fn total(entries: &[Entry]) -> Decimal {
    sum(entries.iter().map(Entry::value))
}

/// Total assets minus total liabilities.
pub fn net_worth(assets: &[Entry], liabilities: &[Entry]) -> Decimal {
    total(assets).saturating_sub(total(liabilities))
}

fn sum(values: impl IntoIterator<Item = Decimal>) -> Decimal {
    values
        .into_iter()
        .fold(Decimal::ZERO, Decimal::saturating_add)
}

/// `numerator / denominator * 100`, zero when `denominator` is zero.
fn percent_of(numerator: Decimal, denominator: Decimal) -> Decimal {
    if denominator.is_zero() {
        return Decimal::ZERO;
    }
    match numerator.checked_div(denominator) {
        Some(ratio) => ratio.saturating_mul(HUNDRED),
        None if numerator.is_sign_negative() == denominator.is_sign_negative() => Decimal::MAX,
        None => Decimal::MIN,
    }
}

/// Sums entry values per month.
pub fn monthly_series(entries: &[Entry]) -> TimeSeries {
    entries.iter().map(|e| (e.month(), e.value())).collect()
}

/// Assets minus liabilities for every month present in either series. A month missing from one
/// side counts as zero on that side.
pub fn net_worth_trend(assets: &TimeSeries, liabilities: &TimeSeries) -> TimeSeries {
    let mut trend = TimeSeries::new();
    for month in assets.months().chain(liabilities.months()) {
        if trend.get(month).is_none() {
            trend.add(
                month,
                assets
                    .get_or_zero(month)
                    .saturating_sub(liabilities.get_or_zero(month)),
            );
        }
    }
    trend
}

/// `(current - previous) / previous * 100`, or zero when `previous` is zero.
pub fn percent_change(previous: Decimal, current: Decimal) -> Decimal {
    percent_of(current.saturating_sub(previous), previous)
}

/// The growth of one month over the month before it in the series.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
pub struct GrowthPoint {
    pub month: Month,
    pub pct: Decimal,
}

/// Growth between consecutive buckets of `series`. The first bucket has no predecessor and
/// produces no point.
pub fn mom_growth(series: &TimeSeries) -> Vec<GrowthPoint> {
    series
        .iter()
        .zip(series.iter().skip(1))
        .map(|((_, previous), (month, current))| GrowthPoint {
            month,
            pct: percent_change(previous, current),
        })
        .collect()
}

/// Month-over-month growth of a series with the two most recent growth figures pulled out.
#[derive(Debug, Default, Clone, Eq, PartialEq, Serialize)]
pub struct GrowthSummary {
    pub points: Vec<GrowthPoint>,
    /// The most recent growth figure, zero when there is none.
    pub latest: Decimal,
    /// The growth figure before `latest`, zero when there is none.
    pub previous: Decimal,
    pub delta: Decimal,
}

pub fn growth_summary(series: &TimeSeries) -> GrowthSummary {
    let points = mom_growth(series);
    let mut recent = points.iter().rev().map(|p| p.pct);
    let latest = recent.next().unwrap_or_default();
    let previous = recent.next().unwrap_or_default();
    GrowthSummary {
        points,
        latest,
        previous,
        delta: latest.saturating_sub(previous),
    }
}

/// How one category moved between the latest month and the calendar month before it.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct CategoryGrowth {
    pub category: String,
    pub latest_value: Decimal,
    pub prev_value: Decimal,
    pub mom_pct: Decimal,
}

/// Per-category growth for the latest month.
#[derive(Debug, Default, Clone, Eq, PartialEq, Serialize)]
pub struct CategoryMom {
    pub latest_month: Option<Month>,
    pub prev_month: Option<Month>,
    pub categories: Vec<CategoryGrowth>,
}

/// Compares each category of the latest month against the calendar month before it. The
/// previous month is the calendar month, not the previous month that has data. Categories that
/// only appear in the previous month are left out. Output is ordered by category name.
pub fn category_mom(entries: &[Entry]) -> CategoryMom {
    let Some(latest_month) = entries.iter().map(Entry::month).max() else {
        return CategoryMom::default();
    };
    let prev_month = latest_month.previous();

    let mut latest: BTreeMap<&str, Decimal> = BTreeMap::new();
    let mut prev: BTreeMap<&str, Decimal> = BTreeMap::new();
    for entry in entries {
        let bucket = if entry.month() == latest_month {
            &mut latest
        } else if entry.month() == prev_month {
            &mut prev
        } else {
            continue;
        };
        let value = bucket.entry(entry.category()).or_default();
        *value = value.saturating_add(entry.value());
    }

    let categories = latest
        .into_iter()
        .map(|(category, latest_value)| {
            let prev_value = prev.get(category).copied().unwrap_or_default();
            let mom_pct = if prev_value > Decimal::ZERO {
                percent_change(prev_value, latest_value)
            } else {
                Decimal::ZERO
            };
            CategoryGrowth {
                category: category.to_string(),
                latest_value,
                prev_value,
                mom_pct,
            }
        })
        .collect();

    CategoryMom {
        latest_month: Some(latest_month),
        prev_month: Some(prev_month),
        categories,
    }
}

/// Sums entry values per category over all time.
pub fn allocation(entries: &[Entry]) -> BTreeMap<String, Decimal> {
    let mut totals = BTreeMap::new();
    for entry in entries {
        let total = totals
            .entry(entry.category().to_string())
            .or_insert(Decimal::ZERO);
        *total = total.saturating_add(entry.value());
    }
    totals
}

/// One slice of an allocation.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct AllocationShare {
    pub category: String,
    pub total: Decimal,
    /// Percentage of the grand total, zero when the grand total is zero.
    pub share_pct: Decimal,
}

/// The allocation sorted by total, largest first. Ties are ordered by category name.
pub fn allocation_shares(entries: &[Entry]) -> Vec<AllocationShare> {
    let totals = allocation(entries);
    let grand_total = sum(totals.values().copied());
    let mut shares: Vec<AllocationShare> = totals
        .into_iter()
        .map(|(category, total)| AllocationShare {
            share_pct: percent_of(total, grand_total),
            category,
            total,
        })
        .collect();
    // The BTreeMap already ordered ties by name and the sort is stable.
    shares.sort_by(|a, b| b.total.cmp(&a.total));
    shares
}

/// A bucket of a month-over-month history table.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
pub struct MomPoint {
    pub month: Month,
    pub value: Decimal,
    /// Absolute change from the bucket before, zero for the first bucket.
    pub change: Decimal,
    /// Percent change from the bucket before, zero for the first bucket or a zero predecessor.
    pub change_pct: Decimal,
}

/// The monthly totals of `entries`, or of one category when `category` is given, with the
/// change from each bucket to the next. With a category, only months in which that category has
/// entries are included.
pub fn mom_history(entries: &[Entry], category: Option<&str>) -> Vec<MomPoint> {
    let series: TimeSeries = entries
        .iter()
        .filter(|e| category.is_none_or(|c| e.category() == c))
        .map(|e| (e.month(), e.value()))
        .collect();

    let mut previous: Option<Decimal> = None;
    series
        .iter()
        .map(|(month, value)| {
            let (change, change_pct) = match previous {
                Some(prev) => (value.saturating_sub(prev), percent_change(prev, value)),
                None => (Decimal::ZERO, Decimal::ZERO),
            };
            previous = Some(value);
            MomPoint {
                month,
                value,
                change,
                change_pct,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn entry(y: i32, m: u32, d: u32, category: &str, value: i64) -> Entry {
        Entry::new(
            NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            category,
            "account",
            Decimal::from(value),
        )
    }

    fn month(y: i32, m: u32) -> Month {
        Month::from_ymd(y, m).unwrap()
    }

    fn series(values: &[(u32, i64)]) -> TimeSeries {
        values
            .iter()
            .map(|(m, v)| (month(2025, *m), Decimal::from(*v)))
            .collect()
    }

    fn pcts(points: &[GrowthPoint]) -> Vec<Decimal> {
        points.iter().map(|p| p.pct).collect()
    }

    #[test]
    fn test_totals_and_net_worth() {
        let assets = vec![entry(2025, 1, 1, "Bank", 100), entry(2025, 2, 1, "Bank", 50)];
        let liabilities = vec![entry(2025, 1, 1, "Card", 30)];
        assert_eq!(total(&assets), Decimal::from(150));
        assert_eq!(
            net_worth(&assets, &liabilities),
            total(&assets) - total(&liabilities)
        );
        assert_eq!(net_worth(&[], &[]), Decimal::ZERO);
    }

    #[test]
    fn test_same_month_sums_into_one_bucket() {
        let entries = vec![entry(2025, 1, 3, "Bank", 10), entry(2025, 1, 28, "Stocks", 5)];
        let s = monthly_series(&entries);
        assert_eq!(s.len(), 1);
        assert_eq!(s.get(month(2025, 1)), Some(Decimal::from(15)));
        assert!(monthly_series(&[]).is_empty());
    }

    #[test]
    fn test_net_worth_trend_fills_missing_months() {
        let trend = net_worth_trend(&series(&[(1, 100)]), &series(&[(2, 50)]));
        assert_eq!(trend, series(&[(1, 100), (2, -50)]));
    }

    #[test]
    fn test_mom_growth() {
        let growth = mom_growth(&series(&[(1, 100), (2, 150), (3, 120)]));
        assert_eq!(pcts(&growth), vec![Decimal::from(50), Decimal::from(-20)]);
        assert_eq!(growth[0].month, month(2025, 2));
    }

    #[test]
    fn test_mom_growth_zero_predecessor() {
        let growth = mom_growth(&series(&[(1, 0), (2, 100)]));
        assert_eq!(pcts(&growth), vec![Decimal::ZERO]);
    }

    #[test]
    fn test_mom_growth_short_series() {
        assert!(mom_growth(&series(&[(1, 100)])).is_empty());
        assert!(mom_growth(&TimeSeries::new()).is_empty());
    }

    #[test]
    fn test_growth_summary() {
        let summary = growth_summary(&series(&[(1, 100), (2, 150), (3, 120)]));
        assert_eq!(summary.latest, Decimal::from(-20));
        assert_eq!(summary.previous, Decimal::from(50));
        assert_eq!(summary.delta, Decimal::from(-70));

        let one = growth_summary(&series(&[(1, 100), (2, 110)]));
        assert_eq!(one.latest, Decimal::from(10));
        assert_eq!(one.previous, Decimal::ZERO);
        assert_eq!(growth_summary(&TimeSeries::new()), GrowthSummary::default());
    }

    #[test]
    fn test_category_mom() {
        let entries = vec![
            entry(2025, 2, 10, "Bank", 100),
            entry(2025, 2, 20, "Stocks", 40),
            entry(2025, 3, 5, "Bank", 150),
            entry(2025, 3, 6, "Gold", 200),
        ];
        let mom = category_mom(&entries);
        assert_eq!(mom.latest_month, Some(month(2025, 3)));
        assert_eq!(mom.prev_month, Some(month(2025, 2)));
        let names: Vec<&str> = mom.categories.iter().map(|c| c.category.as_str()).collect();
        // Stocks only appears in the previous month.
        assert_eq!(names, vec!["Bank", "Gold"]);
        assert_eq!(mom.categories[0].mom_pct, Decimal::from(50));
        assert_eq!(mom.categories[1].prev_value, Decimal::ZERO);
        assert_eq!(mom.categories[1].mom_pct, Decimal::ZERO);
    }

    #[test]
    fn test_category_mom_uses_calendar_previous_month() {
        // January has data but is not the calendar month before March.
        let entries = vec![entry(2025, 1, 10, "Bank", 100), entry(2025, 3, 5, "Bank", 150)];
        let mom = category_mom(&entries);
        assert_eq!(mom.categories[0].prev_value, Decimal::ZERO);
        assert_eq!(mom.categories[0].mom_pct, Decimal::ZERO);
        assert_eq!(category_mom(&[]), CategoryMom::default());
    }

    #[test]
    fn test_category_mom_across_year_boundary() {
        let entries = vec![entry(2024, 12, 31, "Bank", 200), entry(2025, 1, 1, "Bank", 100)];
        let mom = category_mom(&entries);
        assert_eq!(mom.categories[0].mom_pct, Decimal::from(-50));
    }

    #[test]
    fn test_allocation() {
        let entries = vec![
            entry(2025, 1, 1, "Bank", 100),
            entry(2025, 2, 1, "Bank", 200),
            entry(2025, 2, 1, "Gold", 100),
        ];
        let totals = allocation(&entries);
        assert_eq!(totals.get("Bank"), Some(&Decimal::from(300)));
        assert_eq!(totals.get("Gold"), Some(&Decimal::from(100)));

        let shares = allocation_shares(&entries);
        assert_eq!(shares[0].category, "Bank");
        assert_eq!(shares[0].share_pct, Decimal::from(75));
        assert_eq!(shares[1].share_pct, Decimal::from(25));
    }

    #[test]
    fn test_allocation_zero_total() {
        let shares = allocation_shares(&[entry(2025, 1, 1, "Bank", 0)]);
        assert_eq!(shares[0].share_pct, Decimal::ZERO);
        assert!(allocation_shares(&[]).is_empty());
    }

    #[test]
    fn test_mom_history_all() {
        let entries = vec![
            entry(2025, 1, 1, "Bank", 100),
            entry(2025, 2, 1, "Bank", 150),
            entry(2025, 3, 1, "Gold", 120),
        ];
        let history = mom_history(&entries, None);
        assert_eq!(history.len(), 3);
        assert_eq!(history[0].change, Decimal::ZERO);
        assert_eq!(history[0].change_pct, Decimal::ZERO);
        assert_eq!(history[1].change, Decimal::from(50));
        assert_eq!(history[1].change_pct, Decimal::from(50));
        assert_eq!(history[2].change, Decimal::from(-30));
        assert_eq!(history[2].change_pct, Decimal::from(-20));
    }

    #[test]
    fn test_mom_history_category_skips_months_without_entries() {
        let entries = vec![
            entry(2025, 1, 1, "Bank", 100),
            entry(2025, 2, 1, "Gold", 150),
            entry(2025, 3, 1, "Bank", 120),
        ];
        let history = mom_history(&entries, Some("Bank"));
        let months: Vec<Month> = history.iter().map(|p| p.month).collect();
        assert_eq!(months, vec![month(2025, 1), month(2025, 3)]);
        assert_eq!(history[1].change_pct, Decimal::from(20));
    }

    #[test]
    fn test_huge_values_saturate() {
        let huge = Decimal::from_str_exact("50000000000000000000000000000").unwrap();
        let date = NaiveDate::from_ymd_opt(2025, 1, 31).unwrap();
        let assets = vec![
            Entry::new(date, "Bank", "a", huge),
            Entry::new(date, "Bank", "b", huge),
        ];
        let liabilities = vec![Entry::new(date, "Card", "c", huge)];

        assert_eq!(total(&assets), Decimal::MAX);
        assert_eq!(net_worth(&assets, &liabilities), Decimal::MAX - huge);
        assert_eq!(monthly_series(&assets).get(month(2025, 1)), Some(Decimal::MAX));
        assert_eq!(allocation(&assets)["Bank"], Decimal::MAX);
        assert_eq!(category_mom(&assets).categories[0].latest_value, Decimal::MAX);
        let shares = allocation_shares(&assets);
        assert_eq!(shares[0].share_pct, Decimal::ONE_HUNDRED);
        let dashboard = Dashboard::build(&assets, &liabilities);
        assert_eq!(dashboard.total_assets, Decimal::MAX);
    }

    #[test]
    fn test_tiny_predecessor_saturates_percentage() {
        let tiny = Decimal::new(1, 25);
        let series: TimeSeries = [
            (month(2025, 1), tiny),
            (month(2025, 2), Decimal::from(1_000_000_000)),
            (month(2025, 3), -Decimal::from(1_000_000_000)),
        ]
        .into_iter()
        .collect();
        let growth = growth_summary(&series);
        assert_eq!(pcts(&growth.points)[0], Decimal::MAX);
        assert_eq!(percent_change(tiny, -Decimal::from(1_000_000_000)), Decimal::MIN);
        // -200% after +MAX%
        assert_eq!(growth.latest, Decimal::from(-200));
        assert_eq!(growth.delta, Decimal::MIN);
        let history: Vec<Entry> = series
            .iter()
            .map(|(m, v)| Entry::new(m.date(), "Bank", "a", v))
            .collect();
        assert_eq!(mom_history(&history, None)[1].change_pct, Decimal::MAX);
    }

    #[test]
    fn test_aggregation_is_deterministic() {
        let entries = vec![entry(2025, 1, 1, "Bank", 100), entry(2025, 2, 1, "Gold", 7)];
        assert_eq!(monthly_series(&entries), monthly_series(&entries));
        assert_eq!(category_mom(&entries), category_mom(&entries));
        assert_eq!(allocation_shares(&entries), allocation_shares(&entries));
    }
}
