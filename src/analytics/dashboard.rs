use crate::analytics::{
    allocation_shares, category_mom, growth_summary, monthly_series, net_worth_trend, total,
    AllocationShare, CategoryMom, GrowthSummary, TimeSeries,
};
use crate::model::{Entry, Month};
use rust_decimal::Decimal;
use serde::Serialize;

/// Assets, liabilities and their difference for one month.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
pub struct NetWorthPoint {
    pub month: Month,
    pub assets: Decimal,
    pub liabilities: Decimal,
    pub net: Decimal,
}

/// Everything the dashboard shows, computed from one load of the ledger.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct Dashboard {
    /// True when there are no assets and no liabilities at all.
    pub is_empty: bool,
    pub total_assets: Decimal,
    pub total_liabilities: Decimal,
    pub net_worth: Decimal,
    pub asset_series: TimeSeries,
    pub liability_series: TimeSeries,
    pub net_worth_series: TimeSeries,
    pub breakdown: Vec<NetWorthPoint>,
    pub net_worth_growth: GrowthSummary,
    pub asset_category_growth: CategoryMom,
    pub liability_category_growth: CategoryMom,
    pub asset_allocation: Vec<AllocationShare>,
    pub liability_allocation: Vec<AllocationShare>,
}

impl Dashboard {
    pub fn build(assets: &[Entry], liabilities: &[Entry]) -> Self {
        let asset_series = monthly_series(assets);
        let liability_series = monthly_series(liabilities);
        let net_worth_series = net_worth_trend(&asset_series, &liability_series);
        let breakdown = net_worth_series
            .iter()
            .map(|(month, net)| NetWorthPoint {
                month,
                assets: asset_series.get_or_zero(month),
                liabilities: liability_series.get_or_zero(month),
                net,
            })
            .collect();
        let total_assets = total(assets);
        let total_liabilities = total(liabilities);

        Self {
            is_empty: assets.is_empty() && liabilities.is_empty(),
            total_assets,
            total_liabilities,
            net_worth: total_assets.saturating_sub(total_liabilities),
            net_worth_growth: growth_summary(&net_worth_series),
            asset_series,
            liability_series,
            net_worth_series,
            breakdown,
            asset_category_growth: category_mom(assets),
            liability_category_growth: category_mom(liabilities),
            asset_allocation: allocation_shares(assets),
            liability_allocation: allocation_shares(liabilities),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn entry(m: u32, category: &str, value: i64) -> Entry {
        Entry::new(
            NaiveDate::from_ymd_opt(2025, m, 15).unwrap(),
            category,
            "account",
            Decimal::from(value),
        )
    }

    #[test]
    fn test_empty_dashboard() {
        let dashboard = Dashboard::build(&[], &[]);
        assert!(dashboard.is_empty);
        assert_eq!(dashboard.net_worth, Decimal::ZERO);
        assert!(dashboard.net_worth_series.is_empty());
        assert!(dashboard.breakdown.is_empty());
        assert_eq!(dashboard.net_worth_growth, GrowthSummary::default());
    }

    #[test]
    fn test_dashboard() {
        let assets = vec![entry(1, "Bank", 100), entry(2, "Bank", 200), entry(2, "Gold", 100)];
        let liabilities = vec![entry(2, "Card", 50)];
        let dashboard = Dashboard::build(&assets, &liabilities);

        assert!(!dashboard.is_empty);
        assert_eq!(dashboard.total_assets, Decimal::from(400));
        assert_eq!(dashboard.total_liabilities, Decimal::from(50));
        assert_eq!(dashboard.net_worth, Decimal::from(350));
        assert_eq!(dashboard.breakdown.len(), 2);
        assert_eq!(dashboard.breakdown[0].liabilities, Decimal::ZERO);
        assert_eq!(dashboard.breakdown[1].net, Decimal::from(250));
        // 100 -> 250
        assert_eq!(dashboard.net_worth_growth.latest, Decimal::from(150));
        assert_eq!(dashboard.asset_category_growth.categories.len(), 2);
        assert_eq!(dashboard.asset_allocation[0].category, "Bank");
        assert_eq!(dashboard.liability_allocation[0].share_pct, Decimal::from(100));
    }

    #[test]
    fn test_liabilities_only() {
        let dashboard = Dashboard::build(&[], &[entry(3, "Card", 20)]);
        assert!(!dashboard.is_empty);
        assert_eq!(dashboard.net_worth, Decimal::from(-20));
        assert_eq!(dashboard.breakdown[0].assets, Decimal::ZERO);
    }
}
