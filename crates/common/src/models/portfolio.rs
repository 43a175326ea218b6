use std::cmp::Ordering;

use serde::Serialize;

/// One asset's slice of the portfolio, valued at the last fetched price.
#[derive(Debug, Clone, Serialize)]
pub struct AssetAllocation {
    pub asset: String,
    pub current_price: f64,
    pub coin_balance: f64,
    pub balance_thb: f64,
    pub actual_pct: f64,
    pub target_pct: f64,
}

/// Valued portfolio produced fresh on every pass. Allocations are ordered
/// by target percentage descending, symbol ascending.
#[derive(Debug, Clone, Serialize)]
pub struct PortfolioSnapshot {
    pub total_value: f64,
    pub roi: f64,
    /// Last fetched price of the tracked coin (display state only).
    pub coin_price: f64,
    pub portfolio: Vec<AssetAllocation>,
}

pub fn sort_allocations(allocations: &mut [AssetAllocation]) {
    allocations.sort_by(|a, b| {
        b.target_pct
            .partial_cmp(&a.target_pct)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.asset.cmp(&b.asset))
    });
}
