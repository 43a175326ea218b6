use common::models::{AssetAllocation, Side, TradeIntent};

/// Bitkub rejects buy orders worth less than this.
pub const MIN_BUY_VALUE_THB: f64 = 10.0;

/// System-wide rounding rule: scale, round half away from zero, unscale.
pub fn round_to(value: f64, precision: i32) -> f64 {
    let ratio = 10f64.powi(precision);
    (value * ratio).round() / ratio
}

/// Terminal outcome of evaluating one allocation for one pass.
#[derive(Debug, Clone, PartialEq)]
pub enum PlanOutcome {
    WithinTolerance,
    /// Price <= 0 signals an upstream fetch failure; no sizing possible.
    PriceUnavailable,
    BelowMinimumBuy { amount_thb: f64 },
    Trade(TradeIntent),
}

/// Pure trade-sizing decision for a single non-fiat allocation.
///
/// A deviation exactly equal to the threshold does not trade. Trade value
/// rounds to 2 dp in THB, coin quantity to 8 dp.
pub fn evaluate(
    allocation: &AssetAllocation,
    total_value: f64,
    threshold_pct: f64,
) -> PlanOutcome {
    let deviation = (allocation.actual_pct - allocation.target_pct).abs();
    if deviation <= threshold_pct {
        return PlanOutcome::WithinTolerance;
    }

    let operation = if allocation.actual_pct > allocation.target_pct {
        Side::Sell
    } else {
        Side::Buy
    };

    let amount_thb = round_to((deviation / 100.0) * total_value, 2);

    if allocation.current_price <= 0.0 {
        return PlanOutcome::PriceUnavailable;
    }

    let coin_amount = round_to(amount_thb / allocation.current_price, 8);

    if operation == Side::Buy && amount_thb < MIN_BUY_VALUE_THB {
        return PlanOutcome::BelowMinimumBuy { amount_thb };
    }

    PlanOutcome::Trade(TradeIntent {
        asset: allocation.asset.clone(),
        operation,
        amount_thb,
        coin_amount,
        price: allocation.current_price,
        deviation,
    })
}
