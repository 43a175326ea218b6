use std::collections::HashMap;
use std::sync::Arc;

use tracing::error;

use common::FIAT_ASSET;
use common::models::portfolio::{AssetAllocation, PortfolioSnapshot, sort_allocations};
use exchange::ExchangeApi;

/// Totals below this are treated as an empty portfolio; 1.0 is substituted
/// so percentage math never divides by zero.
const TOTAL_VALUE_EPSILON: f64 = 1e-8;

/// Values live balances at the live price and annotates each target asset
/// with its actual share. Exchange failures degrade to zeroes instead of
/// failing the pass.
pub struct Valuator {
    exchange: Arc<dyn ExchangeApi>,
    coin_asset: String,
    initial_investment: f64,
}

impl Valuator {
    pub fn new(exchange: Arc<dyn ExchangeApi>, coin_asset: String, initial_investment: f64) -> Self {
        Self {
            exchange,
            coin_asset,
            initial_investment,
        }
    }

    pub async fn portfolio(&self, targets: &HashMap<String, f64>) -> PortfolioSnapshot {
        let balances = match self.exchange.wallet_balances().await {
            Ok(balances) => balances,
            Err(e) => {
                error!("Error fetching wallet balance: {}", e);
                HashMap::new()
            }
        };
        let fiat_balance = balances.get(FIAT_ASSET).copied().unwrap_or(0.0);
        let coin_balance = balances.get(&self.coin_asset).copied().unwrap_or(0.0);

        let ticker = format!("{}_{}", FIAT_ASSET, self.coin_asset);
        let coin_price = match self.exchange.ticker_price(&ticker).await {
            Ok(price) => price,
            Err(e) => {
                error!("Error fetching price for {}: {}", self.coin_asset, e);
                0.0
            }
        };

        let coin_value = coin_balance * coin_price;
        let mut total_value = fiat_balance + coin_value;
        if total_value < TOTAL_VALUE_EPSILON {
            total_value = 1.0;
        }

        let roi = if self.initial_investment > 0.0 {
            (total_value - self.initial_investment) / self.initial_investment * 100.0
        } else {
            0.0
        };

        let mut portfolio = Vec::with_capacity(targets.len());
        for (asset, &target_pct) in targets {
            let (price, raw_balance, value) = if asset == FIAT_ASSET {
                (1.0, fiat_balance, fiat_balance)
            } else if *asset == self.coin_asset {
                (coin_price, coin_balance, coin_value)
            } else {
                // Unrecognized target symbols are zeroed, not rejected.
                (0.0, 0.0, 0.0)
            };

            portfolio.push(AssetAllocation {
                asset: asset.clone(),
                current_price: price,
                coin_balance: raw_balance,
                balance_thb: value,
                actual_pct: (value / total_value) * 100.0,
                target_pct,
            });
        }
        sort_allocations(&mut portfolio);

        PortfolioSnapshot {
            total_value,
            roi,
            coin_price,
            portfolio,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MockExchange;
    use common::config::default_targets;
    use exchange::ExchangeError;

    fn mock_with(balances: Vec<(&str, f64)>, price: f64) -> MockExchange {
        let map: HashMap<String, f64> = balances
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        let mut mock = MockExchange::new();
        mock.expect_wallet_balances()
            .returning(move || Ok(map.clone()));
        mock.expect_ticker_price().returning(move |_| Ok(price));
        mock
    }

    #[tokio::test]
    async fn actual_percentages_sum_to_100() {
        let mock = mock_with(vec![("THB", 4000.0), ("BTC", 0.06)], 100_000.0);
        let valuator = Valuator::new(Arc::new(mock), "BTC".to_string(), 10_000.0);

        let snapshot = valuator.portfolio(&default_targets("BTC")).await;

        assert_eq!(snapshot.total_value, 10_000.0);
        let pct_sum: f64 = snapshot.portfolio.iter().map(|a| a.actual_pct).sum();
        assert!((pct_sum - 100.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn roi_is_relative_to_initial_investment() {
        let mock = mock_with(vec![("THB", 6000.0), ("BTC", 0.06)], 100_000.0);
        let valuator = Valuator::new(Arc::new(mock), "BTC".to_string(), 10_000.0);

        let snapshot = valuator.portfolio(&default_targets("BTC")).await;
        assert!((snapshot.roi - 20.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn zero_initial_investment_reports_zero_roi() {
        let mock = mock_with(vec![("THB", 6000.0)], 100.0);
        let valuator = Valuator::new(Arc::new(mock), "BTC".to_string(), 0.0);

        let snapshot = valuator.portfolio(&default_targets("BTC")).await;
        assert_eq!(snapshot.roi, 0.0);
    }

    #[tokio::test]
    async fn balance_failure_degrades_to_zero_balances() {
        let mut mock = MockExchange::new();
        mock.expect_wallet_balances()
            .returning(|| Err(ExchangeError::Auth));
        mock.expect_ticker_price().returning(|_| Ok(100_000.0));
        let valuator = Valuator::new(Arc::new(mock), "BTC".to_string(), 10_000.0);

        let snapshot = valuator.portfolio(&default_targets("BTC")).await;

        // Empty portfolio trips the degenerate-total guard.
        assert_eq!(snapshot.total_value, 1.0);
        assert!(snapshot.portfolio.iter().all(|a| a.coin_balance == 0.0));
    }

    #[tokio::test]
    async fn price_failure_degrades_to_zero_price() {
        let mut mock = MockExchange::new();
        mock.expect_wallet_balances().returning(|| {
            Ok(HashMap::from([
                ("THB".to_string(), 5000.0),
                ("BTC".to_string(), 0.05),
            ]))
        });
        mock.expect_ticker_price().returning(|symbol| {
            Err(ExchangeError::PriceUnavailable {
                symbol: symbol.to_string(),
            })
        });
        let valuator = Valuator::new(Arc::new(mock), "BTC".to_string(), 10_000.0);

        let snapshot = valuator.portfolio(&default_targets("BTC")).await;

        assert_eq!(snapshot.coin_price, 0.0);
        let coin = snapshot
            .portfolio
            .iter()
            .find(|a| a.asset == "BTC")
            .unwrap();
        assert_eq!(coin.current_price, 0.0);
        assert_eq!(coin.balance_thb, 0.0);
    }

    #[tokio::test]
    async fn unrecognized_target_symbol_is_zeroed() {
        let mock = mock_with(vec![("THB", 5000.0), ("BTC", 0.05)], 100_000.0);
        let valuator = Valuator::new(Arc::new(mock), "BTC".to_string(), 10_000.0);

        let mut targets = default_targets("BTC");
        targets.insert("DOGE".to_string(), 0.0);

        let snapshot = valuator.portfolio(&targets).await;
        let doge = snapshot
            .portfolio
            .iter()
            .find(|a| a.asset == "DOGE")
            .unwrap();
        assert_eq!(doge.current_price, 0.0);
        assert_eq!(doge.coin_balance, 0.0);
        assert_eq!(doge.actual_pct, 0.0);
    }

    #[tokio::test]
    async fn fiat_is_priced_at_one_without_a_ticker_call() {
        let mock = mock_with(vec![("THB", 5000.0), ("BTC", 0.05)], 100_000.0);
        let valuator = Valuator::new(Arc::new(mock), "BTC".to_string(), 10_000.0);

        let snapshot = valuator.portfolio(&default_targets("BTC")).await;
        let fiat = snapshot
            .portfolio
            .iter()
            .find(|a| a.asset == "THB")
            .unwrap();
        assert_eq!(fiat.current_price, 1.0);
        assert_eq!(fiat.balance_thb, 5000.0);
    }
}
