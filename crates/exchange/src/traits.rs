use std::collections::HashMap;

use async_trait::async_trait;

use common::models::Side;

use crate::error::ExchangeError;

/// Everything the engine needs from the exchange. One implementation talks
/// to Bitkub; tests substitute a mock.
#[async_trait]
pub trait ExchangeApi: Send + Sync {
    /// Latest trade price for a ticker symbol (e.g. `THB_BTC`).
    async fn ticker_price(&self, symbol: &str) -> Result<f64, ExchangeError>;

    /// Raw wallet balances by asset. Callers filter to the assets they
    /// know and default the rest to zero.
    async fn wallet_balances(&self) -> Result<HashMap<String, f64>, ExchangeError>;

    /// Market order on a `_THB` pair. `amount` is THB spend for a buy and
    /// coin quantity for a sell.
    async fn place_order(&self, symbol: &str, amount: f64, side: Side)
    -> Result<(), ExchangeError>;
}
