pub mod control;
pub mod coordinator;
pub mod planner;
pub mod scheduler;
pub mod valuator;

pub use control::{BotStatus, ControlSurface, StatusHandle};
pub use coordinator::Coordinator;
pub use scheduler::Scheduler;
pub use valuator::Valuator;

#[cfg(test)]
pub(crate) mod test_support {
    use std::collections::HashMap;

    use common::models::Side;
    use exchange::{ExchangeApi, ExchangeError};

    mockall::mock! {
        pub Exchange {}

        #[async_trait::async_trait]
        impl ExchangeApi for Exchange {
            async fn ticker_price(&self, symbol: &str) -> Result<f64, ExchangeError>;
            async fn wallet_balances(&self) -> Result<HashMap<String, f64>, ExchangeError>;
            async fn place_order(
                &self,
                symbol: &str,
                amount: f64,
                side: Side,
            ) -> Result<(), ExchangeError>;
        }
    }
}
