use super::trade::{ExecutionMode, Side};

/// Events pushed onto the notification queue. Delivery is best-effort and
/// never affects a pass outcome.
#[derive(Debug, Clone)]
pub enum Notification {
    Startup {
        mode: ExecutionMode,
        initial_investment: f64,
        threshold_pct: f64,
    },
    Trade {
        asset: String,
        operation: Side,
        amount_thb: f64,
        coin_amount: f64,
        price: f64,
        mode: ExecutionMode,
    },
    ModeChange {
        mode: ExecutionMode,
    },
}
