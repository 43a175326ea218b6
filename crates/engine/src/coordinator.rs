use std::sync::Arc;

use chrono::Utc;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use common::{FIAT_ASSET, FIAT_PAIR_SUFFIX};
use common::config::SharedConfig;
use common::models::{
    ExecutionMode, Notification, TradeIntent, TradeRecordInsert,
};
use exchange::ExchangeApi;
use storage::TradeStore;

use crate::control::StatusHandle;
use crate::planner::{self, PlanOutcome};
use crate::valuator::Valuator;

/// Drives one full rebalance pass: value the portfolio, evaluate each
/// non-fiat allocation, dispatch or simulate trades, record outcomes,
/// publish status.
pub struct Coordinator {
    exchange: Arc<dyn ExchangeApi>,
    valuator: Valuator,
    store: TradeStore,
    shared: SharedConfig,
    status: StatusHandle,
    notify_tx: mpsc::Sender<Notification>,
}

impl Coordinator {
    pub fn new(
        exchange: Arc<dyn ExchangeApi>,
        valuator: Valuator,
        store: TradeStore,
        shared: SharedConfig,
        status: StatusHandle,
        notify_tx: mpsc::Sender<Notification>,
    ) -> Self {
        Self {
            exchange,
            valuator,
            store,
            shared,
            status,
            notify_tx,
        }
    }

    pub async fn run_pass(&self) {
        // Snapshot settings up front; the lock is never held across I/O.
        let settings = self.shared.snapshot().await;
        let mode = settings.mode();

        let snapshot = self.valuator.portfolio(&settings.targets).await;

        info!(
            "--- Rebalance Check ({}) | Total Value: {:.2} THB | ROI: {:.2}% ---",
            Utc::now().format("%H:%M:%S"),
            snapshot.total_value,
            snapshot.roi
        );

        for allocation in snapshot.portfolio.iter().filter(|a| a.asset != FIAT_ASSET) {
            match planner::evaluate(allocation, snapshot.total_value, settings.threshold_pct) {
                PlanOutcome::WithinTolerance => {
                    info!(
                        "{}: within tolerance ({:.2}%), no rebalance needed",
                        allocation.asset, allocation.actual_pct
                    );
                }
                PlanOutcome::PriceUnavailable => {
                    error!(
                        "{}: price is zero, cannot size a trade this pass",
                        allocation.asset
                    );
                }
                PlanOutcome::BelowMinimumBuy { amount_thb } => {
                    // Deliberately leaves no trade record.
                    info!(
                        "{}: skipping buy of {:.2} THB, below the {:.2} THB minimum",
                        allocation.asset,
                        amount_thb,
                        planner::MIN_BUY_VALUE_THB
                    );
                }
                PlanOutcome::Trade(intent) => self.execute(&intent, mode).await,
            }
        }

        self.status.publish(&snapshot, mode).await;
    }

    async fn execute(&self, intent: &TradeIntent, mode: ExecutionMode) {
        let pair = format!("{}{}", intent.asset, FIAT_PAIR_SUFFIX);

        match mode {
            ExecutionMode::DryRun => {
                let message = format!(
                    "Simulated {} of {:.8} {} worth {:.2} THB on {}",
                    intent.operation, intent.coin_amount, intent.asset, intent.amount_thb, pair
                );
                info!("{}: {}", mode, message);

                self.notify_trade(intent, mode);
                self.record(intent, mode, message).await;
            }
            ExecutionMode::Production => {
                info!(
                    "{}: submitting {} of {:.8} {} (worth {:.2} THB)",
                    mode, intent.operation, intent.coin_amount, intent.asset, intent.amount_thb
                );

                match self
                    .exchange
                    .place_order(&pair, intent.order_amount(), intent.operation)
                    .await
                {
                    Ok(()) => {
                        let message = "Order submitted to Bitkub".to_string();
                        self.notify_trade(intent, mode);
                        self.record(intent, mode, message).await;
                    }
                    Err(e) => {
                        // Recorded but not notified; the pass moves on.
                        let message = format!("Order failed: {e}");
                        error!("{}: {}", intent.asset, message);
                        self.record(intent, mode, message).await;
                    }
                }
            }
        }
    }

    fn notify_trade(&self, intent: &TradeIntent, mode: ExecutionMode) {
        let event = Notification::Trade {
            asset: intent.asset.clone(),
            operation: intent.operation,
            amount_thb: intent.amount_thb,
            coin_amount: intent.coin_amount,
            price: intent.price,
            mode,
        };
        if let Err(e) = self.notify_tx.try_send(event) {
            warn!("Trade notification dropped: {}", e);
        }
    }

    async fn record(&self, intent: &TradeIntent, mode: ExecutionMode, message: String) {
        let row = TradeRecordInsert::from_intent(intent, mode, message);
        if let Err(e) = self.store.append(&row).await {
            error!("Error saving trade to DB: {}", e);
        }
    }
}
