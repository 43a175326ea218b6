use std::sync::Arc;

use dotenvy::dotenv;
use tokio::sync::mpsc;
use tracing::warn;

use common::config::{BotConfig, SharedConfig, default_targets};
use common::logger;
use common::models::{ExecutionMode, Notification};
use engine::{Coordinator, Scheduler, StatusHandle, Valuator};
use exchange::{BitkubClient, ExchangeApi};
use storage::TradeStore;

use crate::services::telegram_service::TelegramService;

mod services;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    logger::setup_logger();

    // Missing credentials are the only startup-fatal condition besides
    // an unopenable database.
    let config = BotConfig::from_env()?;

    let store = TradeStore::open(&config.db_path).await?;

    let exchange: Arc<dyn ExchangeApi> = Arc::new(BitkubClient::new(
        config.base_url.clone(),
        config.api_key.clone(),
        config.api_secret.clone(),
    ));

    let shared = SharedConfig::new(
        config.dry_run,
        config.threshold_pct,
        default_targets(&config.coin_asset),
    );
    let status = StatusHandle::new(ExecutionMode::from_dry_run(config.dry_run));

    let (notify_tx, notify_rx) = mpsc::channel::<Notification>(64);
    tokio::spawn(TelegramService::from_env().start(notify_rx));

    if let Err(e) = notify_tx.try_send(Notification::Startup {
        mode: ExecutionMode::from_dry_run(config.dry_run),
        initial_investment: config.initial_investment,
        threshold_pct: config.threshold_pct,
    }) {
        warn!("Startup notification dropped: {}", e);
    }

    let valuator = Valuator::new(
        exchange.clone(),
        config.coin_asset.clone(),
        config.initial_investment,
    );
    let coordinator = Coordinator::new(exchange, valuator, store, shared, status, notify_tx);

    Scheduler::new(coordinator).run().await
}
