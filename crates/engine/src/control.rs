use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tokio::sync::{RwLock, mpsc};
use tracing::warn;

use common::config::SharedConfig;
use common::models::{ExecutionMode, Notification, PortfolioSnapshot, TradeRecord};
use common::models::portfolio::AssetAllocation;
use storage::{StoreError, TradeStore};

use crate::planner::round_to;

/// Read-only view served to the external status surface.
#[derive(Debug, Clone, Serialize)]
pub struct BotStatus {
    pub status: String,
    pub mode: String,
    pub last_run: String,
    pub coin_price: f64,
    pub total_value: f64,
    pub roi: f64,
    pub portfolio: Vec<AssetAllocation>,
}

impl BotStatus {
    fn initial(mode: ExecutionMode) -> Self {
        Self {
            status: "Running".to_string(),
            mode: mode.to_string(),
            last_run: String::new(),
            coin_price: 0.0,
            total_value: 0.0,
            roi: 0.0,
            portfolio: Vec::new(),
        }
    }
}

/// Last-pass result published by the coordinator, read by the control
/// surface. Display state only; nothing trades off it.
#[derive(Clone)]
pub struct StatusHandle {
    inner: Arc<RwLock<BotStatus>>,
}

impl StatusHandle {
    pub fn new(mode: ExecutionMode) -> Self {
        Self {
            inner: Arc::new(RwLock::new(BotStatus::initial(mode))),
        }
    }

    pub async fn publish(&self, snapshot: &PortfolioSnapshot, mode: ExecutionMode) {
        let mut status = self.inner.write().await;
        status.mode = mode.to_string();
        status.last_run = Utc::now().format("%H:%M:%S").to_string();
        status.coin_price = round_to(snapshot.coin_price, 2);
        status.total_value = round_to(snapshot.total_value, 2);
        status.roi = round_to(snapshot.roi, 2);
        status.portfolio = snapshot.portfolio.clone();
    }

    pub async fn get(&self) -> BotStatus {
        self.inner.read().await.clone()
    }

    async fn set_mode(&self, mode: ExecutionMode) {
        self.inner.write().await.mode = mode.to_string();
    }
}

/// Operations exposed to the external control surface: status snapshot,
/// production trade history, and the dry/prod mode toggle.
pub struct ControlSurface {
    shared: SharedConfig,
    status: StatusHandle,
    store: TradeStore,
    notify_tx: mpsc::Sender<Notification>,
}

impl ControlSurface {
    pub fn new(
        shared: SharedConfig,
        status: StatusHandle,
        store: TradeStore,
        notify_tx: mpsc::Sender<Notification>,
    ) -> Self {
        Self {
            shared,
            status,
            store,
            notify_tx,
        }
    }

    pub async fn status(&self) -> BotStatus {
        self.status.get().await
    }

    pub async fn history(&self, limit: i64) -> Result<Vec<TradeRecord>, StoreError> {
        self.store.recent(ExecutionMode::Production, limit).await
    }

    /// Accepts `"dry"` or `"prod"`; anything else is ignored and returns
    /// `None`. The write lock is held only for the flag flip.
    pub async fn set_mode(&self, mode: &str) -> Option<ExecutionMode> {
        let dry_run = match mode {
            "dry" => true,
            "prod" => false,
            _ => return None,
        };

        let new_mode = self.shared.set_dry_run(dry_run).await;
        self.status.set_mode(new_mode).await;

        if let Err(e) = self.notify_tx.try_send(Notification::ModeChange { mode: new_mode }) {
            warn!("Mode-change notification dropped: {}", e);
        }

        Some(new_mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::config::default_targets;

    async fn surface() -> (ControlSurface, mpsc::Receiver<Notification>) {
        let shared = SharedConfig::new(true, 5.0, default_targets("BTC"));
        let status = StatusHandle::new(ExecutionMode::DryRun);
        let store = TradeStore::open_in_memory().await.unwrap();
        let (tx, rx) = mpsc::channel(8);
        (ControlSurface::new(shared, status, store, tx), rx)
    }

    #[tokio::test]
    async fn set_mode_toggles_and_notifies() {
        let (surface, mut rx) = surface().await;

        let mode = surface.set_mode("prod").await;
        assert_eq!(mode, Some(ExecutionMode::Production));
        assert_eq!(surface.status().await.mode, "PRODUCTION");

        match rx.recv().await {
            Some(Notification::ModeChange { mode }) => {
                assert_eq!(mode, ExecutionMode::Production)
            }
            other => panic!("expected mode-change notification, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unknown_mode_is_ignored() {
        let (surface, mut rx) = surface().await;

        assert_eq!(surface.set_mode("yolo").await, None);
        assert_eq!(surface.status().await.mode, "DRY_RUN");
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn history_is_production_only() {
        let (surface, _rx) = surface().await;
        let trades = surface.history(10).await.unwrap();
        assert!(trades.is_empty());
    }
}
