use std::collections::HashMap;
use std::env;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::RwLock;
use tracing::info;

use crate::FIAT_ASSET;
use crate::models::ExecutionMode;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("API credentials not configured (BITKUB_API_KEY / BITKUB_API_SECRET)")]
    MissingCredentials,
    #[error("required environment variable {0} not set")]
    MissingVar(&'static str),
}

/// Startup configuration, read once from the environment.
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub api_key: String,
    pub api_secret: String,
    pub base_url: String,
    pub dry_run: bool,
    pub initial_investment: f64,
    pub threshold_pct: f64,
    pub coin_asset: String,
    pub db_path: String,
}

impl BotConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = env::var("BITKUB_API_KEY").unwrap_or_default();
        let api_secret = env::var("BITKUB_API_SECRET").unwrap_or_default();
        if api_key.is_empty() || api_secret.is_empty() {
            return Err(ConfigError::MissingCredentials);
        }

        let coin_asset =
            env::var("ASSET_SYMBOLS").map_err(|_| ConfigError::MissingVar("ASSET_SYMBOLS"))?;

        let base_url = env::var("BITKUB_API_BASE_URL")
            .unwrap_or_else(|_| "https://api.bitkub.com/api".to_string());

        let dry_run = env::var("IS_DRY_RUN")
            .ok()
            .and_then(|v| v.parse::<bool>().ok())
            .unwrap_or(false);

        let initial_investment = env::var("INITIAL_INVESTMENT")
            .ok()
            .and_then(|v| v.parse::<f64>().ok())
            .unwrap_or(0.0);

        let threshold_pct = env::var("THRESHOLD_PERCENTAGE")
            .ok()
            .and_then(|v| v.parse::<f64>().ok())
            .unwrap_or(0.0);

        let db_path = env::var("DB_PATH").unwrap_or_else(|_| "data/trades.db".to_string());

        let config = Self {
            api_key,
            api_secret,
            base_url,
            dry_run,
            initial_investment,
            threshold_pct,
            coin_asset,
            db_path,
        };

        info!(
            "Config loaded. Mode: {}, Initial Inv: {:.2} THB, Threshold: {:.2}%",
            ExecutionMode::from_dry_run(config.dry_run),
            config.initial_investment,
            config.threshold_pct
        );

        Ok(config)
    }
}

/// 50/50 split between the fiat leg and the tracked coin.
pub fn default_targets(coin_asset: &str) -> HashMap<String, f64> {
    let mut targets = HashMap::new();
    targets.insert(FIAT_ASSET.to_string(), 50.0);
    targets.insert(coin_asset.to_string(), 50.0);
    targets
}

/// Settings a rebalance pass snapshots at its start.
#[derive(Debug, Clone)]
pub struct RuntimeSettings {
    pub dry_run: bool,
    pub threshold_pct: f64,
    pub targets: HashMap<String, f64>,
}

impl RuntimeSettings {
    pub fn mode(&self) -> ExecutionMode {
        ExecutionMode::from_dry_run(self.dry_run)
    }
}

/// Mutable configuration shared between the pass loop and the external
/// control surface. Readers snapshot and release; the lock is never held
/// across network I/O.
#[derive(Clone)]
pub struct SharedConfig {
    inner: Arc<RwLock<RuntimeSettings>>,
}

impl SharedConfig {
    pub fn new(dry_run: bool, threshold_pct: f64, targets: HashMap<String, f64>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(RuntimeSettings {
                dry_run,
                threshold_pct,
                targets,
            })),
        }
    }

    pub async fn snapshot(&self) -> RuntimeSettings {
        self.inner.read().await.clone()
    }

    pub async fn set_dry_run(&self, dry_run: bool) -> ExecutionMode {
        let mut settings = self.inner.write().await;
        settings.dry_run = dry_run;
        settings.mode()
    }

    pub async fn set_targets(&self, targets: HashMap<String, f64>) {
        self.inner.write().await.targets = targets;
    }
}
