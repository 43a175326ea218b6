use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Trade direction, serialized lowercase to match the exchange API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Buy => "buy",
            Side::Sell => "sell",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Side {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "buy" => Ok(Side::Buy),
            "sell" => Ok(Side::Sell),
            other => Err(format!("unknown trade side: {other}")),
        }
    }
}

/// Whether a pass simulates trades or submits them for real.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionMode {
    DryRun,
    Production,
}

impl ExecutionMode {
    pub fn from_dry_run(dry_run: bool) -> Self {
        if dry_run {
            ExecutionMode::DryRun
        } else {
            ExecutionMode::Production
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionMode::DryRun => "DRY_RUN",
            ExecutionMode::Production => "PRODUCTION",
        }
    }
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExecutionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DRY_RUN" => Ok(ExecutionMode::DryRun),
            "PRODUCTION" => Ok(ExecutionMode::Production),
            other => Err(format!("unknown execution mode: {other}")),
        }
    }
}

/// One trade the planner wants executed. Transient; only the resulting
/// record is persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeIntent {
    pub asset: String,
    pub operation: Side,
    /// Trade value in THB, rounded to 2 dp.
    pub amount_thb: f64,
    /// Trade quantity in coin units, rounded to 8 dp.
    pub coin_amount: f64,
    /// Reference price the sizing was computed against.
    pub price: f64,
    /// Deviation (percentage points) that triggered the trade.
    pub deviation: f64,
}

impl TradeIntent {
    /// Amount the exchange endpoint expects: THB spend for a buy,
    /// coin quantity for a sell.
    pub fn order_amount(&self) -> f64 {
        match self.operation {
            Side::Buy => self.amount_thb,
            Side::Sell => self.coin_amount,
        }
    }
}

/// Immutable historical fact of one trade attempt, as stored.
#[derive(Debug, Clone, Serialize)]
pub struct TradeRecord {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub asset: String,
    pub operation: Side,
    pub amount_thb: f64,
    pub coin_amount: f64,
    pub price: f64,
    pub mode: ExecutionMode,
    pub deviation: f64,
    pub log_message: String,
}

/// Row about to be inserted; the store assigns id and timestamp.
#[derive(Debug, Clone)]
pub struct TradeRecordInsert {
    pub asset: String,
    pub operation: Side,
    pub amount_thb: f64,
    pub coin_amount: f64,
    pub price: f64,
    pub mode: ExecutionMode,
    pub deviation: f64,
    pub log_message: String,
}

impl TradeRecordInsert {
    pub fn from_intent(intent: &TradeIntent, mode: ExecutionMode, log_message: String) -> Self {
        Self {
            asset: intent.asset.clone(),
            operation: intent.operation,
            amount_thb: intent.amount_thb,
            coin_amount: intent.coin_amount,
            price: intent.price,
            mode,
            deviation: intent.deviation,
            log_message,
        }
    }
}
