pub mod config;
pub mod logger;
pub mod models;

/// The fiat leg of every portfolio. Never traded directly; priced at 1.0.
pub const FIAT_ASSET: &str = "THB";

/// Order symbols must carry this suffix (e.g. `BTC_THB`).
pub const FIAT_PAIR_SUFFIX: &str = "_THB";
