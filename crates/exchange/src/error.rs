use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExchangeError {
    #[error("API credentials not configured")]
    Auth,

    #[error("exchange returned error code {code}: {body}")]
    Api { code: i64, body: String },

    #[error("price not found or invalid format for {symbol}")]
    PriceUnavailable { symbol: String },

    #[error("invalid order: {0}")]
    InvalidOrder(String),

    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}
