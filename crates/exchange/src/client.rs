use std::collections::HashMap;
use std::time::Duration;

use chrono::Utc;
use hmac::{Hmac, Mac};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};
use sha2::Sha256;
use tracing::info;

use common::FIAT_PAIR_SUFFIX;
use common::models::Side;

use crate::error::ExchangeError;
use crate::traits::ExchangeApi;

type HmacSha256 = Hmac<Sha256>;

const WALLET_ENDPOINT: &str = "v3/market/wallet";
const PLACE_BID_ENDPOINT: &str = "v3/market/place-bid";
const PLACE_ASK_ENDPOINT: &str = "v3/market/place-ask";

#[derive(Debug, Deserialize)]
struct WalletResponse {
    #[allow(dead_code)]
    error: i64,
    result: HashMap<String, f64>,
}

/// Bitkub private-request signature: HMAC-SHA256 over
/// `timestamp + UPPERCASE(method) + path + body`, hex-encoded.
pub fn sign_payload(
    api_secret: &str,
    timestamp: &str,
    method: &str,
    path: &str,
    body: &str,
) -> String {
    let payload = format!("{}{}{}{}", timestamp, method.to_uppercase(), path, body);
    let mut mac = HmacSha256::new_from_slice(api_secret.as_bytes())
        .expect("HMAC can take key of any size");
    mac.update(payload.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Fixed-precision formatting with trailing zeros (and a bare trailing
/// decimal point) stripped, then reparsed. The exchange rejects amounts
/// carrying spurious trailing zeros.
fn normalize_amount(amount: f64, precision: usize) -> Result<f64, ExchangeError> {
    let formatted = format!("{amount:.precision$}");
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    trimmed
        .parse::<f64>()
        .map_err(|e| ExchangeError::InvalidOrder(format!("unparsable amount {trimmed}: {e}")))
}

pub struct BitkubClient {
    client: Client,
    base_url: String,
    api_key: String,
    api_secret: String,
}

impl BitkubClient {
    pub fn new(base_url: String, api_key: String, api_secret: String) -> Self {
        Self {
            client: Client::builder()
                .user_agent("bitkub_rebalance_bot/0.1.0")
                .timeout(Duration::from_secs(10))
                .build()
                .expect("Failed to build HTTP client."),
            base_url,
            api_key,
            api_secret,
        }
    }

    /// Signs and sends a private POST. `payload: None` signs an empty body.
    /// A decoded response with a nonzero `error` field fails the call.
    async fn send_private(
        &self,
        endpoint: &str,
        payload: Option<&Value>,
    ) -> Result<Value, ExchangeError> {
        if self.api_key.is_empty() || self.api_secret.is_empty() {
            return Err(ExchangeError::Auth);
        }

        let body = match payload {
            Some(value) => serde_json::to_string(value)?,
            None => String::new(),
        };

        // Fresh timestamp per request; the replay window is server-side.
        let timestamp = Utc::now().timestamp_millis().to_string();
        let path = format!("/api/{endpoint}");
        let signature = sign_payload(&self.api_secret, &timestamp, "POST", &path, &body);

        let resp = self
            .client
            .post(format!("{}/{}", self.base_url, endpoint))
            .header("Accept", "application/json")
            .header("Content-Type", "application/json")
            .header("X-BTK-TIMESTAMP", &timestamp)
            .header("X-BTK-SIGN", &signature)
            .header("X-BTK-APIKEY", &self.api_key)
            .body(body)
            .send()
            .await?;

        let text = resp.text().await?;
        let value: Value = serde_json::from_str(&text)?;

        if let Some(code) = value.get("error").and_then(Value::as_i64) {
            if code != 0 {
                return Err(ExchangeError::Api { code, body: text });
            }
        }

        Ok(value)
    }

    async fn send_order_request(
        &self,
        endpoint: &str,
        symbol: &str,
        amount: f64,
        side: Side,
    ) -> Result<(), ExchangeError> {
        let precision = match side {
            Side::Buy => 2,
            Side::Sell => 8,
        };
        let final_amount = normalize_amount(amount, precision)?;

        let payload = json!({
            "sym": symbol,
            "amt": final_amount,
            "rat": 0.0,
            "typ": "market",
        });

        info!("Placing order: {} {} {}", side, final_amount, symbol);

        let value = self.send_private(endpoint, Some(&payload)).await?;

        // Success requires an explicit error code of zero.
        match value.get("error").and_then(Value::as_i64) {
            Some(0) => Ok(()),
            code => Err(ExchangeError::Api {
                code: code.unwrap_or(-1),
                body: value.to_string(),
            }),
        }
    }
}

#[async_trait::async_trait]
impl ExchangeApi for BitkubClient {
    async fn ticker_price(&self, symbol: &str) -> Result<f64, ExchangeError> {
        let url = format!("{}/market/ticker?sym={}", self.base_url, symbol);
        let text = self.client.get(&url).send().await?.text().await?;

        let result: HashMap<String, Value> = serde_json::from_str(&text)?;

        if let Some(data) = result.get(symbol) {
            // Bitkub has served `last` both as a string and as a number.
            if let Some(last) = data.get("last") {
                if let Some(s) = last.as_str() {
                    if let Ok(price) = s.parse::<f64>() {
                        return Ok(price);
                    }
                }
                if let Some(price) = last.as_f64() {
                    return Ok(price);
                }
            }
        }

        Err(ExchangeError::PriceUnavailable {
            symbol: symbol.to_string(),
        })
    }

    async fn wallet_balances(&self) -> Result<HashMap<String, f64>, ExchangeError> {
        let value = self.send_private(WALLET_ENDPOINT, None).await?;
        let wallet: WalletResponse = serde_json::from_value(value)?;
        Ok(wallet.result)
    }

    async fn place_order(
        &self,
        symbol: &str,
        amount: f64,
        side: Side,
    ) -> Result<(), ExchangeError> {
        if amount <= 0.0 {
            return Err(ExchangeError::InvalidOrder(format!(
                "cannot send order with non-positive amount: {amount:.8}"
            )));
        }
        if !symbol.ends_with(FIAT_PAIR_SUFFIX) {
            return Err(ExchangeError::InvalidOrder(format!(
                "invalid trading symbol format: {symbol} must end with {FIAT_PAIR_SUFFIX}"
            )));
        }

        let endpoint = match side {
            Side::Buy => PLACE_BID_ENDPOINT,
            Side::Sell => PLACE_ASK_ENDPOINT,
        };
        self.send_order_request(endpoint, symbol, amount, side).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_matches_known_vector() {
        let sig = sign_payload(
            "top-secret",
            "1700000000000",
            "post",
            "/api/v3/market/wallet",
            "{}",
        );
        assert_eq!(
            sig,
            "52a30ebf2b393cfa583da5170e27f07b14102043d003543ff6fb63c0191c9f3e"
        );
    }

    #[test]
    fn empty_body_signs_differently_from_empty_object() {
        let with_body = sign_payload(
            "top-secret",
            "1700000000000",
            "POST",
            "/api/v3/market/wallet",
            "{}",
        );
        let without_body = sign_payload(
            "top-secret",
            "1700000000000",
            "POST",
            "/api/v3/market/wallet",
            "",
        );
        assert_eq!(
            without_body,
            "4be4e7c015b158359af9461eee860d817828d251280a91a6b43c2503c49588b9"
        );
        assert_ne!(with_body, without_body);
    }

    #[test]
    fn signing_is_deterministic() {
        let a = sign_payload("s", "1712345678901", "POST", "/api/v3/market/place-bid", "x");
        let b = sign_payload("s", "1712345678901", "POST", "/api/v3/market/place-bid", "x");
        assert_eq!(a, b);
    }

    #[test]
    fn normalize_strips_trailing_zeros() {
        assert_eq!(normalize_amount(1000.0, 2).unwrap(), 1000.0);
        assert_eq!(normalize_amount(0.12345600, 8).unwrap(), 0.123456);
        assert_eq!(normalize_amount(250.10, 2).unwrap(), 250.1);
        assert_eq!(normalize_amount(10.00000000, 8).unwrap(), 10.0);
    }

    #[tokio::test]
    async fn rejects_non_positive_amount_locally() {
        let client = BitkubClient::new(
            "http://127.0.0.1:1".to_string(),
            "key".to_string(),
            "secret".to_string(),
        );
        let err = client.place_order("BTC_THB", 0.0, Side::Buy).await.unwrap_err();
        assert!(matches!(err, ExchangeError::InvalidOrder(_)));
    }

    #[tokio::test]
    async fn rejects_non_thb_pair_locally() {
        let client = BitkubClient::new(
            "http://127.0.0.1:1".to_string(),
            "key".to_string(),
            "secret".to_string(),
        );
        let err = client
            .place_order("BTC_USDT", 1.0, Side::Sell)
            .await
            .unwrap_err();
        assert!(matches!(err, ExchangeError::InvalidOrder(_)));
    }

    #[tokio::test]
    async fn missing_credentials_fail_before_any_network_call() {
        let client =
            BitkubClient::new("http://127.0.0.1:1".to_string(), String::new(), String::new());
        let err = client.wallet_balances().await.unwrap_err();
        assert!(matches!(err, ExchangeError::Auth));
    }
}
