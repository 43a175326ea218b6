use std::env;

use teloxide::prelude::*;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use common::models::{Notification, Side};

/// Drains the notification queue and forwards events to Telegram.
/// Best-effort: send failures are logged and swallowed, and a bot left
/// unconfigured degrades to log-only delivery.
pub struct TelegramService {
    channel: Option<(Bot, ChatId)>,
}

impl TelegramService {
    pub fn from_env() -> Self {
        let channel = match (env::var("TELEGRAM_BOT_TOKEN"), env::var("TELEGRAM_CHAT_ID")) {
            (Ok(token), Ok(chat)) => match chat.parse::<i64>() {
                Ok(id) => Some((Bot::new(token), ChatId(id))),
                Err(_) => {
                    warn!("TELEGRAM_CHAT_ID must be a number; notifications disabled");
                    None
                }
            },
            _ => {
                info!("Telegram not configured; notifications will be logged only");
                None
            }
        };

        Self { channel }
    }

    pub async fn start(self, mut rx: mpsc::Receiver<Notification>) {
        info!("Starting notification service");

        while let Some(event) = rx.recv().await {
            let text = Self::render(&event);
            info!("notify: {}", text);

            if let Some((bot, chat_id)) = &self.channel {
                if let Err(e) = bot.send_message(*chat_id, text).await {
                    error!("Failed to send Telegram message: {}", e);
                }
            }
        }

        info!("Notification channel closed. Stopping service.");
    }

    fn render(event: &Notification) -> String {
        match event {
            Notification::Startup {
                mode,
                initial_investment,
                threshold_pct,
            } => format!(
                "Bot started in {} mode | initial investment {:.2} THB | threshold {:.2}%",
                mode, initial_investment, threshold_pct
            ),
            Notification::Trade {
                asset,
                operation,
                amount_thb,
                coin_amount,
                price,
                mode,
            } => {
                let marker = match operation {
                    Side::Buy => "🟢",
                    Side::Sell => "🔴",
                };
                format!(
                    "{} {} {:.8} {} worth {:.2} THB @ {:.2} ({})",
                    marker, operation, coin_amount, asset, amount_thb, price, mode
                )
            }
            Notification::ModeChange { mode } => format!("Bot mode changed to {}", mode),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::models::ExecutionMode;

    #[test]
    fn renders_trade_with_mode_and_amounts() {
        let text = TelegramService::render(&Notification::Trade {
            asset: "BTC".to_string(),
            operation: Side::Sell,
            amount_thb: 1000.0,
            coin_amount: 0.01,
            price: 100_000.0,
            mode: ExecutionMode::DryRun,
        });

        assert!(text.contains("sell"));
        assert!(text.contains("0.01000000 BTC"));
        assert!(text.contains("1000.00 THB"));
        assert!(text.contains("DRY_RUN"));
    }

    #[test]
    fn renders_startup_with_threshold() {
        let text = TelegramService::render(&Notification::Startup {
            mode: ExecutionMode::Production,
            initial_investment: 10_000.0,
            threshold_pct: 5.0,
        });

        assert!(text.contains("PRODUCTION"));
        assert!(text.contains("10000.00 THB"));
        assert!(text.contains("5.00%"));
    }
}
