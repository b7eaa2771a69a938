use reqwest::Client;
use serde_json::{json, Value};
use tracing::debug;

use crate::config::TelegramConfig;
use crate::error::NotifyError;
use crate::notify::MessageSink;

const ENDPOINT: &str = "https://api.telegram.org";

pub struct TelegramNotifier {
    client: Client,
    config: TelegramConfig,
}

impl TelegramNotifier {
    pub fn new(config: TelegramConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    fn build_payload(&self, text: &str) -> Value {
        json!({
            "chat_id": self.config.chat_id,
            "text": text,
            "parse_mode": "Markdown",
            "disable_web_page_preview": true,
        })
    }

    pub async fn send_message(&self, text: &str) -> Result<(), NotifyError> {
        let url = format!("{ENDPOINT}/bot{}/sendMessage", self.config.bot_token);

        let res = self
            .client
            .post(&url)
            .json(&self.build_payload(text))
            .send()
            .await
            .map_err(|err| NotifyError::NotificationDeliveryFailed(err.to_string()))?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(NotifyError::NotificationDeliveryFailed(format!(
                "HTTP {status}: {body}"
            )));
        }

        debug!("Telegram message delivered to chat {}", self.config.chat_id);
        Ok(())
    }
}

impl MessageSink for TelegramNotifier {
    async fn send(&self, text: &str) -> Result<(), NotifyError> {
        self.send_message(text).await
    }
}
