//! Telegram Bot API message transport

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use crate::io::HttpClient;
use crate::notifier::MessageTransport;

/// Envelope every Bot API method answers with
#[derive(Debug, Deserialize)]
struct BotApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// Sends messages through a Telegram bot
pub struct TelegramTransport {
    send_url: String,
    http: Arc<dyn HttpClient>,
}

impl std::fmt::Debug for TelegramTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramTransport").finish_non_exhaustive()
    }
}

impl TelegramTransport {
    pub fn new(api_base: &str, bot_token: &str, http: Arc<dyn HttpClient>) -> Self {
        let send_url = format!(
            "{}/bot{}/sendMessage",
            api_base.trim_end_matches('/'),
            bot_token
        );

        tracing::debug!("Created TelegramTransport for {}", api_base);

        Self { send_url, http }
    }
}

#[async_trait]
impl MessageTransport for TelegramTransport {
    fn type_name(&self) -> &str {
        "telegram"
    }

    async fn send(&self, destination: &str, text: &str) -> crate::Result<()> {
        let params = [("chat_id", destination), ("text", text)];

        tracing::debug!("Sending Telegram message to chat {}", destination);

        let response = self.http.post_form(&self.send_url, &params).await?;

        let parsed = serde_json::from_str::<BotApiResponse>(&response.body).ok();
        let accepted = parsed.as_ref().is_some_and(|r| r.ok);
        if response.status != 200 || !accepted {
            let description = parsed
                .and_then(|r| r.description)
                .unwrap_or(response.body);
            return Err(crate::SentinelError::Messaging(format!(
                "Telegram API returned status {}: {}",
                response.status, description
            )));
        }

        tracing::debug!("Telegram message delivered to chat {}", destination);
        Ok(())
    }
}
