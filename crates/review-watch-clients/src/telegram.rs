//! Telegram Bot API notification channel.

use async_trait::async_trait;
use review_watch_core::{NotificationChannel, TELEGRAM_API_BASE};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::http::check_response;
use crate::{build_http_client, ClientError};

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct BotApiReply {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// Sends messages to one Telegram chat through a bot.
#[derive(Clone)]
pub struct TelegramChannel {
    http: reqwest::Client,
    base_url: String,
    token: String,
    chat_id: String,
}

impl std::fmt::Debug for TelegramChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramChannel")
            .field("base_url", &self.base_url)
            .field("chat_id", &self.chat_id)
            .finish_non_exhaustive()
    }
}

impl TelegramChannel {
    /// Creates a channel talking to the public Bot API.
    pub fn new(token: impl Into<String>, chat_id: impl Into<String>) -> Result<Self, ClientError> {
        Self::with_base_url(TELEGRAM_API_BASE, token, chat_id)
    }

    /// Creates a channel talking to a custom Bot API server.
    pub fn with_base_url(
        base_url: impl Into<String>,
        token: impl Into<String>,
        chat_id: impl Into<String>,
    ) -> Result<Self, ClientError> {
        Ok(Self {
            http: build_http_client()?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
            chat_id: chat_id.into(),
        })
    }

    /// Returns the chat this channel delivers to.
    pub fn chat_id(&self) -> &str {
        &self.chat_id
    }

    /// Calls `sendMessage` for the bound chat.
    #[instrument(skip(self, text), fields(chat_id = %self.chat_id))]
    pub async fn send_message(&self, text: &str) -> Result<(), ClientError> {
        let url = format!("{}/bot{}/sendMessage", self.base_url, self.token);
        let request = SendMessageRequest {
            chat_id: &self.chat_id,
            text,
        };

        // The URL embeds the bot token; keep it out of error messages.
        let resp = self
            .http
            .post(url)
            .json(&request)
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.without_url()))?;

        let resp = check_response(resp).await?;
        let reply: BotApiReply = resp
            .json()
            .await
            .map_err(|e| ClientError::Decode(e.without_url().to_string()))?;

        if !reply.ok {
            return Err(ClientError::Rejected {
                description: reply.description.unwrap_or_default(),
            });
        }

        debug!("Message delivered");
        Ok(())
    }
}

#[async_trait]
impl NotificationChannel for TelegramChannel {
    async fn send(&self, text: &str) -> review_watch_core::Result<()> {
        self.send_message(text)
            .await
            .map_err(ClientError::into_delivery_error)
    }
}
