//! Chat service integration for zeldos-bot.
//!
//! This module talks to the Telegram Bot API over plain HTTPS:
//! - Receiving messages through `getUpdates` long polling
//! - Sending messages, stickers, and photos
//!
//! Every received message is handed to the interaction pipeline in its own task.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::{Value, json};
use tracing::{debug, info, instrument, warn};

use crate::{
    base::{
        config::Config,
        types::{BotError, InboundMessage, Res, Sender, Void},
    },
    engine::Engine,
    interaction,
    service::db::DbClient,
};

use super::{ChatClient, GenericChatClient};

/// Pause after a failed `getUpdates` call before polling again.
const POLL_ERROR_BACKOFF: Duration = Duration::from_secs(2);

// Extra methods on `ChatClient` applied by the telegram implementation.

impl ChatClient {
    /// Creates a new Telegram chat client.
    pub async fn telegram(config: &Config, db: DbClient, engine: Engine) -> Res<Self> {
        let client = TelegramChatClient::new(config, db, engine).await?;
        Ok(Self { inner: Arc::new(client) })
    }
}

impl From<TelegramChatClient> for ChatClient {
    fn from(client: TelegramChatClient) -> Self {
        Self { inner: Arc::new(client) }
    }
}

// Wire types.

/// Envelope of every Bot API response.
#[derive(Debug, Deserialize)]
struct TelegramResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TelegramBotUser {
    username: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TelegramUpdate {
    pub update_id: i64,
    pub message: Option<TelegramMessage>,
}

#[derive(Debug, Deserialize)]
pub struct TelegramMessage {
    pub message_id: i64,
    pub date: i64,
    pub chat: TelegramChat,
    pub from: Option<TelegramUser>,
    pub text: Option<String>,
    pub poll: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct TelegramChat {
    pub id: i64,
}

#[derive(Debug, Deserialize)]
pub struct TelegramUser {
    pub id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
}

impl From<TelegramMessage> for InboundMessage {
    fn from(message: TelegramMessage) -> Self {
        // Fall back to the receipt time if the platform timestamp is unusable.
        let sent_at = DateTime::from_timestamp(message.date, 0).unwrap_or_else(Utc::now);

        Self {
            chat_id: message.chat.id,
            message_id: message.message_id,
            sender: message.from.map(|user| Sender {
                id: user.id,
                handle: user.username,
                display_name: user.first_name,
            }),
            text: message.text.unwrap_or_default(),
            has_poll: message.poll.is_some(),
            sent_at,
        }
    }
}

// Structs.

/// Telegram client implementation.
#[derive(Clone)]
pub struct TelegramChatClient {
    client: reqwest::Client,
    api_url: String,
    poll_timeout_secs: u64,
    bot_username: String,
    db: DbClient,
    engine: Engine,
}

impl TelegramChatClient {
    /// Create a new Telegram chat client.
    #[instrument(name = "TelegramChatClient::new", skip_all)]
    pub async fn new(config: &Config, db: DbClient, engine: Engine) -> Res<Self> {
        // The request timeout must outlast the long poll.
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.telegram_poll_timeout_secs + 10))
            .build()?;

        let api_url = format!("{}/bot{}", config.telegram_api_base.trim_end_matches('/'), config.telegram_bot_token);

        let mut result = Self {
            client,
            api_url,
            poll_timeout_secs: config.telegram_poll_timeout_secs,
            bot_username: String::new(),
            db,
            engine,
        };

        // Get the bot's username.

        let me: TelegramBotUser = result.call("getMe", &json!({})).await?;
        result.bot_username = me.username.unwrap_or_default();

        info!("Telegram bot username: {}", result.bot_username);

        Ok(result)
    }

    /// Calls a Bot API method and unwraps the response envelope.
    async fn call<T: DeserializeOwned>(&self, method: &str, body: &Value) -> Res<T> {
        // Transport errors carry the request URL, which embeds the bot token.
        let response: TelegramResponse<T> = self
            .client
            .post(format!("{}/{method}", self.api_url))
            .json(body)
            .send()
            .await
            .map_err(reqwest::Error::without_url)?
            .json()
            .await
            .map_err(reqwest::Error::without_url)?;

        if !response.ok {
            let description = response.description.unwrap_or_else(|| "no description".to_string());
            return Err(anyhow::anyhow!("Telegram `{method}` failed: {description}"));
        }

        response.result.ok_or_else(|| anyhow::anyhow!("Telegram `{method}` returned no result"))
    }

    /// Calls a send method; any failure becomes a delivery error.
    async fn deliver(&self, method: &str, body: Value) -> Void {
        let _: Value = self.call(method, &body).await.map_err(|e| BotError::Delivery(e.to_string()))?;
        Ok(())
    }

    async fn get_updates(&self, offset: i64) -> Res<Vec<TelegramUpdate>> {
        self.call(
            "getUpdates",
            &json!({
                "offset": offset,
                "timeout": self.poll_timeout_secs,
                "allowed_updates": ["message"],
            }),
        )
        .await
    }
}

/// Adds `reply_to_message_id` when replying.
fn with_reply(mut body: Value, reply_to: Option<i64>) -> Value {
    if let (Some(reply_to), Some(map)) = (reply_to, body.as_object_mut()) {
        map.insert("reply_to_message_id".to_string(), json!(reply_to));
    }

    body
}

#[async_trait]
impl GenericChatClient for TelegramChatClient {
    fn bot_username(&self) -> &str {
        &self.bot_username
    }

    async fn start(&self) -> Void {
        let chat = ChatClient::from(self.clone());
        let mut offset = 0;

        info!("Listening for Telegram updates ...");

        loop {
            let updates = tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    info!("Shutting down Telegram listener.");
                    return Ok(());
                }
                updates = self.get_updates(offset) => updates,
            };

            let updates = match updates {
                Ok(updates) => updates,
                Err(err) => {
                    warn!("Failed to fetch updates: {}", err);
                    tokio::time::sleep(POLL_ERROR_BACKOFF).await;
                    continue;
                }
            };

            for update in updates {
                offset = offset.max(update.update_id + 1);

                let Some(message) = update.message else {
                    debug!(update_id = update.update_id, "Skipping update without a message.");
                    continue;
                };

                interaction::chat_event::handle_chat_event(message.into(), self.db.clone(), chat.clone(), self.engine.clone());
            }
        }
    }

    #[instrument(skip(self, text))]
    async fn send_text(&self, chat_id: i64, text: &str, reply_to: Option<i64>) -> Void {
        let body = json!({ "chat_id": chat_id, "text": text, "parse_mode": "HTML" });
        self.deliver("sendMessage", with_reply(body, reply_to)).await
    }

    #[instrument(skip(self))]
    async fn send_sticker(&self, chat_id: i64, sticker: &str, reply_to: Option<i64>) -> Void {
        let body = json!({ "chat_id": chat_id, "sticker": sticker });
        self.deliver("sendSticker", with_reply(body, reply_to)).await
    }

    #[instrument(skip(self))]
    async fn send_photo(&self, chat_id: i64, photo: &str, caption: &str, reply_to: Option<i64>) -> Void {
        let body = json!({ "chat_id": chat_id, "photo": photo, "caption": caption });
        self.deliver("sendPhoto", with_reply(body, reply_to)).await
    }
}

// Tests.

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::random::RandomClient;

    #[test]
    fn converts_group_message() {
        let update: TelegramUpdate = serde_json::from_value(json!({
            "update_id": 10,
            "message": {
                "message_id": 77,
                "date": 1_700_000_000,
                "chat": { "id": -1001, "type": "supergroup" },
                "from": { "id": 5, "is_bot": false, "first_name": "Link", "username": "hero" },
                "text": "де зельда?"
            }
        }))
        .unwrap();

        let message = InboundMessage::from(update.message.unwrap());

        assert_eq!(message.chat_id, -1001);
        assert_eq!(message.message_id, 77);
        assert_eq!(message.text, "де зельда?");
        assert!(!message.has_poll);
        assert_eq!(message.sent_at.timestamp(), 1_700_000_000);
        assert_eq!(
            message.sender,
            Some(Sender {
                id: 5,
                handle: Some("hero".into()),
                display_name: Some("Link".into()),
            })
        );
    }

    #[test]
    fn converts_poll_without_text_or_sender() {
        let update: TelegramUpdate = serde_json::from_value(json!({
            "update_id": 11,
            "message": {
                "message_id": 78,
                "date": 1_700_000_100,
                "chat": { "id": -1001 },
                "poll": { "id": "p", "question": "?" }
            }
        }))
        .unwrap();

        let message = InboundMessage::from(update.message.unwrap());

        assert!(message.has_poll);
        assert!(message.sender.is_none());
        assert!(message.text.is_empty());
    }

    #[tokio::test]
    async fn transport_errors_do_not_leak_the_token() {
        let client = TelegramChatClient {
            client: reqwest::Client::builder().timeout(Duration::from_secs(5)).build().unwrap(),
            api_url: "http://127.0.0.1:9/botSECRET123:TOKEN".to_string(),
            poll_timeout_secs: 0,
            bot_username: "zeldos_bot".to_string(),
            db: DbClient::surreal_memory().await.unwrap(),
            engine: Engine::new(&Config::default(), RandomClient::default()),
        };

        let err = client.send_text(-1001, "hi", None).await.unwrap_err();
        assert!(err.downcast_ref::<BotError>().is_some_and(|e| matches!(e, BotError::Delivery(_))));

        let logged = format!("Failed to deliver text: {err} / {err:#}");
        assert!(!logged.contains("SECRET123"), "{logged}");

        let err = client.get_updates(0).await.unwrap_err();
        let logged = format!("Failed to fetch updates: {err} / {err:#}");
        assert!(!logged.contains("SECRET123"), "{logged}");
    }

    #[test]
    fn reply_is_added_only_when_requested() {
        let body = with_reply(json!({ "chat_id": 1 }), Some(9));
        assert_eq!(body["reply_to_message_id"], 9);

        let body = with_reply(json!({ "chat_id": 1 }), None);
        assert!(body.get("reply_to_message_id").is_none());
    }
}
