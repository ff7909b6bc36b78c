pub mod telegram;

use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;

use crate::base::types::Void;

// Traits.

/// Generic "chat" trait that clients must implement.
///
/// This trait is the action sink of the bot: everything it says goes through here. Implementing
/// this trait allows different chat platforms to be used with the zeldos-bot.
#[async_trait]
pub trait GenericChatClient: Send + Sync + 'static {
    /// Get the bot's username.
    ///
    /// Used to recognize commands addressed to this bot (`/tagall@username`).
    fn bot_username(&self) -> &str;

    /// Start the chat client listener.
    ///
    /// This begins receiving messages from the platform and feeding them into the pipeline.
    async fn start(&self) -> Void;

    /// Send a text message (Telegram HTML) to a chat, optionally as a reply.
    async fn send_text(&self, chat_id: i64, text: &str, reply_to: Option<i64>) -> Void;

    /// Send a sticker to a chat, optionally as a reply.
    async fn send_sticker(&self, chat_id: i64, sticker: &str, reply_to: Option<i64>) -> Void;

    /// Send a photo with a caption to a chat, optionally as a reply.
    async fn send_photo(&self, chat_id: i64, photo: &str, caption: &str, reply_to: Option<i64>) -> Void;
}

// Structs.

/// Chat client for the application.
///
/// It is designed to be trivially cloneable, allowing it to be passed around
/// without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct ChatClient {
    inner: Arc<dyn GenericChatClient>,
}

impl Deref for ChatClient {
    type Target = dyn GenericChatClient;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl ChatClient {
    pub fn new(inner: Arc<dyn GenericChatClient>) -> Self {
        Self { inner }
    }
}
