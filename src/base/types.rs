use chrono::{DateTime, Utc};

pub type Err = anyhow::Error;
pub type Res<T> = Result<T, Err>;
pub type Void = Res<()>;

/// Failure categories surfaced by the bot.
///
/// Store and delivery errors are caught and logged by the event pipeline; only configuration
/// errors are allowed to abort the process.
#[derive(Debug, thiserror::Error)]
pub enum BotError {
    #[error("directory store error: {0}")]
    Store(String),
    #[error("delivery error: {0}")]
    Delivery(String),
    #[error("configuration error: {0}")]
    Configuration(String),
}

/// A participant as remembered by the directory.
///
/// `id` is the only stable key; `handle` may be absent and is never used for lookups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipantRecord {
    pub id: i64,
    pub handle: Option<String>,
    pub display_name: Option<String>,
}

/// The author of an inbound message, as reported by the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sender {
    pub id: i64,
    pub handle: Option<String>,
    pub display_name: Option<String>,
}

/// A platform-neutral inbound message event.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub chat_id: i64,
    pub message_id: i64,
    pub sender: Option<Sender>,
    pub text: String,
    pub has_poll: bool,
    pub sent_at: DateTime<Utc>,
}
