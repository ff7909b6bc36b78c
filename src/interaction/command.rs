//! Slash commands understood by the bot.

use tracing::{error, info, instrument, warn};

use crate::{
    base::{
        phrases::{CARD_FAILED_REPLY, DIRECTORY_ERROR_REPLY, NO_CARDS_REPLY, START_REPLY},
        types::{InboundMessage, Void},
    },
    engine::{Engine, mention},
    service::{chat::ChatClient, db::DbClient},
};

/// Every spelling of the bridge-or-park command.
const BRIDGE_OR_PARK_ALIASES: &[&str] = &[
    "bridge_or_park",
    "park_or_bridge",
    "mist_chy_park",
    "park_chy_mist",
    "bridgeorpark",
    "parkorbridge",
    "mistchypark",
    "parkchymist",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    TagAll,
    BridgeOrPark,
}

/// Parses the leading command of a message.
///
/// Commands addressed to another bot (`/all@other_bot`) are ignored.
pub fn parse(text: &str, bot_username: &str) -> Option<Command> {
    let token = text.split_whitespace().next()?.strip_prefix('/')?;

    let (name, target) = match token.split_once('@') {
        Some((name, target)) => (name, Some(target)),
        None => (token, None),
    };

    if let Some(target) = target
        && !target.eq_ignore_ascii_case(bot_username)
    {
        return None;
    }

    let name = name.to_lowercase();

    match name.as_str() {
        "start" => Some(Command::Start),
        "tagall" | "all" => Some(Command::TagAll),
        n if BRIDGE_OR_PARK_ALIASES.contains(&n) => Some(Command::BridgeOrPark),
        _ => None,
    }
}

/// Runs a parsed command.
pub async fn handle(command: Command, message: &InboundMessage, db: &DbClient, chat: &ChatClient, engine: &Engine) -> Void {
    match command {
        Command::Start => chat.send_text(message.chat_id, START_REPLY, None).await,
        Command::TagAll => tag_all(message, db, chat).await,
        Command::BridgeOrPark => bridge_or_park(message, chat, engine).await,
    }
}

/// Mentions everyone in the directory except the sender.
#[instrument(skip_all, fields(chat_id = message.chat_id))]
pub async fn tag_all(message: &InboundMessage, db: &DbClient, chat: &ChatClient) -> Void {
    let Some(sender) = &message.sender else {
        warn!("Ignoring mention-all without a sender.");
        return Ok(());
    };

    let snapshot = match db.get_all_participants().await {
        Ok(snapshot) => snapshot,
        Err(err) => {
            error!("Failed to read the directory: {}", err);
            return chat.send_text(message.chat_id, DIRECTORY_ERROR_REPLY, Some(message.message_id)).await;
        }
    };

    let outcome = mention::compose(sender.id, &snapshot);

    if let mention::MentionAll::Broadcast(broadcast) = &outcome {
        info!(targets = broadcast.targets.len(), "Mentioning everyone.");
    }

    chat.send_text(message.chat_id, &outcome.reply_text(), Some(message.message_id)).await
}

/// Sends a random card with a random number from one to three.
#[instrument(skip_all, fields(chat_id = message.chat_id))]
pub async fn bridge_or_park(message: &InboundMessage, chat: &ChatClient, engine: &Engine) -> Void {
    let Some(card) = engine.random.pick(&engine.cards) else {
        return chat.send_text(message.chat_id, NO_CARDS_REPLY, Some(message.message_id)).await;
    };

    let number = engine.random.between(1, 3);
    let caption = format!("🔢 {number}");

    if let Err(err) = chat.send_photo(message.chat_id, card, &caption, Some(message.message_id)).await {
        error!("Failed to send card: {}", err);
        return chat.send_text(message.chat_id, CARD_FAILED_REPLY, Some(message.message_id)).await;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_commands() {
        assert_eq!(parse("/start", "zeldos_bot"), Some(Command::Start));
        assert_eq!(parse("/tagall please", "zeldos_bot"), Some(Command::TagAll));
        assert_eq!(parse("/all", "zeldos_bot"), Some(Command::TagAll));
        assert_eq!(parse("/MistChyPark", "zeldos_bot"), Some(Command::BridgeOrPark));
    }

    #[test]
    fn honors_bot_suffix() {
        assert_eq!(parse("/all@Zeldos_Bot", "zeldos_bot"), Some(Command::TagAll));
        assert_eq!(parse("/all@other_bot", "zeldos_bot"), None);
    }

    #[test]
    fn ignores_non_commands() {
        assert_eq!(parse("hello /start", "zeldos_bot"), None);
        assert_eq!(parse("/spies", "zeldos_bot"), None);
        assert_eq!(parse("", "zeldos_bot"), None);
        assert_eq!(parse("@all", "zeldos_bot"), None);
    }
}
