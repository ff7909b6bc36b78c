//! The per-message pipeline.
//!
//! Every inbound message goes through the same steps: the sender is written to the directory, the
//! dispute detector sees it (monitored chats only), commands and mention-all triggers run, polls
//! get a notice, and the keyword responder may reply with a sticker. A failing step is logged and
//! never stops the ones after it.

use tracing::{Instrument, error, info, instrument, warn};

use crate::{
    base::{
        phrases::{MENTION_ALL_TRIGGER, POLL_REPLY},
        types::{InboundMessage, Void},
    },
    engine::{Engine, directory, dispute::DisputeVerdict, responder::ResponderVerdict},
    interaction::command,
    service::{chat::ChatClient, db::DbClient},
};

/// Handles a message event in its own task.
#[instrument(skip_all)]
pub fn handle_chat_event(message: InboundMessage, db: DbClient, chat: ChatClient, engine: Engine) {
    tokio::spawn(async move {
        // Process the event.
        let result = process_message(&message, &db, &chat, &engine).in_current_span().await;

        // Log any errors.
        if let Err(err) = &result {
            error!("Error while handling: {}", err);
        }
    });
}

/// Runs the full pipeline for one message.
#[instrument(skip_all, fields(chat_id = message.chat_id, message_id = message.message_id))]
pub async fn process_message(message: &InboundMessage, db: &DbClient, chat: &ChatClient, engine: &Engine) -> Void {
    let chat_id = message.chat_id;
    let text = message.text.as_str();

    // Remember who spoke.

    if let Some(sender) = &message.sender {
        info!(participant_id = sender.id, "Received message.");

        if let Err(err) = directory::record_sender(db, chat_id, sender).await {
            error!("Failed to store participant: {}", err);
        }
    }

    // Watch for disputes.

    if engine.dispute.evaluate(chat_id, message.sent_at, text) == DisputeVerdict::RaiseAlert {
        info!("Dispute detected.");
        log_delivery(chat.send_text(chat_id, &engine.alert_text, None).await, "dispute alert");
    }

    // Commands and mention-all.

    match command::parse(text, chat.bot_username()) {
        Some(cmd) => log_delivery(command::handle(cmd, message, db, chat, engine).await, "command reply"),
        None if text.to_lowercase().contains(MENTION_ALL_TRIGGER) => {
            log_delivery(command::tag_all(message, db, chat).await, "mention-all");
        }
        None => {}
    }

    // Polls.

    if message.has_poll {
        log_delivery(chat.send_text(chat_id, POLL_REPLY, Some(message.message_id)).await, "poll notice");
    }

    // Keyword reactions.

    if engine.responder.evaluate(text, &engine.random) == ResponderVerdict::EmitReaction {
        match engine.random.pick(&engine.stickers) {
            Some(sticker) => log_delivery(chat.send_sticker(chat_id, sticker, Some(message.message_id)).await, "sticker"),
            None => warn!("Keyword matched but no stickers are configured."),
        }
    }

    Ok(())
}

/// Delivery is fire-and-forget: failures are logged and not retried.
fn log_delivery(result: Void, what: &str) {
    if let Err(err) = result {
        error!("Failed to deliver {}: {}", what, err);
    }
}
