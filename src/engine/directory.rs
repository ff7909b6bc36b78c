//! Participant directory maintenance.

use tracing::{info, instrument};

use crate::{
    base::types::{ParticipantRecord, Sender, Void},
    service::db::DbClient,
};

/// Trims a platform-supplied name; blanks become absent.
fn clean(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}

/// Builds the record to store for a participant.
///
/// Handles lose a leading `@`. Absent values stay absent so that the latest message always wins,
/// even when it carries less information than an earlier one.
pub fn normalize(participant_id: i64, handle: Option<&str>, display_name: Option<&str>) -> ParticipantRecord {
    let handle = clean(handle.map(|h| h.trim().trim_start_matches('@')));

    ParticipantRecord {
        id: participant_id,
        handle,
        display_name: clean(display_name),
    }
}

/// Upserts the participant behind one inbound message.
///
/// The caller decides what to do with a failure; the pipeline logs it and carries on.
#[instrument(skip(db, handle, display_name))]
pub async fn record(db: &DbClient, chat_id: i64, participant_id: i64, handle: Option<&str>, display_name: Option<&str>) -> Void {
    let record = normalize(participant_id, handle, display_name);

    db.upsert_participant(&record).await?;

    info!(handle = record.handle.as_deref().unwrap_or("-"), "Participant stored in the directory.");

    Ok(())
}

/// Convenience wrapper over [`record`] for a message sender.
pub async fn record_sender(db: &DbClient, chat_id: i64, sender: &Sender) -> Void {
    record(db, chat_id, sender.id, sender.handle.as_deref(), sender.display_name.as_deref()).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_is_trimmed_and_unprefixed() {
        let record = normalize(1, Some("  @link "), Some(" Link "));

        assert_eq!(record.handle.as_deref(), Some("link"));
        assert_eq!(record.display_name.as_deref(), Some("Link"));
    }

    #[test]
    fn blank_values_become_absent() {
        let record = normalize(2, Some("@"), Some("   "));

        assert_eq!(record, ParticipantRecord { id: 2, handle: None, display_name: None });
    }

    #[tokio::test]
    async fn second_message_wins() {
        let db = DbClient::surreal_memory().await.unwrap();

        record(&db, -100, 9, Some("old"), Some("Old")).await.unwrap();
        record(&db, -100, 9, Some("new"), None).await.unwrap();

        let all = db.get_all_participants().await.unwrap();
        assert_eq!(all, vec![ParticipantRecord { id: 9, handle: Some("new".into()), display_name: None }]);
    }
}
