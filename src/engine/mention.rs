//! Mention-all composer.

use crate::base::{
    phrases::{DEFAULT_DISPLAY_NAME, EMPTY_DIRECTORY_REPLY, MENTION_ALL_PREFIX, NOBODY_TO_TAG_REPLY},
    types::ParticipantRecord,
};

/// A broadcast that mentions every target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BroadcastMessage {
    pub targets: Vec<String>,
}

impl BroadcastMessage {
    /// Message text, in Telegram HTML.
    pub fn text(&self) -> String {
        format!("{MENTION_ALL_PREFIX}{}", self.targets.join(", "))
    }
}

/// Result of composing a mention-all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MentionAll {
    Broadcast(BroadcastMessage),
    /// Nobody besides the requester is known. `directory_empty` tells whether anyone is known at all.
    NothingToTag { directory_empty: bool },
}

impl MentionAll {
    pub fn reply_text(&self) -> String {
        match self {
            MentionAll::Broadcast(broadcast) => broadcast.text(),
            MentionAll::NothingToTag { directory_empty: true } => EMPTY_DIRECTORY_REPLY.to_string(),
            MentionAll::NothingToTag { directory_empty: false } => NOBODY_TO_TAG_REPLY.to_string(),
        }
    }
}

/// Builds the mention list for everyone in `snapshot` except the requester.
pub fn compose(requester_id: i64, snapshot: &[ParticipantRecord]) -> MentionAll {
    let targets: Vec<String> = snapshot.iter().filter(|record| record.id != requester_id).map(mention).collect();

    if targets.is_empty() {
        return MentionAll::NothingToTag {
            directory_empty: snapshot.is_empty(),
        };
    }

    MentionAll::Broadcast(BroadcastMessage { targets })
}

/// `@handle` when there is one, otherwise a link to the participant's profile.
fn mention(record: &ParticipantRecord) -> String {
    match record.handle.as_deref().map(str::trim).filter(|h| !h.is_empty()) {
        Some(handle) => format!("@{handle}"),
        None => {
            let name = record.display_name.as_deref().map(str::trim).filter(|n| !n.is_empty()).unwrap_or(DEFAULT_DISPLAY_NAME);
            format!(r#"<a href="tg://user?id={}">{}</a>"#, record.id, escape_html(name))
        }
    }
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: i64, handle: Option<&str>, display_name: Option<&str>) -> ParticipantRecord {
        ParticipantRecord {
            id,
            handle: handle.map(str::to_string),
            display_name: display_name.map(str::to_string),
        }
    }

    #[test]
    fn excludes_only_the_requester() {
        let snapshot = vec![record(1, Some("a"), None), record(2, Some("b"), None), record(3, Some("me"), None)];

        let MentionAll::Broadcast(broadcast) = compose(3, &snapshot) else {
            panic!("expected a broadcast");
        };

        let mut targets = broadcast.targets.clone();
        targets.sort();
        assert_eq!(targets, vec!["@a".to_string(), "@b".to_string()]);
    }

    #[test]
    fn requester_alone_is_nothing_to_tag() {
        let outcome = compose(3, &[record(3, Some("me"), None)]);

        assert_eq!(outcome, MentionAll::NothingToTag { directory_empty: false });
        assert_eq!(outcome.reply_text(), NOBODY_TO_TAG_REPLY);
    }

    #[test]
    fn empty_directory_is_nothing_to_tag() {
        let outcome = compose(3, &[]);

        assert_eq!(outcome, MentionAll::NothingToTag { directory_empty: true });
        assert_eq!(outcome.reply_text(), EMPTY_DIRECTORY_REPLY);
    }

    #[test]
    fn falls_back_to_profile_link() {
        let outcome = compose(0, &[record(5, Some(" "), Some("Tom & <Jerry>")), record(6, None, None)]);

        assert_eq!(
            outcome.reply_text(),
            r#"няв <a href="tg://user?id=5">Tom &amp; &lt;Jerry&gt;</a>, <a href="tg://user?id=6">user</a>"#
        );
    }
}
