//! Default trigger vocabularies and canned replies.

/// Phrases that mark a message as part of a heated exchange.
pub const DISPUTE_PHRASES: &[&str] = &[
    "неправий",
    "неправа",
    "не правий",
    "не права",
    "непогоджуюсь",
    "не погоджуюсь",
    "ти не розумієш",
    "ти не розбираєшся",
    "це не так",
    "маячня",
    "бред",
    "ну такоє",
    ">>",
    "незгоден",
    "не згоден",
    "мені похуй",
    "нахуя",
    "незгодна",
    "не згодна",
    "так щитаю",
    "так вважаю",
    "засуджую",
    "душніла",
    "просто похуй",
    "на свій рахунок",
    "вибач",
    "мене заділо",
    "але згодна",
    "я не люблю",
];

/// Name forms that wake the sticker responder.
///
/// Cased variants are listed explicitly since the responder matches case-sensitively by default.
pub const KEYWORDS: &[&str] = &[
    "зельда",
    "зельдос",
    "Зельда",
    "Зельдос",
    "зельду",
    "зельдоса",
    "Зельду",
    "Зельдоса",
    "зельдою",
    "зельдосом",
    "Зельдою",
    "Зельдосом",
];

/// Marker a member can post to silence the dispute detector.
pub const DISPUTE_RESET_MARKER: &str = "#срач";

/// Text posted when a dispute is detected.
pub const DISPUTE_ALERT_TEXT: &str = "👻 #срач";

/// Trigger for mentioning everyone in free text.
pub const MENTION_ALL_TRIGGER: &str = "@all";

/// Prefix of a mention-all broadcast.
pub const MENTION_ALL_PREFIX: &str = "няв ";

/// Placeholder used when a participant has neither handle nor display name.
pub const DEFAULT_DISPLAY_NAME: &str = "user";

pub const START_REPLY: &str = "мяу";
pub const POLL_REPLY: &str = "🍄 #опитування";
pub const EMPTY_DIRECTORY_REPLY: &str = "I don't know anyone in this group yet! Send some messages first.";
pub const NOBODY_TO_TAG_REPLY: &str = "No users found to tag.";
pub const DIRECTORY_ERROR_REPLY: &str = "❌ Database error. Please check logs.";
pub const NO_CARDS_REPLY: &str = "❌ No cards are available.";
pub const CARD_FAILED_REPLY: &str = "❌ няв 😿";
