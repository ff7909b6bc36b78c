//! Keyword-triggered probabilistic responder.

use tracing::debug;

use crate::base::config::Config;

use super::random::RandomClient;

/// A set of trigger substrings with an explicit casing policy.
#[derive(Debug, Clone, Default)]
pub struct TriggerSet {
    triggers: Vec<String>,
    case_insensitive: bool,
}

impl TriggerSet {
    /// Builds a trigger set; blank triggers are dropped since they would match everything.
    pub fn new<I, S>(triggers: I, case_insensitive: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let triggers = triggers
            .into_iter()
            .map(|t| t.as_ref().to_string())
            .filter(|t| !t.trim().is_empty())
            .map(|t| if case_insensitive { t.to_lowercase() } else { t })
            .collect();

        Self { triggers, case_insensitive }
    }

    /// Whether `text` contains at least one trigger as a substring.
    pub fn matches(&self, text: &str) -> bool {
        if self.case_insensitive {
            let folded = text.to_lowercase();
            self.triggers.iter().any(|t| folded.contains(t.as_str()))
        } else {
            self.triggers.iter().any(|t| text.contains(t.as_str()))
        }
    }

    pub fn is_empty(&self) -> bool {
        self.triggers.is_empty()
    }
}

/// Outcome of a responder evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponderVerdict {
    NoOp,
    /// The caller should pick a reaction asset and reply with it.
    EmitReaction,
}

/// Decides whether a message earns a reactive sticker.
#[derive(Debug, Clone)]
pub struct KeywordResponder {
    keywords: TriggerSet,
    chance_percent: u8,
}

impl KeywordResponder {
    pub fn new(keywords: TriggerSet, chance_percent: u8) -> Self {
        Self {
            keywords,
            chance_percent: chance_percent.min(100),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(TriggerSet::new(&config.keywords, config.keywords_case_insensitive), config.response_chance_percent)
    }

    /// Evaluates a message.
    ///
    /// A keyword hit with a question mark always reacts. Otherwise exactly one percent roll is drawn
    /// and the reaction fires when it lands at or under the configured chance.
    pub fn evaluate(&self, text: &str, random: &RandomClient) -> ResponderVerdict {
        if !self.keywords.matches(text) {
            return ResponderVerdict::NoOp;
        }

        if text.contains('?') {
            return ResponderVerdict::EmitReaction;
        }

        let roll = random.roll_percent();
        if roll <= self.chance_percent {
            ResponderVerdict::EmitReaction
        } else {
            debug!(roll, chance = self.chance_percent, "Skipped sticker reply due to random chance.");
            ResponderVerdict::NoOp
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::engine::random::{MockRandomSource, SeededRandom};

    fn responder(chance: u8) -> KeywordResponder {
        KeywordResponder::new(TriggerSet::new(["зельда", "Зельда"], false), chance)
    }

    fn scripted(roll: usize) -> RandomClient {
        let mut mock = MockRandomSource::new();
        mock.expect_between().withf(|low, high| *low == 1 && *high == 100).times(1).return_const(roll);
        RandomClient::new(Arc::new(mock))
    }

    fn untouched() -> RandomClient {
        let mut mock = MockRandomSource::new();
        mock.expect_between().never();
        RandomClient::new(Arc::new(mock))
    }

    #[test]
    fn no_keyword_is_a_no_op_without_drawing() {
        assert_eq!(responder(100).evaluate("привіт усім", &untouched()), ResponderVerdict::NoOp);
    }

    #[test]
    fn case_sensitive_set_ignores_unlisted_casing() {
        assert_eq!(responder(100).evaluate("ЗЕЛЬДА прийшла", &untouched()), ResponderVerdict::NoOp);
    }

    #[test]
    fn case_insensitive_set_folds_both_sides() {
        let responder = KeywordResponder::new(TriggerSet::new(["Зельда"], true), 100);

        assert_eq!(responder.evaluate("ЗЕЛЬДА прийшла", &scripted(100)), ResponderVerdict::EmitReaction);
    }

    #[test]
    fn question_mark_overrides_the_roll() {
        let random = RandomClient::new(Arc::new(SeededRandom::new(1)));
        let responder = responder(0);

        for _ in 0..1000 {
            assert_eq!(responder.evaluate("де зельда?", &random), ResponderVerdict::EmitReaction);
        }
    }

    #[test]
    fn roll_at_chance_emits_and_above_does_not() {
        assert_eq!(responder(30).evaluate("зельда тут", &scripted(30)), ResponderVerdict::EmitReaction);
        assert_eq!(responder(30).evaluate("зельда тут", &scripted(31)), ResponderVerdict::NoOp);
    }

    #[test]
    fn zero_chance_never_emits_without_question() {
        assert_eq!(responder(0).evaluate("зельда тут", &scripted(1)), ResponderVerdict::NoOp);
    }

    #[test]
    fn half_chance_converges_to_half() {
        let random = RandomClient::new(Arc::new(SeededRandom::new(42)));
        let responder = responder(50);
        let trials = 20_000;

        let emitted = (0..trials)
            .filter(|_| responder.evaluate("Зельда знову", &random) == ResponderVerdict::EmitReaction)
            .count();
        let rate = emitted as f64 / trials as f64;

        assert!((rate - 0.5).abs() < 0.03, "rate was {rate}");
    }

    #[test]
    fn blank_triggers_are_dropped() {
        let set = TriggerSet::new(["", "  "], false);

        assert!(set.is_empty());
        assert!(!set.matches("anything"));
    }
}
