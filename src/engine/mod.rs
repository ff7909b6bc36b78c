//! The heuristic core of the bot.
//!
//! This module holds the stateful and policy-driven pieces that react to the message stream:
//! - Participant directory maintenance
//! - Sliding-window dispute detection with cooldown
//! - Keyword-triggered probabilistic reactions
//! - Mention-all composition over the directory

pub mod directory;
pub mod dispute;
pub mod mention;
pub mod random;
pub mod responder;

use std::{ops::Deref, sync::Arc};

use dispute::DisputeDetector;
use random::RandomClient;
use responder::KeywordResponder;

use crate::base::config::Config;

/// Shared engine state.
pub struct EngineInner {
    pub dispute: DisputeDetector,
    pub responder: KeywordResponder,
    pub random: RandomClient,
    /// Text posted when the dispute detector fires.
    pub alert_text: String,
    /// Sticker references for keyword reactions; fixed for the process lifetime.
    pub stickers: Vec<String>,
    /// Card image references for the bridge-or-park command; fixed for the process lifetime.
    pub cards: Vec<String>,
}

/// Engine handle for the application.
///
/// This is trivially cloneable and can be passed around without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct Engine {
    inner: Arc<EngineInner>,
}

impl Deref for Engine {
    type Target = EngineInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl From<EngineInner> for Engine {
    fn from(inner: EngineInner) -> Self {
        Self { inner: Arc::new(inner) }
    }
}

impl Engine {
    /// Builds the engine from configuration with the given random source.
    pub fn new(config: &Config, random: RandomClient) -> Self {
        Self::from(EngineInner {
            dispute: DisputeDetector::from_config(config),
            responder: KeywordResponder::from_config(config),
            random,
            alert_text: config.dispute_alert_text.clone(),
            stickers: config.sticker_assets.clone(),
            cards: config.card_assets.clone(),
        })
    }
}
