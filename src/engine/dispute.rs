//! Sliding-window dispute detector.
//!
//! Every monitored chat keeps its own window of recent event times and its own cooldown. A chat
//! "heats up" when at least `min_messages` events land within `window` of the newest one and the
//! newest one contains a dispute phrase. After an alert the chat stays quiet for `timeout`.
//!
//! The window is pruned relative to the event being processed, so there is no background sweeper.

use std::{
    collections::{HashMap, HashSet, VecDeque},
    sync::{Arc, Mutex, MutexGuard},
};

use chrono::{DateTime, TimeDelta, Utc};
use tracing::{debug, info};

use crate::base::config::Config;

use super::responder::TriggerSet;

/// Converts configured seconds into a `TimeDelta`, saturating on absurd values.
fn seconds(secs: u64) -> TimeDelta {
    i64::try_from(secs).ok().and_then(TimeDelta::try_seconds).unwrap_or(TimeDelta::MAX)
}

/// Thresholds and vocabulary for the detector.
#[derive(Debug, Clone)]
pub struct DisputeSettings {
    pub window: TimeDelta,
    pub timeout: TimeDelta,
    pub min_messages: usize,
    pub phrases: TriggerSet,
    reset_marker: String,
}

impl DisputeSettings {
    pub fn new(window: TimeDelta, timeout: TimeDelta, min_messages: usize, phrases: TriggerSet, reset_marker: &str) -> Self {
        Self {
            window,
            timeout,
            min_messages,
            phrases,
            reset_marker: reset_marker.to_lowercase(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            seconds(config.message_window_secs),
            seconds(config.dispute_timeout_secs),
            config.min_messages,
            TriggerSet::new(&config.dispute_phrases, config.dispute_phrases_case_insensitive),
            &config.dispute_reset_marker,
        )
    }

    /// The reset marker is always matched case-folded.
    fn is_reset(&self, text: &str) -> bool {
        !self.reset_marker.is_empty() && text.to_lowercase().contains(&self.reset_marker)
    }
}

/// Outcome of a detector evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisputeVerdict {
    NoOp,
    RaiseAlert,
}

/// Per-chat window and cooldown state.
#[derive(Debug, Clone, Default)]
pub struct ChatWindowState {
    recent_event_timestamps: VecDeque<DateTime<Utc>>,
    /// `None` means no alert was ever raised.
    last_alert_time: Option<DateTime<Utc>>,
}

impl ChatWindowState {
    pub fn recent_event_count(&self) -> usize {
        self.recent_event_timestamps.len()
    }

    pub fn recent_event_timestamps(&self) -> impl Iterator<Item = &DateTime<Utc>> {
        self.recent_event_timestamps.iter()
    }

    pub fn last_alert_time(&self) -> Option<DateTime<Utc>> {
        self.last_alert_time
    }

    /// Records one event and decides whether it raises an alert.
    fn observe(&mut self, settings: &DisputeSettings, event_time: DateTime<Utc>, text: &str) -> DisputeVerdict {
        self.recent_event_timestamps.push_back(event_time);
        self.recent_event_timestamps.retain(|t| event_time - *t <= settings.window);

        let cooling_down = self.last_alert_time.is_some_and(|last| event_time - last <= settings.timeout);

        let verdict = if cooling_down {
            DisputeVerdict::NoOp
        } else if self.recent_event_timestamps.len() >= settings.min_messages && settings.phrases.matches(text) {
            self.last_alert_time = Some(event_time);
            DisputeVerdict::RaiseAlert
        } else {
            DisputeVerdict::NoOp
        };

        if settings.is_reset(text) {
            self.last_alert_time = Some(event_time);
            info!("Dispute detection paused by a manual marker.");
        }

        verdict
    }
}

/// Tracks message bursts for the monitored chats.
///
/// State is partitioned per chat behind its own mutex, so different chats never contend beyond the
/// brief lookup in the chat map.
#[derive(Debug)]
pub struct DisputeDetector {
    settings: DisputeSettings,
    monitored: HashSet<i64>,
    windows: Mutex<HashMap<i64, Arc<Mutex<ChatWindowState>>>>,
}

impl DisputeDetector {
    pub fn new(settings: DisputeSettings, monitored: impl IntoIterator<Item = i64>) -> Self {
        Self {
            settings,
            monitored: monitored.into_iter().collect(),
            windows: Mutex::new(HashMap::new()),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(DisputeSettings::from_config(config), config.monitored_chat_ids.iter().copied())
    }

    pub fn is_monitored(&self, chat_id: i64) -> bool {
        self.monitored.contains(&chat_id)
    }

    /// Evaluates one event; chats that are not monitored are never touched.
    pub fn evaluate(&self, chat_id: i64, event_time: DateTime<Utc>, text: &str) -> DisputeVerdict {
        if !self.is_monitored(chat_id) {
            return DisputeVerdict::NoOp;
        }

        let window = self.window(chat_id);
        let mut state = lock(&window);
        let verdict = state.observe(&self.settings, event_time, text);

        debug!(chat_id, recent = state.recent_event_count(), ?verdict, "Dispute window updated.");

        verdict
    }

    /// A copy of the chat's current state, if it has seen any event.
    pub fn snapshot(&self, chat_id: i64) -> Option<ChatWindowState> {
        let window = lock(&self.windows).get(&chat_id).cloned()?;
        let state = lock(&window).clone();
        Some(state)
    }

    fn window(&self, chat_id: i64) -> Arc<Mutex<ChatWindowState>> {
        lock(&self.windows).entry(chat_id).or_default().clone()
    }
}

/// Locks a mutex, recovering the data if a previous holder panicked.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
