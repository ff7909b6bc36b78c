pub mod surreal;

use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;

use crate::base::types::{ParticipantRecord, Res, Void};

// Traits.

/// Generic directory store trait that clients must implement.
///
/// This trait defines the only two operations the bot needs from storage: writing the latest
/// known identity of a participant, and reading everyone back. Implementing this trait allows
/// different database backends to be used with the zeldos-bot.
#[async_trait]
pub trait GenericDbClient: Send + Sync + 'static {
    /// Inserts the participant, or overwrites every field of the existing record with the same id.
    ///
    /// The write is applied at record granularity: concurrent writers for the same id never leave a
    /// record with fields from different writes.
    async fn upsert_participant(&self, record: &ParticipantRecord) -> Void;

    /// Reads every participant in the directory.
    async fn get_all_participants(&self) -> Res<Vec<ParticipantRecord>>;
}

// Structs.

/// Database client for zeldos-bot.
///
/// This is trivially cloneable and can be passed around without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct DbClient {
    inner: Arc<dyn GenericDbClient>,
}

impl Deref for DbClient {
    type Target = dyn GenericDbClient;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl DbClient {
    pub fn new(inner: Arc<dyn GenericDbClient>) -> Self {
        Self { inner }
    }
}
