//! SurrealDB implementation of the participant directory.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use surrealdb::{
    RecordId, Surreal,
    engine::any::{self, Any},
    opt::auth::Root,
};
use tracing::{info, instrument};

use crate::base::{
    config::Config,
    types::{BotError, ParticipantRecord, Res, Void},
};

use super::{DbClient, GenericDbClient};

const PARTICIPANT_TABLE: &str = "participant";

// Extra methods on `DbClient` applied by the surreal implementation.

impl DbClient {
    /// Connects to the configured SurrealDB endpoint.
    pub async fn surreal(config: &Config) -> Res<Self> {
        let client = SurrealDbClient::connect(config).await?;
        Ok(Self { inner: Arc::new(client) })
    }

    /// Creates a fresh in-memory directory.
    pub async fn surreal_memory() -> Res<Self> {
        let client = SurrealDbClient::memory().await?;
        Ok(Self { inner: Arc::new(client) })
    }
}

// Records.

/// A participant as stored in SurrealDB, keyed by `participant:<id>`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurrealParticipant {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub participant_id: i64,
    pub handle: Option<String>,
    pub display_name: Option<String>,
}

impl From<&ParticipantRecord> for SurrealParticipant {
    fn from(record: &ParticipantRecord) -> Self {
        Self {
            id: None,
            participant_id: record.id,
            handle: record.handle.clone(),
            display_name: record.display_name.clone(),
        }
    }
}

impl From<SurrealParticipant> for ParticipantRecord {
    fn from(record: SurrealParticipant) -> Self {
        Self {
            id: record.participant_id,
            handle: record.handle,
            display_name: record.display_name,
        }
    }
}

// Client.

/// SurrealDB directory client.
#[derive(Clone)]
pub struct SurrealDbClient {
    db: Surreal<Any>,
}

impl SurrealDbClient {
    /// Connect to the configured endpoint and prepare the schema.
    #[instrument(name = "SurrealDbClient::connect", skip_all)]
    pub async fn connect(config: &Config) -> Res<Self> {
        let db = any::connect(config.db_endpoint.as_str()).await.map_err(store_error)?;

        // Authenticate when credentials are provided; local engines do not need them.
        if let (Some(username), Some(password)) = (&config.db_username, &config.db_password) {
            db.signin(Root { username, password }).await.map_err(store_error)?;
        }

        db.use_ns(config.db_namespace.as_str()).use_db(config.db_database.as_str()).await.map_err(store_error)?;

        let client = Self { db };
        client.define_schema().await?;

        info!("Database initialized successfully.");

        Ok(client)
    }

    /// Create an in-memory database.
    pub async fn memory() -> Res<Self> {
        let db = any::connect("mem://").await.map_err(store_error)?;
        db.use_ns("zeldos").use_db("test").await.map_err(store_error)?;

        let client = Self { db };
        client.define_schema().await?;

        Ok(client)
    }

    async fn define_schema(&self) -> Void {
        self.db
            .query(format!("DEFINE TABLE IF NOT EXISTS {PARTICIPANT_TABLE} SCHEMALESS;"))
            .query(format!("DEFINE FIELD IF NOT EXISTS participant_id ON {PARTICIPANT_TABLE} TYPE int;"))
            .await
            .map_err(store_error)?
            .check()
            .map_err(store_error)?;

        Ok(())
    }
}

#[async_trait]
impl GenericDbClient for SurrealDbClient {
    #[instrument(skip(self))]
    async fn upsert_participant(&self, record: &ParticipantRecord) -> Void {
        let _: Option<SurrealParticipant> = self
            .db
            .upsert((PARTICIPANT_TABLE, record.id))
            .content(SurrealParticipant::from(record))
            .await
            .map_err(store_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_all_participants(&self) -> Res<Vec<ParticipantRecord>> {
        let records: Vec<SurrealParticipant> = self.db.select(PARTICIPANT_TABLE).await.map_err(store_error)?;

        Ok(records.into_iter().map(ParticipantRecord::from).collect())
    }
}

fn store_error(err: surrealdb::Error) -> BotError {
    BotError::Store(err.to_string())
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

    #[tokio::test]
    async fn upsert_overwrites_by_id() {
        let db = DbClient::surreal_memory().await.unwrap();

        db.upsert_participant(&record(1, Some("link"), Some("Link"))).await.unwrap();
        db.upsert_participant(&record(1, Some("hero"), Some("Link"))).await.unwrap();

        let all = db.get_all_participants().await.unwrap();
        assert_eq!(all, vec![record(1, Some("hero"), Some("Link"))]);
    }

    #[tokio::test]
    async fn missing_handle_replaces_known_handle() {
        let db = DbClient::surreal_memory().await.unwrap();

        db.upsert_participant(&record(7, Some("zelda"), Some("Zelda"))).await.unwrap();
        db.upsert_participant(&record(7, None, Some("Zelda"))).await.unwrap();

        let all = db.get_all_participants().await.unwrap();
        assert_eq!(all, vec![record(7, None, Some("Zelda"))]);
    }

    #[tokio::test]
    async fn scan_returns_every_participant() {
        let db = DbClient::surreal_memory().await.unwrap();

        for id in [3, -5, 10] {
            db.upsert_participant(&record(id, None, None)).await.unwrap();
        }

        let mut ids: Vec<i64> = db.get_all_participants().await.unwrap().into_iter().map(|r| r.id).collect();
        ids.sort();
        assert_eq!(ids, vec![-5, 3, 10]);
    }
}
