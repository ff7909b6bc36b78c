//! Runtime services and shared state for the zeldos-bot.

use tracing::instrument;

use crate::{
    base::{
        config::Config,
        types::{Res, Void},
    },
    engine::{Engine, random::RandomClient},
    service::{chat::ChatClient, db::DbClient},
};

/// Runtime service context that can be shared across the application.
///
/// This struct holds the database client, chat client, heuristic engine, and configuration.
/// It is designed to be trivially cloneable, allowing it to be passed around
/// without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct Runtime {
    /// The configuration for the application.
    pub config: Config,
    /// The database client instance.
    pub db: DbClient,
    /// The heuristic engine instance.
    pub engine: Engine,
    /// The chat client instance.
    pub chat: ChatClient,
}

impl Runtime {
    /// Create a new runtime instance.
    #[instrument(skip_all)]
    pub async fn new(config: Config) -> Res<Self> {
        // Initialize the database.
        let db = DbClient::surreal(&config).await?;

        // Initialize the engine.
        let engine = Engine::new(&config, RandomClient::default());

        // Initialize the telegram client.
        let chat = ChatClient::telegram(&config, db.clone(), engine.clone()).await?;

        Ok(Self { config, db, engine, chat })
    }

    pub async fn start(&self) -> Void {
        self.chat.start().await
    }
}
