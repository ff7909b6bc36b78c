//! Library root for `zeldos-bot`.
//!
//! Zeldos-bot is a companion for a Telegram group chat designed to:
//! - Remember everyone who speaks, so the group can be mentioned at once
//! - Notice heated bursts of conversation and call them out
//! - Answer its name with the occasional sticker
//!
//! The bot integrates with Telegram for chat and SurrealDB for storage. The architecture is built
//! around extensible traits that allow for different implementations of each service.

pub mod base;
pub mod engine;
pub mod interaction;
pub mod runtime;
pub mod service;

use base::{config::Config, types::Void};
use tracing::info;

/// Public async entry for the binary crate.
///
/// Sets up necessary services and starts the zeldos-bot runtime:
/// - Creates the runtime context with database, engine, and chat clients
/// - Starts the main event loop for processing messages
pub async fn start(config: Config) -> Void {
    info!("Starting zeldos-bot ...");

    // Initialize the runtime.
    let runtime = runtime::Runtime::new(config).await?;

    // Start the runtime.
    runtime.start().await?;

    Ok(())
}
