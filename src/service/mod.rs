//! Service integrations for external APIs and clients.
//!
//! This module contains implementations for the collaborators the bot talks to:
//! - Chat services (e.g., Telegram)
//! - Database services (e.g., SurrealDB)
//!
//! Each service module defines both generic traits and concrete implementations,
//! allowing for extensibility and easy testing.

pub mod chat;
pub mod db;
