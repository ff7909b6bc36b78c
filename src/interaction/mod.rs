//! Event handling and user interactions for zeldos-bot.
//!
//! This module provides functionality for handling chat events:
//! - Running every inbound message through the heuristic pipeline
//! - Parsing and answering slash commands

pub mod chat_event;
pub mod command;
