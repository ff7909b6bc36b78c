//! Core components, types, and utilities for the zeldos-bot.
//!
//! This module contains fundamental building blocks used throughout the application:
//! - Configuration handling and environment variables.
//! - Default trigger vocabularies and canned replies.
//! - Common types, the error taxonomy, and result handling.

pub mod config;
pub mod phrases;
pub mod types;
