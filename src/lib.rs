//! Yasami - Telegram bot for organizing informal social events
//!
//! This library provides all the core functionality of the Yasami bot:
//! user profiles, a city-scoped event catalog, a registration ledger and
//! a peer rating engine backed by SQLite.
//!
//! # Module Structure
//!
//! - `core`: configuration, errors, domain services (registration, rating, VIP)
//! - `storage`: database pool, migrations, and table access
//! - `telegram`: Telegram bot integration and handlers

pub mod cli;
pub mod core;
pub mod storage;
pub mod telegram;

// Re-export commonly used types for convenience
pub use core::config;
pub use core::error::DomainError;
pub use storage::db::{create_pool, get_connection, DbConnection, DbPool};
pub use telegram::{create_bot, schema, HandlerDeps};
