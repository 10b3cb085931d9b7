//! Handler types and dependencies

use std::sync::Arc;

use teloxide::prelude::*;

use crate::storage::db::DbPool;
use crate::telegram::session::SessionStore;

/// Error type for handlers
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Dependencies required by handlers
#[derive(Clone)]
pub struct HandlerDeps {
    pub db_pool: Arc<DbPool>,
    pub sessions: Arc<SessionStore>,
    pub bot_username: Option<String>,
    pub bot_id: UserId,
}

impl HandlerDeps {
    /// Create new handler dependencies
    pub fn new(
        db_pool: Arc<DbPool>,
        sessions: Arc<SessionStore>,
        bot_username: Option<String>,
        bot_id: UserId,
    ) -> Self {
        Self {
            db_pool,
            sessions,
            bot_username,
            bot_id,
        }
    }
}
