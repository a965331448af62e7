use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use super::storage::{MemoryStorage, Storage};
use crate::models::User;

/// Storage key holding the bearer token
pub const TOKEN_KEY: &str = "token";

/// Storage key holding the serialized user object
pub const USER_KEY: &str = "user";

/// The client's login state: a bearer token and the user it belongs to.
///
/// Passed explicitly to every request instead of being read from global
/// state.
pub struct Session {
    storage: Box<dyn Storage>,
}

impl Session {
    pub fn new(storage: impl Storage + 'static) -> Self {
        Self {
            storage: Box::new(storage),
        }
    }

    /// A session that is forgotten when the process exits
    pub fn in_memory() -> Self {
        Self::new(MemoryStorage::new())
    }

    /// Get the bearer token, if one is stored
    pub fn token(&self) -> Option<&str> {
        self.storage
            .get_item(TOKEN_KEY)
            .map(|item| item.value.as_str())
            .filter(|token| !token.is_empty())
    }

    pub fn has_token(&self) -> bool {
        self.token().is_some()
    }

    /// Get the cached user. An unreadable entry is treated as absent.
    pub fn user(&self) -> Option<User> {
        let item = self.storage.get_item(USER_KEY)?;
        match serde_json::from_str(&item.value) {
            Ok(user) => Some(user),
            Err(e) => {
                warn!(error = %e, "Ignoring unreadable cached user");
                None
            }
        }
    }

    /// When the current token was stored
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.token()?;
        self.storage.get_item(TOKEN_KEY).map(|item| item.stored_at)
    }

    /// Save a freshly issued token and its user.
    /// The previous user is dropped first so a failed write never pairs the
    /// new token with it.
    pub fn store(&mut self, token: &str, user: Option<&User>) -> Result<()> {
        self.storage
            .remove_item(USER_KEY)
            .context("Failed to remove previous user")?;
        self.storage
            .set_item(TOKEN_KEY, token.to_string())
            .context("Failed to store token")?;
        if let Some(user) = user {
            let serialized = serde_json::to_string(user)?;
            self.storage
                .set_item(USER_KEY, serialized)
                .context("Failed to store user")?;
        }
        debug!(has_user = user.is_some(), "Session stored");
        Ok(())
    }

    /// Forget the token and the cached user.
    /// Both entries are removed even if the first removal fails.
    pub fn clear(&mut self) -> Result<()> {
        let token = self.storage.remove_item(TOKEN_KEY);
        let user = self.storage.remove_item(USER_KEY);
        debug!("Session cleared");
        token.context("Failed to remove token")?;
        user.context("Failed to remove user")?;
        Ok(())
    }
}
