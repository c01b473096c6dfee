//! Sanitizing wrapper over the host's flag storage
//!
//! The host persists each token's note collection as an opaque JSON payload.
//! This wrapper turns raw payloads into well-formed [`Note`] collections:
//! a non-array payload is reset to empty with a warning, and individual
//! entries that fail to parse (or lack an id) are dropped. Bad data is
//! overwritten on the next successful write, never propagated as an error.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use tracknotes_types::{ActorId, Note, TokenId};

use crate::combat::TokenSnapshot;
use crate::platform::{Notifier, Platform, PlatformError, TrackingStore};

/// Where a token's notes live. Linked tokens share the actor document, so
/// their notes (and side effects) follow the actor; unlinked tokens keep an
/// independent per-token collection that dies with the token.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StoreKey {
    Actor(ActorId),
    Token(TokenId),
}

impl fmt::Display for StoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreKey::Actor(id) => write!(f, "actor:{id}"),
            StoreKey::Token(id) => write!(f, "token:{id}"),
        }
    }
}

/// The single place where the actor-vs-token storage duality is decided.
pub fn resolve_store_owner(token: &TokenSnapshot) -> StoreKey {
    match (&token.actor, token.linked) {
        (Some(actor), true) => StoreKey::Actor(actor.clone()),
        _ => StoreKey::Token(token.id.clone()),
    }
}

/// Typed access to one owner's note collection.
pub struct NoteStore {
    store: Arc<dyn TrackingStore>,
    notifier: Arc<dyn Notifier>,
}

impl NoteStore {
    pub fn new(platform: &Platform) -> Self {
        Self {
            store: Arc::clone(&platform.store),
            notifier: Arc::clone(&platform.notifier),
        }
    }

    /// Read and sanitize the note collection stored under `owner`.
    pub async fn read(&self, owner: &StoreKey) -> Result<Vec<Note>, PlatformError> {
        let Some(raw) = self.store.read(owner).await? else {
            return Ok(Vec::new());
        };

        let Value::Array(entries) = raw else {
            self.notifier
                .warn(&format!("Non-array notes data found on {owner}. Resetting notes."));
            return Ok(Vec::new());
        };

        let total = entries.len();
        let notes: Vec<Note> = entries
            .into_iter()
            .filter_map(|entry| serde_json::from_value::<Note>(entry).ok())
            .filter(|note| !note.id.as_str().is_empty())
            .collect();

        let dropped = total - notes.len();
        if dropped > 0 {
            self.notifier.warn(&format!(
                "Dropped {dropped} malformed note(s) from {owner}."
            ));
        }

        Ok(notes)
    }

    /// Persist the full note collection for `owner`.
    pub async fn write(&self, owner: &StoreKey, notes: &[Note]) -> Result<(), PlatformError> {
        debug!(%owner, count = notes.len(), "writing note collection");
        self.store.write(owner, notes).await
    }
}
