//! Host collaborator contracts
//!
//! The engine runs embedded in a larger game host. Everything the host owns
//! (flag storage, status markers, stat bonuses, dice, chat output) sits
//! behind the async traits in this module. The host implements them once and
//! hands the engine a [`Platform`] bundle; the engine never reaches for
//! ambient globals.

pub mod bonus;
pub mod roll;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use tracknotes_types::{ActorId, Note, NoteId};

use crate::notes::store::StoreKey;
use bonus::{BonusKind, BonusTarget};
use roll::RollExpr;

/// Errors surfaced by host collaborators. The engine never retries these;
/// they propagate as rejected operations and the caller logs and moves on.
#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("storage operation failed for {key}: {reason}")]
    Storage { key: String, reason: String },

    #[error("side-effect operation failed for actor {actor}: {reason}")]
    SideEffect { actor: ActorId, reason: String },

    #[error("dice roll failed for \"{expr}\": {reason}")]
    Roll { expr: String, reason: String },
}

/// The host's per-token persisted key-value flag storage.
///
/// `read` returns the raw flag payload; sanitizing it into well-formed notes
/// is the engine's job (see [`crate::notes::store::NoteStore`]). The
/// read-filter-write cycle is not transactional: concurrent external writes
/// to the same key are last-writer-wins.
#[async_trait]
pub trait TrackingStore: Send + Sync {
    /// Raw note payload stored under `owner`, or `None` if absent.
    async fn read(&self, owner: &StoreKey) -> Result<Option<Value>, PlatformError>;

    /// Replace the note collection stored under `owner`.
    async fn write(&self, owner: &StoreKey, notes: &[Note]) -> Result<(), PlatformError>;
}

/// Status/condition markers on an actor, tagged with the creating note's id.
#[async_trait]
pub trait StatusSink: Send + Sync {
    /// Create a status marker named `condition`, tagged with `correlation`.
    async fn apply(
        &self,
        actor: &ActorId,
        condition: &str,
        correlation: &NoteId,
    ) -> Result<(), PlatformError>;

    /// Delete every marker tagged with `correlation`. Removing a tag with no
    /// matching marker is a no-op, not an error.
    async fn remove(&self, actor: &ActorId, correlation: &NoteId) -> Result<(), PlatformError>;
}

/// Numeric stat-bonus entries on an actor, keyed by a resolved
/// [`BonusTarget`] and tagged with the creating note's id.
///
/// Removal takes the [`BonusKind`] explicitly: ranked and additive entries
/// live on different paths in the host's data model, and the caller knows
/// which one it created (resistances branch on the stored sign).
#[async_trait]
pub trait StatBonusSink: Send + Sync {
    /// Add a stacking bonus entry.
    async fn apply_additive(
        &self,
        actor: &ActorId,
        target: &BonusTarget,
        value: i32,
        label: &str,
        correlation: &NoteId,
    ) -> Result<(), PlatformError>;

    /// Add a priority-ranked entry; the host applies the best-ranked one.
    async fn apply_ranked(
        &self,
        actor: &ActorId,
        target: &BonusTarget,
        value: i32,
        priority: i32,
        label: &str,
        correlation: &NoteId,
    ) -> Result<(), PlatformError>;

    /// Remove the entry tagged with `correlation` from the given path.
    /// Absent entries are a no-op.
    async fn remove(
        &self,
        actor: &ActorId,
        target: &BonusTarget,
        kind: BonusKind,
        correlation: &NoteId,
    ) -> Result<(), PlatformError>;
}

/// Produces integer roll totals for saving throws and ongoing damage.
#[async_trait]
pub trait DiceRoller: Send + Sync {
    async fn roll(&self, expr: &RollExpr) -> Result<i32, PlatformError>;
}

/// User-visible output. `announce` goes to the combat log/chat; `warn` is a
/// non-fatal operator warning (bad stored data, unsupported categories).
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn announce(&self, message: &str);

    fn warn(&self, message: &str);
}

/// The bundle of host collaborators, constructed once at initialization and
/// passed by reference to the router and handlers.
#[derive(Clone)]
pub struct Platform {
    pub store: Arc<dyn TrackingStore>,
    pub conditions: Arc<dyn StatusSink>,
    pub bonuses: Arc<dyn StatBonusSink>,
    pub dice: Arc<dyn DiceRoller>,
    pub notifier: Arc<dyn Notifier>,
}
