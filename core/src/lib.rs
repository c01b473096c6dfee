//! Combat-note lifecycle engine
//!
//! Notes are attached to combatant tokens and live until a combat event
//! expires them: round advancement, turn changes (saving throws, end-of-turn
//! expiry, ongoing damage), or combat deletion. The host supplies storage,
//! status markers, stat bonuses, dice, and notifications through the
//! [`Platform`] trait bundle; everything here is host-agnostic.

pub mod combat;
pub mod compose;
pub mod handlers;
pub mod notes;
pub mod platform;

#[cfg(test)]
mod testutil;

// Re-exports for convenience
pub use combat::{CombatEventRouter, CombatSnapshot, CombatantSnapshot, TokenSnapshot, TurnMarker};
pub use compose::{
    NoteSubmission, SubmissionOutcome, default_duration, duration_choices, shared_notes, submit,
};
pub use handlers::{create_note, clean_note};
pub use notes::duration::{is_end_of_turn_expired, is_round_expired, is_save_ends_candidate};
pub use notes::error::NoteError;
pub use notes::store::{NoteStore, StoreKey, resolve_store_owner};
pub use platform::bonus::{BonusKind, BonusTarget, StatCategory, resolve_stat_category};
pub use platform::roll::RollExpr;
pub use platform::{
    DiceRoller, Notifier, Platform, PlatformError, StatBonusSink, StatusSink, TrackingStore,
};
pub use tracknotes_types::{
    AbilityOrigin, ActorId, CombatantId, DurationChoice, Note, NoteDuration, NoteId, NoteInput,
    NoteKind, ProtoNote, TokenId,
};
