//! Error types for note creation and cleanup

use thiserror::Error;

use tracknotes_types::CombatantId;

use crate::platform::PlatformError;

/// Hard failures. Creation errors abort before any side effect is applied;
/// `MissingHandler` blocks cleanup of the one note it names.
#[derive(Debug, Error)]
pub enum NoteError {
    /// Required fields for the selected note kind are missing. Surfaced to
    /// the invoking UI only, never to the combat log.
    #[error("required fields missing for {kind} note")]
    IncompleteInput { kind: &'static str },

    /// The ability-score origin does not resolve to a usable combatant in
    /// the current encounter.
    #[error("origin combatant {combatant} not found in the current encounter")]
    OriginNotFound { combatant: CombatantId },

    /// The persisted note's kind has no handler in this revision. The note
    /// is skipped with a warning; encounter processing continues.
    #[error("no handler for note kind \"{kind}\" (note {id})")]
    MissingHandler { kind: String, id: String },

    /// A host collaborator rejected an operation. Not retried.
    #[error(transparent)]
    Platform(#[from] PlatformError),
}

/// Soft degradations: the note is still created, only its side effect is
/// skipped. These are warned through the notifier, not returned as errors.
#[derive(Debug, Error)]
pub enum SideEffectSkip {
    #[error("modifier type \"{category}\" is not supported yet; note created without a bonus")]
    UnsupportedModifierType { category: String },

    #[error("resistance type \"{damage_type}\" is not supported yet; note created without a bonus")]
    UnsupportedResistanceType { damage_type: String },
}
