//! Note handlers
//!
//! One handler per note kind, each owning the creation and cleanup of that
//! kind's side effects. Dispatch is a closed tagged-union match on the kind,
//! not an inheritance chain: `create_note` routes raw dialog input to the
//! matching handler, `clean_note` routes a persisted note.
//!
//! Contract shared by every handler:
//! - `create` validates kind-mandatory input, applies side effects to every
//!   target token's actor, and returns the finalized note. Hard failures
//!   abort before any side effect is applied.
//! - `clean` retracts side effects matched by note id (never by text) and is
//!   a no-op when nothing matches, so retries are safe.

mod condition;
mod manual;
mod modifier;
mod ongoing;
mod resistance;


use tracknotes_types::{Note, NoteInput, NoteKind, ProtoNote};

use crate::combat::{CombatSnapshot, TokenSnapshot};
use crate::notes::error::NoteError;
use crate::platform::Platform;

/// Create a note from raw dialog input, applying any side effects to every
/// target token. The proto-note carries the id, duration, and round/turn
/// anchor the dialog prepared.
pub async fn create_note(
    platform: &Platform,
    input: &NoteInput,
    proto: ProtoNote,
    targets: &[TokenSnapshot],
    combat: Option<&CombatSnapshot>,
) -> Result<Note, NoteError> {
    match input {
        NoteInput::Condition { condition, second } => {
            condition::create(platform, condition.as_deref(), second.as_deref(), proto, targets)
                .await
        }
        NoteInput::Ongoing {
            damage_type,
            amount,
        } => ongoing::create(damage_type.as_deref(), amount.as_deref(), proto),
        NoteInput::Modifier {
            category,
            value,
            origin,
            bonus_category,
            penalty,
        } => {
            modifier::create(
                platform,
                category.as_deref(),
                *value,
                origin.as_ref(),
                bonus_category.as_deref(),
                *penalty,
                proto,
                targets,
                combat,
            )
            .await
        }
        NoteInput::Resistance { damage_type, value } => {
            resistance::create(platform, damage_type.as_deref(), *value, proto, targets).await
        }
        NoteInput::Manual { text } => manual::create(text.as_deref(), proto),
    }
}

/// Retract the side effects a note created on one token, matched by the
/// note's id. Kinds without side effects are pass-throughs; an unknown kind
/// is a hard stop for this note only.
pub async fn clean_note(
    platform: &Platform,
    token: &TokenSnapshot,
    note: &Note,
) -> Result<(), NoteError> {
    match &note.kind {
        NoteKind::Condition { .. } => condition::clean(platform, token, note).await,
        NoteKind::Modifier {
            category,
            bonus_category,
            ..
        } => modifier::clean(platform, token, note, category, bonus_category.as_deref()).await,
        NoteKind::Resistance { damage_type, value } => {
            resistance::clean(platform, token, note, damage_type, *value).await
        }
        // Purely data-carrying kinds have nothing to retract.
        NoteKind::Ongoing { .. } | NoteKind::Manual => Ok(()),
        NoteKind::Unknown => Err(NoteError::MissingHandler {
            kind: note.kind.name().to_string(),
            id: note.id.to_string(),
        }),
    }
}
