//! Ongoing-damage notes: purely data-carrying
//!
//! No side effects at creation; the combat event router resolves the stored
//! damage each time the owner's turn starts, and the note persists until
//! another duration mechanism or a manual deletion removes it.

use tracknotes_types::{Note, NoteKind, ProtoNote};

use crate::notes::error::NoteError;

pub(super) fn create(
    damage_type: Option<&str>,
    amount: Option<&str>,
    proto: ProtoNote,
) -> Result<Note, NoteError> {
    let (Some(damage_type), Some(amount)) = (
        damage_type.filter(|t| !t.is_empty()),
        amount.filter(|a| !a.is_empty()),
    ) else {
        return Err(NoteError::IncompleteInput { kind: "ongoing" });
    };

    let kind = NoteKind::Ongoing {
        damage_type: damage_type.to_string(),
        amount: amount.to_string(),
    };
    let text = kind.derive_text().unwrap_or_default();
    Ok(proto.finalize(kind, text))
}
