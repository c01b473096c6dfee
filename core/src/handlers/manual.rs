//! Manual notes: free text, no side effects

use tracknotes_types::{Note, NoteKind, ProtoNote};

use crate::notes::error::NoteError;

pub(super) fn create(text: Option<&str>, proto: ProtoNote) -> Result<Note, NoteError> {
    let Some(text) = text.filter(|t| !t.is_empty()) else {
        return Err(NoteError::IncompleteInput { kind: "manual" });
    };
    Ok(proto.finalize(NoteKind::Manual, text.to_string()))
}
