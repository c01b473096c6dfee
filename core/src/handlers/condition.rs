//! Condition notes: status markers on the owning actors
//!
//! Creation instantiates one status marker per condition per target actor,
//! tagged with the note id so cleanup can find exactly the markers this note
//! created. A second condition may be stacked onto the same note ("Dazed &
//! Slowed"); both markers share the note's tag and die together.

use tracknotes_types::{Note, NoteKind, ProtoNote};

use crate::combat::TokenSnapshot;
use crate::notes::error::NoteError;
use crate::platform::Platform;

pub(super) async fn create(
    platform: &Platform,
    condition: Option<&str>,
    second: Option<&str>,
    proto: ProtoNote,
    targets: &[TokenSnapshot],
) -> Result<Note, NoteError> {
    let Some(condition) = condition.filter(|c| !c.is_empty()) else {
        return Err(NoteError::IncompleteInput { kind: "condition" });
    };
    let second = second.filter(|s| !s.is_empty());

    for token in targets {
        let Some(actor) = &token.actor else {
            continue;
        };
        platform
            .conditions
            .apply(actor, condition, &proto.id)
            .await?;
        if let Some(second) = second {
            platform.conditions.apply(actor, second, &proto.id).await?;
        }
    }

    let kind = NoteKind::Condition {
        condition: condition.to_string(),
        second: second.map(str::to_string),
    };
    let text = kind.derive_text().unwrap_or_default();
    Ok(proto.finalize(kind, text))
}

/// Delete every status marker tagged with this note's id. Markers that no
/// longer exist (or never did) are a no-op on the sink side.
pub(super) async fn clean(
    platform: &Platform,
    token: &TokenSnapshot,
    note: &Note,
) -> Result<(), NoteError> {
    let Some(actor) = &token.actor else {
        return Ok(());
    };
    platform.conditions.remove(actor, &note.id).await?;
    Ok(())
}
