//! Resistance notes: damage-type resistances and vulnerabilities
//!
//! A positive value means resistance and is applied as a priority-ranked
//! entry so the best resistance wins when stacked; a negative value means
//! vulnerability and stacks additively. Cleanup must branch on the stored
//! sign to pick the matching removal path; this sign dependency is part of
//! the contract, not an implementation detail.

use tracknotes_types::{Note, NoteKind, ProtoNote};

use crate::combat::TokenSnapshot;
use crate::handlers::modifier::bonus_label;
use crate::notes::error::{NoteError, SideEffectSkip};
use crate::platform::bonus::{is_known_damage_type, BonusKind, BonusTarget};
use crate::platform::Platform;

fn target_for(damage_type: &str) -> BonusTarget {
    BonusTarget::Resistance(damage_type.to_ascii_lowercase())
}

pub(super) async fn create(
    platform: &Platform,
    damage_type: Option<&str>,
    value: Option<i32>,
    proto: ProtoNote,
    targets: &[TokenSnapshot],
) -> Result<Note, NoteError> {
    let (Some(damage_type), Some(value)) = (damage_type.filter(|t| !t.is_empty()), value) else {
        return Err(NoteError::IncompleteInput { kind: "resistance" });
    };

    let kind = NoteKind::Resistance {
        damage_type: damage_type.to_string(),
        value,
    };
    let text = kind.derive_text().unwrap_or_default();

    if is_known_damage_type(damage_type) {
        let target = target_for(damage_type);
        let label = bonus_label(&text);
        for token in targets {
            let Some(actor) = &token.actor else {
                continue;
            };
            if value >= 0 {
                platform
                    .bonuses
                    .apply_ranked(actor, &target, value, value, &label, &proto.id)
                    .await?;
            } else {
                platform
                    .bonuses
                    .apply_additive(actor, &target, value, &label, &proto.id)
                    .await?;
            }
        }
    } else {
        let skip = SideEffectSkip::UnsupportedResistanceType {
            damage_type: damage_type.to_string(),
        };
        platform.notifier.warn(&skip.to_string());
    }

    Ok(proto.finalize(kind, text))
}

pub(super) async fn clean(
    platform: &Platform,
    token: &TokenSnapshot,
    note: &Note,
    damage_type: &str,
    value: i32,
) -> Result<(), NoteError> {
    let Some(actor) = &token.actor else {
        return Ok(());
    };
    if !is_known_damage_type(damage_type) {
        return Ok(());
    }
    // The stored sign decides which path the entry went in on.
    let kind = if value >= 0 {
        BonusKind::Ranked
    } else {
        BonusKind::Additive
    };
    platform
        .bonuses
        .remove(actor, &target_for(damage_type), kind, &note.id)
        .await?;
    Ok(())
}
