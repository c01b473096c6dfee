//! Modifier notes: numeric stat bonuses
//!
//! The value is either the literal the user typed or derived from a named
//! ability-score modifier on an origin combatant. Derived values honour the
//! penalty flag: a non-negative source value is forced negative, an already
//! negative one is used as-is. Typed bonuses (`bonus_category`) go through
//! the ranked path, untyped ones stack additively.
//!
//! An unresolvable origin is a hard failure (nothing is applied); a stat
//! category with no application path degrades to a note without a bonus.

use tracing::debug;

use tracknotes_types::{AbilityOrigin, Note, NoteKind, ProtoNote};

use crate::combat::{CombatSnapshot, TokenSnapshot};
use crate::notes::error::{NoteError, SideEffectSkip};
use crate::platform::bonus::{BonusKind, BonusTarget, resolve_stat_category};
use crate::platform::Platform;

/// Label attached to bonus entries so they are recognizable in the host's
/// actor sheet. Removal matches the correlation id, not this label.
pub(super) fn bonus_label(text: &str) -> String {
    format!("note: {text}")
}

/// Resolve the modifier value from an ability-score origin.
fn derived_value(
    origin: &AbilityOrigin,
    penalty: bool,
    combat: Option<&CombatSnapshot>,
) -> Result<i32, NoteError> {
    let source = combat
        .and_then(|c| c.combatant(&origin.combatant))
        .and_then(|c| c.token.as_ref())
        .and_then(|t| t.ability_mods.get(origin.ability.as_str()).copied())
        .ok_or_else(|| NoteError::OriginNotFound {
            combatant: origin.combatant.clone(),
        })?;

    // Penalty flag: force non-negative source values negative; an already
    // negative modifier is used as-is.
    Ok(if penalty && source >= 0 { -source } else { source })
}

pub(super) async fn create(
    platform: &Platform,
    category: Option<&str>,
    value: Option<i32>,
    origin: Option<&AbilityOrigin>,
    bonus_category: Option<&str>,
    penalty: bool,
    proto: ProtoNote,
    targets: &[TokenSnapshot],
    combat: Option<&CombatSnapshot>,
) -> Result<Note, NoteError> {
    let Some(category) = category.filter(|c| !c.is_empty()) else {
        return Err(NoteError::IncompleteInput { kind: "modifier" });
    };
    let value = match (value, origin) {
        (Some(value), _) => value,
        (None, Some(origin)) => derived_value(origin, penalty, combat)?,
        (None, None) => return Err(NoteError::IncompleteInput { kind: "modifier" }),
    };

    let kind = NoteKind::Modifier {
        category: category.to_string(),
        value,
        bonus_category: bonus_category.map(str::to_string),
    };
    let text = kind.derive_text().unwrap_or_default();

    match resolve_stat_category(category) {
        Some(stat) => {
            let target = BonusTarget::Stat(stat);
            let label = bonus_label(&text);
            for token in targets {
                let Some(actor) = &token.actor else {
                    continue;
                };
                if bonus_category.is_some() {
                    // Typed bonuses of the same type don't stack; the host
                    // keeps the best-ranked one.
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
        }
        None => {
            let skip = SideEffectSkip::UnsupportedModifierType {
                category: category.to_string(),
            };
            platform.notifier.warn(&skip.to_string());
        }
    }

    Ok(proto.finalize(kind, text))
}

pub(super) async fn clean(
    platform: &Platform,
    token: &TokenSnapshot,
    note: &Note,
    category: &str,
    bonus_category: Option<&str>,
) -> Result<(), NoteError> {
    let Some(actor) = &token.actor else {
        return Ok(());
    };
    // A category that never resolved had no bonus applied.
    let Some(stat) = resolve_stat_category(category) else {
        debug!(category, note = %note.id, "no application path; nothing to remove");
        return Ok(());
    };
    let kind = if bonus_category.is_some() {
        BonusKind::Ranked
    } else {
        BonusKind::Additive
    };
    platform
        .bonuses
        .remove(actor, &BonusTarget::Stat(stat), kind, &note.id)
        .await?;
    Ok(())
}
