//! Shared note data model for the combat note tracker
//!
//! This crate contains the serializable types that are shared between the
//! lifecycle engine (tracknotes-core) and whatever host glue drives it:
//! opaque ids, the persisted [`Note`] record, duration classification, and
//! the raw dialog input a note is created from.

use serde::{Deserialize, Serialize};
use std::fmt;

// ─────────────────────────────────────────────────────────────────────────────
// Ids
// ─────────────────────────────────────────────────────────────────────────────

macro_rules! opaque_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }
    };
}

opaque_id!(
    /// Stable identifier of one note, assigned at creation. Side effects are
    /// correlated to the note through this id, never through its text.
    NoteId
);
opaque_id!(
    /// Host id of an on-scene token.
    TokenId
);
opaque_id!(
    /// Host id of an actor document (shared by linked tokens).
    ActorId
);
opaque_id!(
    /// Host id of a combat roster entry.
    CombatantId
);

impl NoteId {
    /// Generate a fresh, unique note id.
    pub fn fresh() -> Self {
        Self(format!("note-{}", uuid::Uuid::new_v4()))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Duration classification
// ─────────────────────────────────────────────────────────────────────────────

/// When a note expires. The round/turn anchor lives on the [`Note`] itself;
/// this enum only selects the expiry mechanism.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum NoteDuration {
    /// Expires only when the combat encounter is deleted.
    Encounter,
    /// Expires once the round number exceeds the note's anchor round.
    Round,
    /// Resolved by a saving throw at the end of each of the owner's turns.
    SaveEnds,
    /// Expires at the end of the named combatant's turn, strictly after the
    /// anchor round/turn. The combatant ref is part of the variant so it can
    /// never be absent.
    EndOfTurn { combatant: CombatantId },
}

impl NoteDuration {
    /// User-facing label, as shown in the duration picker and combat log.
    pub fn label(&self, combatant_name: Option<&str>) -> String {
        match self {
            NoteDuration::Encounter => "Encounter".to_string(),
            NoteDuration::Round => "Round".to_string(),
            NoteDuration::SaveEnds => "Save Ends".to_string(),
            NoteDuration::EndOfTurn { combatant } => match combatant_name {
                Some(name) => format!("EoT {name}"),
                None => format!("EoT {combatant}"),
            },
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Note kinds and the persisted record
// ─────────────────────────────────────────────────────────────────────────────

/// The kind of a note together with its kind-specific payload.
///
/// Persisted notes carry these fields inline (the enum is flattened into the
/// note record), so a stored note reads as one flat object. Kinds written by
/// a newer revision than the reader deserialize as [`NoteKind::Unknown`] and
/// are skipped with a warning instead of failing the whole collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NoteKind {
    /// A status condition, optionally stacked with a second one.
    Condition {
        condition: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        second: Option<String>,
    },
    /// Recurring damage resolved at the start of the owner's turn.
    /// `amount` is a dice expression such as `"2d6"` or `"5"`.
    Ongoing { damage_type: String, amount: String },
    /// A numeric change to a stat category. `category` keeps the raw
    /// requested name so unsupported categories survive round-trips.
    /// A typed bonus (`bonus_category`) is priority-ranked; untyped bonuses
    /// stack additively.
    Modifier {
        category: String,
        value: i32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        bonus_category: Option<String>,
    },
    /// Resistance (positive) or vulnerability (negative) to a damage type.
    Resistance { damage_type: String, value: i32 },
    /// Free-text marker with no side effects.
    Manual,
    /// Any kind this revision does not know how to handle.
    #[serde(other)]
    Unknown,
}

impl NoteKind {
    /// Short name used in warnings and log lines.
    pub fn name(&self) -> &'static str {
        match self {
            NoteKind::Condition { .. } => "condition",
            NoteKind::Ongoing { .. } => "ongoing",
            NoteKind::Modifier { .. } => "modifier",
            NoteKind::Resistance { .. } => "resistance",
            NoteKind::Manual => "manual",
            NoteKind::Unknown => "unknown",
        }
    }

    /// Derive the note's display text from the kind payload.
    ///
    /// Returns `None` for kinds whose text is not derived (manual notes keep
    /// the text the user typed; unknown kinds keep whatever was stored).
    pub fn derive_text(&self) -> Option<String> {
        match self {
            NoteKind::Condition { condition, second } => Some(match second {
                Some(second) => format!("{condition} & {second}"),
                None => condition.clone(),
            }),
            NoteKind::Ongoing {
                damage_type,
                amount,
            } => Some(format!("Ongoing {amount} {damage_type}")),
            NoteKind::Modifier {
                category, value, ..
            } => Some(format!("{value:+} {category}")),
            NoteKind::Resistance { damage_type, value } => {
                Some(format!("{value:+} {damage_type} Resistance"))
            }
            NoteKind::Manual | NoteKind::Unknown => None,
        }
    }
}

/// One tracked annotation on a token, as persisted in the host's flag store.
///
/// Notes are immutable once created; edits are modeled as delete + recreate.
/// Identity is the `id`; content equality (text + duration) is only used for
/// the multi-token "shared note" view, never for lifecycle decisions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    #[serde(flatten)]
    pub kind: NoteKind,
    /// Human-readable label, recomputed from the kind payload at creation.
    pub text: String,
    pub duration: NoteDuration,
    /// Combat round active when the note was created (expiry anchor).
    pub round: u32,
    /// Combat turn active when the note was created (expiry anchor).
    pub turn: u32,
}

impl Note {
    /// Content match used for the cross-token shared-note view.
    pub fn same_content(&self, other: &Note) -> bool {
        self.text == other.text && self.duration == other.duration
    }
}

/// The partially filled note the dialog builds before a handler fills in the
/// kind-specific payload: fresh id, chosen duration, and the round/turn
/// anchor taken from the active combat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProtoNote {
    pub id: NoteId,
    pub duration: NoteDuration,
    pub round: u32,
    pub turn: u32,
}

impl ProtoNote {
    /// Finalize into a persisted note with the given kind and display text.
    pub fn finalize(self, kind: NoteKind, text: String) -> Note {
        Note {
            id: self.id,
            kind,
            text,
            duration: self.duration,
            round: self.round,
            turn: self.turn,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Dialog input
// ─────────────────────────────────────────────────────────────────────────────

/// Where a derived modifier value comes from: a named ability score on a
/// combatant in the current encounter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityOrigin {
    pub combatant: CombatantId,
    pub ability: String,
}

/// Raw user input collected by the tracking dialog, one variant per note
/// kind. Fields are optional because the form may be submitted half-filled;
/// the matching handler validates completeness.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "tab", rename_all = "snake_case")]
pub enum NoteInput {
    Condition {
        condition: Option<String>,
        #[serde(default)]
        second: Option<String>,
    },
    Ongoing {
        damage_type: Option<String>,
        amount: Option<String>,
    },
    Modifier {
        category: Option<String>,
        /// Literal value typed by the user.
        value: Option<i32>,
        /// Ability-score origin, used when no literal value is given.
        #[serde(default)]
        origin: Option<AbilityOrigin>,
        /// Typed-bonus name; typed bonuses are priority-ranked.
        #[serde(default)]
        bonus_category: Option<String>,
        /// Force a non-negative derived value negative ("penalty").
        #[serde(default)]
        penalty: bool,
    },
    Resistance {
        damage_type: Option<String>,
        value: Option<i32>,
    },
    Manual {
        text: Option<String>,
    },
}

/// One entry of the duration picker: the duration to store plus its
/// user-facing label ("Encounter", "EoT Goblin", ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DurationChoice {
    pub duration: NoteDuration,
    pub label: String,
}
