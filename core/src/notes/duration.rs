//! Duration policy: which notes does a combat event expire
//!
//! Pure, stateless predicates over a note and the round/turn coordinates an
//! event reports. Ownership of `SaveEnds` notes is positional: a note is a
//! candidate when it sits in the store of the token whose turn just ended,
//! so the predicate itself only checks the duration class.

use tracknotes_types::{CombatantId, Note, NoteDuration};

/// A `Round` note expires once the round number strictly exceeds its anchor
/// round. Advancing to exactly the anchor round keeps it.
pub fn is_round_expired(note: &Note, current_round: u32) -> bool {
    note.duration == NoteDuration::Round && current_round > note.round
}

/// An `EndOfTurn` note expires at the end of its combatant's turn, strictly
/// after the anchor: greater round, or equal round with greater turn. Equal
/// round and turn is the note's own creation instant and never expires.
pub fn is_end_of_turn_expired(
    note: &Note,
    previous_combatant: &CombatantId,
    previous_round: u32,
    previous_turn: u32,
) -> bool {
    match &note.duration {
        NoteDuration::EndOfTurn { combatant } => {
            combatant == previous_combatant
                && (previous_round > note.round
                    || (previous_round == note.round && previous_turn > note.turn))
        }
        _ => false,
    }
}

/// Whether a note stored against the token whose turn just ended is due for
/// a saving-throw attempt.
pub fn is_save_ends_candidate(note: &Note) -> bool {
    note.duration == NoteDuration::SaveEnds
}
