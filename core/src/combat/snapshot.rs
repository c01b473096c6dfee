//! Read-only combat state supplied by the host
//!
//! The host hands the engine a snapshot of the encounter with every event:
//! round/turn coordinates and the combatant roster with their tokens. The
//! engine keeps no combat state of its own between events.

use hashbrown::HashMap;

use tracknotes_types::{ActorId, CombatantId, TokenId};

/// The on-scene token a combatant fights through, with the actor facts the
/// engine needs (save bonus for saving throws, ability modifiers for derived
/// modifier values, linkage for store-owner resolution).
#[derive(Debug, Clone, Default)]
pub struct TokenSnapshot {
    pub id: TokenId,
    pub name: String,
    /// Owning actor document, if any.
    pub actor: Option<ActorId>,
    /// Linked tokens share the actor's data; unlinked tokens are independent
    /// copies.
    pub linked: bool,
    /// Bonus added to saving-throw rolls for notes on this token.
    pub save_bonus: i32,
    /// Ability-score modifiers by ability name ("str", "dex", ...).
    pub ability_mods: HashMap<String, i32>,
}

/// One roster entry in the combat encounter.
#[derive(Debug, Clone, Default)]
pub struct CombatantSnapshot {
    pub id: CombatantId,
    pub name: String,
    /// Combatants without a token are skipped by every event.
    pub token: Option<TokenSnapshot>,
}

/// Snapshot of the combat encounter at the moment an event fires.
#[derive(Debug, Clone, Default)]
pub struct CombatSnapshot {
    pub round: u32,
    pub turn: u32,
    /// The combatant whose turn it currently is.
    pub active: Option<CombatantId>,
    pub combatants: Vec<CombatantSnapshot>,
}

impl CombatSnapshot {
    pub fn combatant(&self, id: &CombatantId) -> Option<&CombatantSnapshot> {
        self.combatants.iter().find(|c| &c.id == id)
    }
}

/// The (round, turn, combatant) coordinates of one side of a turn-change
/// event: where the combat was before the change and where it is now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnMarker {
    pub round: u32,
    pub turn: u32,
    pub combatant: CombatantId,
}
