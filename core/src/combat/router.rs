//! Combat event router
//!
//! Reacts to the three combat events the host emits (round advanced, turn
//! changed, combat deleted) by expiring due notes across all combatants. A
//! turn-change event is both the end of the previous combatant's turn and
//! the start of the current one, and its sub-steps run in a fixed order:
//! saving throws, end-of-turn expiry, ongoing damage.
//!
//! A combatant with no token, a rejected storage operation, or malformed
//! note data skips that combatant only; the remaining roster is always
//! processed. Each resolved store key is visited once per event even when
//! several linked tokens share an actor.

use hashbrown::HashSet;
use tracing::{debug, warn};

use tracknotes_types::{Note, NoteKind};

use crate::handlers::clean_note;
use crate::notes::duration::{is_end_of_turn_expired, is_round_expired, is_save_ends_candidate};
use crate::notes::error::NoteError;
use crate::notes::store::{NoteStore, StoreKey, resolve_store_owner};
use crate::platform::Platform;
use crate::platform::roll::RollExpr;

use super::snapshot::{CombatSnapshot, TokenSnapshot, TurnMarker};

/// Saving throws succeed at this total or higher.
pub const SAVE_THRESHOLD: i32 = 10;

/// Drives the note lifecycle from combat events. Stateless between events:
/// everything is re-read from the tracking store when an event fires.
pub struct CombatEventRouter {
    platform: Platform,
}

impl CombatEventRouter {
    pub fn new(platform: Platform) -> Self {
        Self { platform }
    }

    /// Round advanced: expire every `Round` note whose anchor round is now
    /// strictly in the past, with one consolidated notification per token.
    pub async fn on_combat_round(&self, combat: &CombatSnapshot, new_round: u32) {
        let store = NoteStore::new(&self.platform);
        let mut visited: HashSet<StoreKey> = HashSet::new();

        for combatant in &combat.combatants {
            let Some(token) = &combatant.token else {
                debug!(combatant = %combatant.name, "combatant has no token; skipping");
                continue;
            };
            let owner = resolve_store_owner(token);
            if !visited.insert(owner.clone()) {
                continue;
            }
            let due = |note: &Note| is_round_expired(note, new_round);
            if let Err(err) = self.expire_notes(&store, token, &owner, due).await {
                warn!(%err, token = %token.name, "round expiry failed; continuing with remaining combatants");
            }
        }
    }

    /// Turn changed: end of `previous`'s turn, start of `current`'s turn.
    ///
    /// Sub-steps in fixed order:
    /// 1. saving throws for the token whose turn ended
    /// 2. end-of-turn expiry across all combatants
    /// 3. ongoing damage for the token whose turn is starting
    pub async fn on_combat_turn_change(
        &self,
        combat: &CombatSnapshot,
        previous: &TurnMarker,
        current: &TurnMarker,
    ) {
        let store = NoteStore::new(&self.platform);

        match combat
            .combatant(&previous.combatant)
            .and_then(|c| c.token.as_ref())
        {
            Some(token) => {
                if let Err(err) = self.resolve_saving_throws(&store, token).await {
                    warn!(%err, token = %token.name, "saving-throw resolution failed");
                }
            }
            None => debug!(combatant = %previous.combatant, "previous combatant has no token"),
        }

        let mut visited: HashSet<StoreKey> = HashSet::new();
        for combatant in &combat.combatants {
            let Some(token) = &combatant.token else {
                continue;
            };
            let owner = resolve_store_owner(token);
            if !visited.insert(owner.clone()) {
                continue;
            }
            let due = |note: &Note| {
                is_end_of_turn_expired(note, &previous.combatant, previous.round, previous.turn)
            };
            if let Err(err) = self.expire_notes(&store, token, &owner, due).await {
                warn!(%err, token = %token.name, "end-of-turn expiry failed; continuing with remaining combatants");
            }
        }

        match combat
            .combatant(&current.combatant)
            .and_then(|c| c.token.as_ref())
        {
            Some(token) => {
                if let Err(err) = self.resolve_ongoing(&store, token).await {
                    warn!(%err, token = %token.name, "ongoing damage resolution failed");
                }
            }
            None => debug!(combatant = %current.combatant, "current combatant has no token"),
        }
    }

    /// Combat deleted: terminal cleanup of every remaining note of any
    /// duration, announcing once per token that had notes.
    pub async fn on_delete_combat(&self, combat: &CombatSnapshot) {
        let store = NoteStore::new(&self.platform);
        let mut visited: HashSet<StoreKey> = HashSet::new();

        for combatant in &combat.combatants {
            let Some(token) = &combatant.token else {
                continue;
            };
            let owner = resolve_store_owner(token);
            if !visited.insert(owner.clone()) {
                continue;
            }
            if let Err(err) = self.clear_all_notes(&store, token, &owner).await {
                warn!(%err, token = %token.name, "combat-deletion cleanup failed; continuing with remaining combatants");
            }
        }
    }

    /// Remove every note matching `due` from one token's collection:
    /// clean, drop from the store, announce the batch. A note whose kind has
    /// no handler is retained with a warning.
    async fn expire_notes(
        &self,
        store: &NoteStore,
        token: &TokenSnapshot,
        owner: &StoreKey,
        due: impl Fn(&Note) -> bool,
    ) -> Result<(), NoteError> {
        let notes = store.read(owner).await?;
        let mut kept = Vec::with_capacity(notes.len());
        let mut removed = Vec::new();

        for note in notes {
            if !due(&note) {
                kept.push(note);
                continue;
            }
            match clean_note(&self.platform, token, &note).await {
                Ok(()) => removed.push(note.text),
                Err(err @ NoteError::MissingHandler { .. }) => {
                    self.platform.notifier.warn(&err.to_string());
                    kept.push(note);
                }
                Err(err) => return Err(err),
            }
        }

        if removed.is_empty() {
            return Ok(());
        }
        store.write(owner, &kept).await?;
        self.platform
            .notifier
            .announce(&format!("{}: expired {}", token.name, removed.join(", ")))
            .await;
        Ok(())
    }

    /// Roll a save for each `SaveEnds` note on the token whose turn just
    /// ended. Success removes the note; both outcomes are announced.
    async fn resolve_saving_throws(
        &self,
        store: &NoteStore,
        token: &TokenSnapshot,
    ) -> Result<(), NoteError> {
        let owner = resolve_store_owner(token);
        let notes = store.read(&owner).await?;
        let mut kept = Vec::with_capacity(notes.len());
        let mut any_removed = false;

        for note in notes {
            if !is_save_ends_candidate(&note) {
                kept.push(note);
                continue;
            }

            let expr = RollExpr::save(token.save_bonus);
            let total = self.platform.dice.roll(&expr).await?;

            if total < SAVE_THRESHOLD {
                self.platform
                    .notifier
                    .announce(&format!(
                        "{} fails the save against \"{}\": rolled {} (needs {})",
                        token.name, note.text, total, SAVE_THRESHOLD
                    ))
                    .await;
                kept.push(note);
                continue;
            }

            match clean_note(&self.platform, token, &note).await {
                Ok(()) => {
                    any_removed = true;
                    self.platform
                        .notifier
                        .announce(&format!(
                            "{} saves against \"{}\": rolled {} (needs {})",
                            token.name, note.text, total, SAVE_THRESHOLD
                        ))
                        .await;
                }
                Err(err @ NoteError::MissingHandler { .. }) => {
                    self.platform.notifier.warn(&err.to_string());
                    kept.push(note);
                }
                Err(err) => return Err(err),
            }
        }

        // Persist the removal; a successful save must not resurrect the
        // note on the next event.
        if any_removed {
            store.write(&owner, &kept).await?;
        }
        Ok(())
    }

    /// Roll and announce each ongoing-damage note on the token whose turn
    /// is starting. Ongoing notes are never removed here.
    async fn resolve_ongoing(
        &self,
        store: &NoteStore,
        token: &TokenSnapshot,
    ) -> Result<(), NoteError> {
        let owner = resolve_store_owner(token);
        for note in store.read(&owner).await? {
            let NoteKind::Ongoing {
                damage_type,
                amount,
            } = &note.kind
            else {
                continue;
            };

            let expr = match RollExpr::parse(amount) {
                Ok(expr) => expr.tagged(damage_type.clone()),
                Err(err) => {
                    self.platform
                        .notifier
                        .warn(&format!("Cannot roll ongoing damage for \"{}\": {err}", note.text));
                    continue;
                }
            };
            let total = self.platform.dice.roll(&expr).await?;
            self.platform
                .notifier
                .announce(&format!(
                    "{} takes {} {} damage ({} ongoing)",
                    token.name, total, damage_type, expr
                ))
                .await;
        }
        Ok(())
    }

    /// Terminal cleanup of one token's whole collection. Unknown kinds are
    /// removed anyway (their side effects, if any, cannot be reached by this
    /// revision); tokens with no notes announce nothing.
    async fn clear_all_notes(
        &self,
        store: &NoteStore,
        token: &TokenSnapshot,
        owner: &StoreKey,
    ) -> Result<(), NoteError> {
        let notes = store.read(owner).await?;
        if notes.is_empty() {
            return Ok(());
        }

        let mut texts = Vec::with_capacity(notes.len());
        for note in &notes {
            match clean_note(&self.platform, token, note).await {
                Ok(()) => {}
                Err(err @ NoteError::MissingHandler { .. }) => {
                    self.platform.notifier.warn(&err.to_string());
                }
                Err(err) => return Err(err),
            }
            texts.push(note.text.clone());
        }

        store.write(owner, &[]).await?;
        self.platform
            .notifier
            .announce(&format!(
                "{}: combat ended, removed {}",
                token.name,
                texts.join(", ")
            ))
            .await;
        Ok(())
    }
}
