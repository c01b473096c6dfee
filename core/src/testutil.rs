//! Test doubles for the host platform
//!
//! In-memory store, recording sinks, scripted dice, and snapshot builders
//! shared by the handler, router, and store tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use hashbrown::HashMap;
use serde_json::Value;

use tracknotes_types::{ActorId, CombatantId, Note, NoteDuration, NoteId, NoteKind, TokenId};

use crate::combat::{CombatSnapshot, CombatantSnapshot, TokenSnapshot};
use crate::notes::store::StoreKey;
use crate::platform::bonus::{BonusKind, BonusTarget};
use crate::platform::roll::RollExpr;
use crate::platform::{
    DiceRoller, Notifier, Platform, PlatformError, StatBonusSink, StatusSink, TrackingStore,
};

// ═══════════════════════════════════════════════════════════════════════════
// Platform doubles
// ═══════════════════════════════════════════════════════════════════════════

/// In-memory flag storage keyed like the host's document store.
#[derive(Default)]
pub struct MemoryStore {
    data: Mutex<HashMap<StoreKey, Value>>,
}

impl MemoryStore {
    /// Seed a raw payload, well-formed or not.
    pub fn seed_raw(&self, owner: &StoreKey, value: Value) {
        self.data.lock().unwrap().insert(owner.clone(), value);
    }

    pub fn seed_notes(&self, owner: &StoreKey, notes: &[Note]) {
        self.seed_raw(owner, serde_json::to_value(notes).unwrap());
    }

    /// Parsed view of what is currently stored under `owner`.
    pub fn notes(&self, owner: &StoreKey) -> Vec<Note> {
        self.data
            .lock()
            .unwrap()
            .get(owner)
            .map(|v| serde_json::from_value(v.clone()).unwrap())
            .unwrap_or_default()
    }
}

#[async_trait]
impl TrackingStore for MemoryStore {
    async fn read(&self, owner: &StoreKey) -> Result<Option<Value>, PlatformError> {
        Ok(self.data.lock().unwrap().get(owner).cloned())
    }

    async fn write(&self, owner: &StoreKey, notes: &[Note]) -> Result<(), PlatformError> {
        self.seed_notes(owner, notes);
        Ok(())
    }
}

/// Records applied status markers and honours id-tagged removal the way the
/// host does: every marker with the matching tag goes, others stay.
#[derive(Default)]
pub struct RecordingStatusSink {
    markers: Mutex<Vec<(ActorId, String, NoteId)>>,
    removals: Mutex<Vec<(ActorId, NoteId)>>,
}

impl RecordingStatusSink {
    pub fn markers(&self) -> Vec<(ActorId, String, NoteId)> {
        self.markers.lock().unwrap().clone()
    }

    pub fn removal_calls(&self) -> usize {
        self.removals.lock().unwrap().len()
    }
}

#[async_trait]
impl StatusSink for RecordingStatusSink {
    async fn apply(
        &self,
        actor: &ActorId,
        condition: &str,
        correlation: &NoteId,
    ) -> Result<(), PlatformError> {
        self.markers
            .lock()
            .unwrap()
            .push((actor.clone(), condition.to_string(), correlation.clone()));
        Ok(())
    }

    async fn remove(&self, actor: &ActorId, correlation: &NoteId) -> Result<(), PlatformError> {
        self.removals
            .lock()
            .unwrap()
            .push((actor.clone(), correlation.clone()));
        self.markers
            .lock()
            .unwrap()
            .retain(|(a, _, c)| !(a == actor && c == correlation));
        Ok(())
    }
}

/// One applied bonus entry, as the host would store it.
#[derive(Debug, Clone, PartialEq)]
pub struct BonusEntry {
    pub actor: ActorId,
    pub target: BonusTarget,
    pub kind: BonusKind,
    pub value: i32,
    pub priority: Option<i32>,
    pub label: String,
    pub correlation: NoteId,
}

#[derive(Default)]
pub struct RecordingBonusSink {
    entries: Mutex<Vec<BonusEntry>>,
}

impl RecordingBonusSink {
    pub fn entries(&self) -> Vec<BonusEntry> {
        self.entries.lock().unwrap().clone()
    }
}

#[async_trait]
impl StatBonusSink for RecordingBonusSink {
    async fn apply_additive(
        &self,
        actor: &ActorId,
        target: &BonusTarget,
        value: i32,
        label: &str,
        correlation: &NoteId,
    ) -> Result<(), PlatformError> {
        self.entries.lock().unwrap().push(BonusEntry {
            actor: actor.clone(),
            target: target.clone(),
            kind: BonusKind::Additive,
            value,
            priority: None,
            label: label.to_string(),
            correlation: correlation.clone(),
        });
        Ok(())
    }

    async fn apply_ranked(
        &self,
        actor: &ActorId,
        target: &BonusTarget,
        value: i32,
        priority: i32,
        label: &str,
        correlation: &NoteId,
    ) -> Result<(), PlatformError> {
        self.entries.lock().unwrap().push(BonusEntry {
            actor: actor.clone(),
            target: target.clone(),
            kind: BonusKind::Ranked,
            value,
            priority: Some(priority),
            label: label.to_string(),
            correlation: correlation.clone(),
        });
        Ok(())
    }

    async fn remove(
        &self,
        actor: &ActorId,
        target: &BonusTarget,
        kind: BonusKind,
        correlation: &NoteId,
    ) -> Result<(), PlatformError> {
        self.entries.lock().unwrap().retain(|e| {
            !(e.actor == *actor
                && e.target == *target
                && e.kind == kind
                && e.correlation == *correlation)
        });
        Ok(())
    }
}

/// Returns scripted totals in order and records every expression rolled.
#[derive(Default)]
pub struct ScriptedRoller {
    rolls: Mutex<VecDeque<i32>>,
    log: Mutex<Vec<String>>,
}

impl ScriptedRoller {
    pub fn new(rolls: &[i32]) -> Self {
        Self {
            rolls: Mutex::new(rolls.iter().copied().collect()),
            log: Mutex::new(Vec::new()),
        }
    }

    /// Every expression rolled so far, formatted.
    pub fn rolled(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }
}

#[async_trait]
impl DiceRoller for ScriptedRoller {
    async fn roll(&self, expr: &RollExpr) -> Result<i32, PlatformError> {
        self.log.lock().unwrap().push(expr.to_string());
        self.rolls
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| PlatformError::Roll {
                expr: expr.to_string(),
                reason: "roll script exhausted".to_string(),
            })
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    announced: Mutex<Vec<String>>,
    warned: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn announcements(&self) -> Vec<String> {
        self.announced.lock().unwrap().clone()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.warned.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn announce(&self, message: &str) {
        self.announced.lock().unwrap().push(message.to_string());
    }

    fn warn(&self, message: &str) {
        self.warned.lock().unwrap().push(message.to_string());
    }
}

/// The full double set plus the bundled [`Platform`] handed to the engine.
pub struct TestHost {
    pub store: Arc<MemoryStore>,
    pub conditions: Arc<RecordingStatusSink>,
    pub bonuses: Arc<RecordingBonusSink>,
    pub dice: Arc<ScriptedRoller>,
    pub notifier: Arc<RecordingNotifier>,
    pub platform: Platform,
}

pub fn test_host(rolls: &[i32]) -> TestHost {
    let store = Arc::new(MemoryStore::default());
    let conditions = Arc::new(RecordingStatusSink::default());
    let bonuses = Arc::new(RecordingBonusSink::default());
    let dice = Arc::new(ScriptedRoller::new(rolls));
    let notifier = Arc::new(RecordingNotifier::default());
    let platform = Platform {
        store: store.clone(),
        conditions: conditions.clone(),
        bonuses: bonuses.clone(),
        dice: dice.clone(),
        notifier: notifier.clone(),
    };
    TestHost {
        store,
        conditions,
        bonuses,
        dice,
        notifier,
        platform,
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Snapshot and note builders
// ═══════════════════════════════════════════════════════════════════════════

/// Unlinked-by-default token; name doubles as the id.
pub fn make_token(id: &str, actor: Option<&str>, linked: bool) -> TokenSnapshot {
    TokenSnapshot {
        id: TokenId::new(id),
        name: id.to_string(),
        actor: actor.map(ActorId::new),
        linked,
        save_bonus: 0,
        ability_mods: HashMap::new(),
    }
}

/// Manual note whose text is its id; duration and anchor as given.
pub fn make_note(id: &str, duration: NoteDuration, round: u32, turn: u32) -> Note {
    Note {
        id: NoteId::new(id),
        kind: NoteKind::Manual,
        text: id.to_string(),
        duration,
        round,
        turn,
    }
}

pub fn make_combatant(id: &str, token: Option<TokenSnapshot>) -> CombatantSnapshot {
    CombatantSnapshot {
        id: CombatantId::new(id),
        name: id.to_string(),
        token,
    }
}

pub fn make_combat(
    round: u32,
    turn: u32,
    active: Option<&str>,
    combatants: Vec<CombatantSnapshot>,
) -> CombatSnapshot {
    CombatSnapshot {
        round,
        turn,
        active: active.map(CombatantId::new),
        combatants,
    }
}
