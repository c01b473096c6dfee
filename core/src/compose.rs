//! Note submission flow
//!
//! The non-UI half of the tracking dialog: building the duration picker,
//! pre-filling the proto-note from the active combat, dispatching the
//! matching handler's `create`, and committing the result (plus any
//! requested deletions) to every selected token's store. The dialog itself
//! (markup, tabs, rendering) lives in the host.

use hashbrown::HashMap;
use tracing::debug;

use tracknotes_types::{
    DurationChoice, Note, NoteDuration, NoteId, NoteInput, ProtoNote,
};

use crate::combat::{CombatSnapshot, TokenSnapshot};
use crate::handlers::{clean_note, create_note};
use crate::notes::error::NoteError;
use crate::notes::store::{NoteStore, StoreKey, resolve_store_owner};
use crate::platform::{Platform, PlatformError};

/// One dialog submission: optionally a new note (input + chosen duration)
/// and any existing notes the user marked for deletion.
#[derive(Debug, Clone, Default)]
pub struct NoteSubmission {
    pub input: Option<NoteInput>,
    pub duration: Option<NoteDuration>,
    pub delete: Vec<NoteId>,
}

/// What a submission did: the created note (if any) and the ids actually
/// removed from at least one token.
#[derive(Debug, Clone, Default)]
pub struct SubmissionOutcome {
    pub created: Option<Note>,
    pub deleted: Vec<NoteId>,
}

/// The entries of the duration picker: the three fixed durations plus one
/// end-of-turn entry per combatant in the current encounter.
pub fn duration_choices(combat: Option<&CombatSnapshot>) -> Vec<DurationChoice> {
    let mut choices = vec![
        DurationChoice {
            duration: NoteDuration::Encounter,
            label: NoteDuration::Encounter.label(None),
        },
        DurationChoice {
            duration: NoteDuration::Round,
            label: NoteDuration::Round.label(None),
        },
        DurationChoice {
            duration: NoteDuration::SaveEnds,
            label: NoteDuration::SaveEnds.label(None),
        },
    ];
    if let Some(combat) = combat {
        for combatant in &combat.combatants {
            let duration = NoteDuration::EndOfTurn {
                combatant: combatant.id.clone(),
            };
            let label = duration.label(Some(&combatant.name));
            choices.push(DurationChoice { duration, label });
        }
    }
    choices
}

/// The duration the picker pre-selects: `SaveEnds` for ongoing damage,
/// otherwise end of the active combatant's turn. `None` outside combat.
pub fn default_duration(
    combat: Option<&CombatSnapshot>,
    input: &NoteInput,
) -> Option<NoteDuration> {
    if matches!(input, NoteInput::Ongoing { .. }) {
        return Some(NoteDuration::SaveEnds);
    }
    combat
        .and_then(|c| c.active.clone())
        .map(|combatant| NoteDuration::EndOfTurn { combatant })
}

/// Commit one dialog submission against every selected token.
///
/// The new note (when input and duration are both present) is created once,
/// with side effects landing on every target through the handler, and is
/// appended to each token's collection. Deletions clean each note's side effects per
/// token before dropping it. Store keys shared by linked tokens are written
/// once.
pub async fn submit(
    platform: &Platform,
    combat: Option<&CombatSnapshot>,
    targets: &[TokenSnapshot],
    submission: NoteSubmission,
) -> Result<SubmissionOutcome, NoteError> {
    let created = match (&submission.input, &submission.duration) {
        (Some(input), Some(duration)) => {
            let proto = ProtoNote {
                id: NoteId::fresh(),
                duration: duration.clone(),
                round: combat.map(|c| c.round).unwrap_or(0),
                turn: combat.map(|c| c.turn).unwrap_or(0),
            };
            Some(create_note(platform, input, proto, targets, combat).await?)
        }
        _ => None,
    };

    let store = NoteStore::new(platform);
    let mut deleted: Vec<NoteId> = Vec::new();
    let mut visited: hashbrown::HashSet<StoreKey> = hashbrown::HashSet::new();

    for token in targets {
        let owner = resolve_store_owner(token);
        if !visited.insert(owner.clone()) {
            continue;
        }
        let notes = store.read(&owner).await?;
        let mut kept = Vec::with_capacity(notes.len() + 1);

        for note in notes {
            if !submission.delete.contains(&note.id) {
                kept.push(note);
                continue;
            }
            // User-initiated deletion is unconditional; a missing handler
            // only costs the side-effect cleanup.
            match clean_note(platform, token, &note).await {
                Ok(()) => {}
                Err(err @ NoteError::MissingHandler { .. }) => {
                    platform.notifier.warn(&err.to_string());
                }
                Err(err) => return Err(err),
            }
            if !deleted.contains(&note.id) {
                deleted.push(note.id.clone());
            }
        }

        if let Some(note) = &created {
            kept.push(note.clone());
        }
        store.write(&owner, &kept).await?;
    }

    debug!(
        created = created.as_ref().map(|n| n.id.as_str()),
        deleted = deleted.len(),
        "submission committed"
    );
    Ok(SubmissionOutcome { created, deleted })
}

/// The notes shown when several tokens are selected at once: notes on the
/// first token that every other token also carries, matched by content
/// (text + duration). Lifecycle decisions never use this matching.
pub async fn shared_notes(
    platform: &Platform,
    targets: &[TokenSnapshot],
) -> Result<Vec<Note>, PlatformError> {
    let Some(first) = targets.first() else {
        return Ok(Vec::new());
    };
    let store = NoteStore::new(platform);

    let mut by_owner: HashMap<StoreKey, Vec<Note>> = HashMap::new();
    for token in targets {
        let owner = resolve_store_owner(token);
        if !by_owner.contains_key(&owner) {
            let notes = store.read(&owner).await?;
            by_owner.insert(owner, notes);
        }
    }

    let primary_owner = resolve_store_owner(first);
    let primary = by_owner.get(&primary_owner).cloned().unwrap_or_default();

    Ok(primary
        .into_iter()
        .filter(|note| {
            targets.iter().skip(1).all(|token| {
                by_owner
                    .get(&resolve_store_owner(token))
                    .is_some_and(|notes| notes.iter().any(|other| other.same_content(note)))
            })
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notes::store::StoreKey;
    use crate::testutil::{make_combat, make_combatant, make_note, make_token, test_host};
    use tracknotes_types::{NoteKind, TokenId};

    fn condition_input(condition: &str) -> NoteInput {
        NoteInput::Condition {
            condition: Some(condition.to_string()),
            second: None,
        }
    }

    #[test]
    fn duration_picker_lists_one_entry_per_combatant() {
        let combat = make_combat(
            1,
            0,
            Some("c1"),
            vec![make_combatant("c1", None), make_combatant("c2", None)],
        );
        let choices = duration_choices(Some(&combat));

        let labels: Vec<&str> = choices.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, vec!["Encounter", "Round", "Save Ends", "EoT c1", "EoT c2"]);

        // Outside combat only the fixed entries remain.
        assert_eq!(duration_choices(None).len(), 3);
    }

    #[test]
    fn default_duration_tracks_the_input_kind() {
        let combat = make_combat(2, 1, Some("c1"), vec![make_combatant("c1", None)]);
        let ongoing = NoteInput::Ongoing {
            damage_type: Some("fire".to_string()),
            amount: Some("2d6".to_string()),
        };

        assert_eq!(
            default_duration(Some(&combat), &ongoing),
            Some(NoteDuration::SaveEnds)
        );
        assert_eq!(
            default_duration(Some(&combat), &condition_input("Dazed")),
            Some(NoteDuration::EndOfTurn {
                combatant: tracknotes_types::CombatantId::new("c1"),
            })
        );
        assert_eq!(default_duration(None, &condition_input("Dazed")), None);
    }

    #[tokio::test]
    async fn submission_creates_one_note_across_all_targets() {
        let host = test_host(&[]);
        let combat = make_combat(2, 1, Some("c1"), vec![make_combatant("c1", None)]);
        let targets = [
            make_token("t1", Some("a1"), false),
            make_token("t2", Some("a2"), false),
        ];

        let outcome = submit(
            &host.platform,
            Some(&combat),
            &targets,
            NoteSubmission {
                input: Some(condition_input("Dazed")),
                duration: Some(NoteDuration::Round),
                delete: Vec::new(),
            },
        )
        .await
        .unwrap();

        let created = outcome.created.unwrap();
        assert_eq!(created.round, 2);
        assert_eq!(created.turn, 1);

        // The same note record lands in both collections.
        for token in ["t1", "t2"] {
            let notes = host.store.notes(&StoreKey::Token(TokenId::new(token)));
            assert_eq!(notes, vec![created.clone()]);
        }
        // And its side effect hit both actors, tagged with the one id.
        let markers = host.conditions.markers();
        assert_eq!(markers.len(), 2);
        assert!(markers.iter().all(|(_, _, tag)| tag == &created.id));
    }

    #[tokio::test]
    async fn deletion_cleans_side_effects_and_drops_the_note() {
        let host = test_host(&[]);
        let token = make_token("t1", Some("a1"), false);
        let owner = StoreKey::Token(TokenId::new("t1"));
        let doomed = Note {
            id: NoteId::new("n1"),
            kind: NoteKind::Condition {
                condition: "Dazed".to_string(),
                second: None,
            },
            text: "Dazed".to_string(),
            duration: NoteDuration::Encounter,
            round: 1,
            turn: 0,
        };
        let kept = make_note("n2", NoteDuration::Encounter, 1, 0);
        host.store.seed_notes(&owner, &[doomed.clone(), kept.clone()]);

        let outcome = submit(
            &host.platform,
            None,
            &[token],
            NoteSubmission {
                delete: vec![doomed.id.clone()],
                ..NoteSubmission::default()
            },
        )
        .await
        .unwrap();

        assert!(outcome.created.is_none());
        assert_eq!(outcome.deleted, vec![doomed.id]);
        assert_eq!(host.store.notes(&owner), vec![kept]);
        assert_eq!(host.conditions.removal_calls(), 1);
    }

    #[tokio::test]
    async fn deleting_an_unknown_kind_warns_but_still_removes_it() {
        let host = test_host(&[]);
        let token = make_token("t1", Some("a1"), false);
        let owner = StoreKey::Token(TokenId::new("t1"));
        let stale = Note {
            id: NoteId::new("n1"),
            kind: NoteKind::Unknown,
            text: "Aura 2".to_string(),
            duration: NoteDuration::Encounter,
            round: 1,
            turn: 0,
        };
        host.store.seed_notes(&owner, &[stale.clone()]);

        let outcome = submit(
            &host.platform,
            None,
            &[token],
            NoteSubmission {
                delete: vec![stale.id.clone()],
                ..NoteSubmission::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(outcome.deleted, vec![stale.id]);
        assert!(host.store.notes(&owner).is_empty());
        assert_eq!(host.notifier.warnings().len(), 1);
    }

    #[tokio::test]
    async fn linked_targets_sharing_an_actor_are_written_once() {
        let host = test_host(&[]);
        let targets = [
            make_token("t1", Some("a1"), true),
            make_token("t2", Some("a1"), true),
        ];

        let outcome = submit(
            &host.platform,
            None,
            &targets,
            NoteSubmission {
                input: Some(condition_input("Dazed")),
                duration: Some(NoteDuration::Encounter),
                delete: Vec::new(),
            },
        )
        .await
        .unwrap();

        let owner = StoreKey::Actor(tracknotes_types::ActorId::new("a1"));
        let notes = host.store.notes(&owner);
        // One write, one stored copy, even though both tokens were selected.
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].id, outcome.created.unwrap().id);
    }

    #[tokio::test]
    async fn shared_view_matches_notes_by_content() {
        let host = test_host(&[]);
        let targets = [
            make_token("t1", Some("a1"), false),
            make_token("t2", Some("a2"), false),
        ];
        let everywhere_a = make_note("shared", NoteDuration::Encounter, 1, 0);
        let mut everywhere_b = everywhere_a.clone();
        everywhere_b.id = NoteId::new("shared-b");
        let only_here = make_note("solo", NoteDuration::Encounter, 1, 0);
        host.store.seed_notes(
            &StoreKey::Token(TokenId::new("t1")),
            &[everywhere_a.clone(), only_here],
        );
        host.store
            .seed_notes(&StoreKey::Token(TokenId::new("t2")), &[everywhere_b]);

        let shared = shared_notes(&host.platform, &targets).await.unwrap();
        // Matched by text + duration, not by id.
        assert_eq!(shared, vec![everywhere_a]);

        assert!(shared_notes(&host.platform, &[]).await.unwrap().is_empty());
    }
}
