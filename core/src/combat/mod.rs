//! Combat-side view of the engine
//!
//! Read-only snapshots of the encounter supplied by the host, and the event
//! router that reacts to round/turn/deletion events by expiring notes.

pub mod router;
pub mod snapshot;


pub use router::CombatEventRouter;
pub use snapshot::{CombatSnapshot, CombatantSnapshot, TokenSnapshot, TurnMarker};
