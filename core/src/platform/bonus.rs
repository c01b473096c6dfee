//! Stat-bonus application paths
//!
//! The host exposes a fixed set of stat categories a modifier can target,
//! plus one resistance path per damage type. The lookup tables here are the
//! single mapping from the raw category names the dialog submits to the
//! typed targets the bonus sink understands; a miss is the
//! "unsupported modifier type" degradation path, not an abort.

use std::fmt;

use phf::{phf_map, phf_set};

/// Stat categories with a known bonus application path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatCategory {
    ArmorClass,
    Speed,
    Damage,
    SavingThrows,
    Attacks,
}

/// Raw category name (as submitted by the dialog) to application path.
static STAT_CATEGORIES: phf::Map<&'static str, StatCategory> = phf_map! {
    "AC" => StatCategory::ArmorClass,
    "Speed" => StatCategory::Speed,
    "Damage" => StatCategory::Damage,
    "Saving Throws" => StatCategory::SavingThrows,
    "Attacks" => StatCategory::Attacks,
};

/// Damage types with a resistance path in the host's actor schema.
static DAMAGE_TYPES: phf::Set<&'static str> = phf_set! {
    "acid",
    "cold",
    "fire",
    "force",
    "lightning",
    "necrotic",
    "poison",
    "psychic",
    "radiant",
    "thunder",
};

/// Resolve a requested stat category, or `None` when there is no known
/// application path.
pub fn resolve_stat_category(name: &str) -> Option<StatCategory> {
    STAT_CATEGORIES.get(name).copied()
}

/// Whether the host's actor schema has a resistance path for this damage
/// type. Matching is case-insensitive; stored damage types are lowercase.
pub fn is_known_damage_type(name: &str) -> bool {
    DAMAGE_TYPES.contains(name.to_ascii_lowercase().as_str())
}

/// A resolved bonus application path on an actor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BonusTarget {
    /// One of the fixed stat categories.
    Stat(StatCategory),
    /// The per-damage-type resistance path.
    Resistance(String),
}

impl fmt::Display for BonusTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BonusTarget::Stat(category) => write!(f, "{category:?}"),
            BonusTarget::Resistance(damage_type) => write!(f, "{damage_type} resistance"),
        }
    }
}

/// How a bonus entry was applied, and therefore how it must be removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BonusKind {
    /// Stacking entry; all additive entries sum.
    Additive,
    /// Priority-ranked entry; the best rank wins.
    Ranked,
}
