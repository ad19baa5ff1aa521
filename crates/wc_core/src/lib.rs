//! Foundational types shared by the worldcache crates: coordinates and
//! cells, ids, phases, conditions, and the static-data collaborator traits.

pub mod condition;
pub mod coords;
pub mod ids;
pub mod phase;
pub mod reference;
pub mod zone;

pub use condition::{
    Condition, ConditionEvaluator, ConditionSource, ContextObject, StandardConditionEvaluator,
};
pub use coords::{CellCoord, Position, WorldLocation};
pub use ids::{Difficulty, SpawnKind, Team};
pub use phase::{PhaseShift, PhaseUseFlags, PhaseVisibility};
pub use reference::{
    AreaBounds, AreaEntry, CorpseEntrance, MapEntry, PhaseEntry, ReferenceData,
    StaticReferenceData,
};
pub use zone::{ZoneHierarchy, UNKNOWN_ZONE};
