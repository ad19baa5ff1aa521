//! Conditions attached to world content and the evaluator seam.

use bevy::log::debug;

use crate::ids::Team;
use crate::phase::PhaseShift;

/// Stored condition type id for a faction restriction.
pub const CONDITION_TYPE_TEAM: u32 = 6;
/// Stored condition type id for a phase requirement.
pub const CONDITION_TYPE_PHASE: u32 = 26;

/// A single requirement attached to a piece of content.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Condition {
    /// Object must belong to this faction.
    Team(Team),
    /// Object must see this phase.
    Phase(u32),
    /// Any other condition type; only an external evaluator understands it.
    Other { kind: u32, value1: u32, value2: u32 },
}

impl Condition {
    /// Build from a stored row. Returns `None` for a team condition with an unknown faction id.
    pub fn from_row(kind: u32, value1: u32, value2: u32) -> Option<Self> {
        match kind {
            CONDITION_TYPE_TEAM => Team::from_id(value1).map(Self::Team),
            CONDITION_TYPE_PHASE => Some(Self::Phase(value1)),
            _ => Some(Self::Other {
                kind,
                value1,
                value2,
            }),
        }
    }

    /// Inverse of [`Condition::from_row`].
    pub fn to_row(&self) -> (u32, u32, u32) {
        match self {
            Self::Team(team) => (CONDITION_TYPE_TEAM, team.id(), 0),
            Self::Phase(phase) => (CONDITION_TYPE_PHASE, *phase, 0),
            Self::Other {
                kind,
                value1,
                value2,
            } => (*kind, *value1, *value2),
        }
    }
}

/// A live world object that conditions are evaluated against.
pub trait ContextObject {
    fn phase_shift(&self) -> &PhaseShift;
    fn team(&self) -> Option<Team>;
}

/// The object side of a condition check.
#[derive(Clone, Copy)]
pub struct ConditionSource<'a> {
    object: &'a dyn ContextObject,
}

impl<'a> ConditionSource<'a> {
    pub fn new(object: &'a dyn ContextObject) -> Self {
        Self { object }
    }

    pub fn object(&self) -> &'a dyn ContextObject {
        self.object
    }
}

/// Decides whether a source satisfies a list of conditions.
pub trait ConditionEvaluator {
    fn meets(&self, source: &ConditionSource<'_>, conditions: &[Condition]) -> bool;
}

/// Evaluator for the condition types this workspace knows about.
/// Unknown types fail closed.
#[derive(Clone, Copy, Debug, Default)]
pub struct StandardConditionEvaluator;

impl ConditionEvaluator for StandardConditionEvaluator {
    fn meets(&self, source: &ConditionSource<'_>, conditions: &[Condition]) -> bool {
        conditions.iter().all(|condition| match condition {
            Condition::Team(team) => source.object().team() == Some(*team),
            Condition::Phase(phase) => source.object().phase_shift().has_phase(*phase),
            Condition::Other { kind, .. } => {
                debug!("condition type {} is not evaluated locally, treating as unmet", kind);
                false
            }
        })
    }
}
