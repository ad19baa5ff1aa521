use serde::{Deserialize, Serialize};

/// Content variant a spawn can exist under.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Difficulty(pub u8);

impl Difficulty {
    pub const NONE: Self = Self(0);
    pub const NORMAL: Self = Self(1);
    pub const HEROIC: Self = Self(2);
    pub const RAID_10_NORMAL: Self = Self(3);
    pub const RAID_25_NORMAL: Self = Self(4);
    pub const MYTHIC: Self = Self(23);
}

/// Player faction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Team {
    Alliance,
    Horde,
}

impl Team {
    /// Faction id used by stored condition rows.
    pub const fn id(&self) -> u32 {
        match self {
            Self::Alliance => 469,
            Self::Horde => 67,
        }
    }

    pub const fn from_id(id: u32) -> Option<Self> {
        match id {
            469 => Some(Self::Alliance),
            67 => Some(Self::Horde),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Alliance => "Alliance",
            Self::Horde => "Horde",
        }
    }
}

/// Entity kinds that have persistent spawn records.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SpawnKind {
    Creature,
    GameObject,
    AreaTrigger,
}

impl SpawnKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Creature => "creature",
            Self::GameObject => "gameobject",
            Self::AreaTrigger => "areatrigger",
        }
    }

    pub fn all() -> &'static [SpawnKind] {
        &[Self::Creature, Self::GameObject, Self::AreaTrigger]
    }
}
