//! Cell-partitioned index of spawn ids.
//!
//! Buckets are keyed by map and difficulty, plus the phase for spawns in a
//! personal phase, and subdivided into cells. All buckets live in one flat
//! map under a composite key.

use std::collections::{BTreeSet, HashMap};
use wc_core::{Difficulty, PhaseVisibility, SpawnKind};

use crate::data::{SpawnData, SpawnKey};

/// Composite key of one cell bucket.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GridKey {
    pub map_id: u32,
    pub difficulty: Difficulty,
    /// Set only for personally-phased content.
    pub phase_id: Option<u32>,
    pub cell_id: u32,
}

/// Spawn ids occupying one cell.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CellObjectGuids {
    pub creatures: BTreeSet<u64>,
    pub game_objects: BTreeSet<u64>,
}

impl CellObjectGuids {
    pub const fn new() -> Self {
        Self {
            creatures: BTreeSet::new(),
            game_objects: BTreeSet::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.creatures.is_empty() && self.game_objects.is_empty()
    }

    pub fn contains(&self, key: SpawnKey) -> bool {
        match key.kind {
            SpawnKind::Creature => self.creatures.contains(&key.id),
            SpawnKind::GameObject => self.game_objects.contains(&key.id),
            SpawnKind::AreaTrigger => false,
        }
    }

    fn set_for(&mut self, kind: SpawnKind) -> Option<&mut BTreeSet<u64>> {
        match kind {
            SpawnKind::Creature => Some(&mut self.creatures),
            SpawnKind::GameObject => Some(&mut self.game_objects),
            SpawnKind::AreaTrigger => None,
        }
    }
}

static EMPTY_CELL: CellObjectGuids = CellObjectGuids::new();

/// Whether a spawn kind is tracked by the cell index.
pub fn is_grid_indexed(kind: SpawnKind) -> bool {
    matches!(kind, SpawnKind::Creature | SpawnKind::GameObject)
}

#[derive(Clone, Debug, Default)]
pub struct GridIndex {
    cells: HashMap<GridKey, CellObjectGuids>,
    /// Keys each spawn was written under, so removal never depends on the
    /// current state of the spawn record.
    placements: HashMap<SpawnKey, Vec<GridKey>>,
}

impl GridIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a spawn under every one of its difficulties. Re-inserting a spawn
    /// first drops its previous placement. Returns `false` for kinds that
    /// are not cell-indexed.
    pub fn insert(&mut self, spawn: &SpawnData, phases: &dyn PhaseVisibility) -> bool {
        let key = spawn.key();
        if !is_grid_indexed(key.kind) {
            return false;
        }
        self.remove(key);

        let phase_id = (spawn.meta.phase_id != 0 && phases.is_personal_phase(spawn.meta.phase_id))
            .then_some(spawn.meta.phase_id);
        let cell_id = spawn.cell().id();

        let mut written = Vec::with_capacity(spawn.spawn_difficulties.len());
        for &difficulty in &spawn.spawn_difficulties {
            let grid_key = GridKey {
                map_id: spawn.meta.map_id,
                difficulty,
                phase_id,
                cell_id,
            };
            if let Some(set) = self.cells.entry(grid_key).or_default().set_for(key.kind) {
                set.insert(key.id);
            }
            written.push(grid_key);
        }

        self.placements.insert(key, written);
        true
    }

    /// Remove a spawn from every bucket it was inserted into. Unknown spawns are a no-op.
    pub fn remove(&mut self, key: SpawnKey) -> bool {
        let Some(written) = self.placements.remove(&key) else {
            return false;
        };

        for grid_key in written {
            let Some(cell) = self.cells.get_mut(&grid_key) else {
                continue;
            };
            if let Some(set) = cell.set_for(key.kind) {
                set.remove(&key.id);
            }
            if cell.is_empty() {
                self.cells.remove(&grid_key);
            }
        }
        true
    }

    /// Spawns in a cell of a shared (non-personal) bucket.
    pub fn lookup(&self, map_id: u32, difficulty: Difficulty, cell_id: u32) -> &CellObjectGuids {
        self.get(GridKey {
            map_id,
            difficulty,
            phase_id: None,
            cell_id,
        })
    }

    /// Spawns in a cell of a personal-phase bucket.
    pub fn lookup_personal(
        &self,
        map_id: u32,
        difficulty: Difficulty,
        phase_id: u32,
        cell_id: u32,
    ) -> &CellObjectGuids {
        self.get(GridKey {
            map_id,
            difficulty,
            phase_id: Some(phase_id),
            cell_id,
        })
    }

    pub fn get(&self, key: GridKey) -> &CellObjectGuids {
        self.cells.get(&key).unwrap_or(&EMPTY_CELL)
    }

    pub fn is_placed(&self, key: SpawnKey) -> bool {
        self.placements.contains_key(&key)
    }

    /// Number of non-empty cell buckets.
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn placed_count(&self) -> usize {
        self.placements.len()
    }

    pub fn clear(&mut self) {
        self.cells.clear();
        self.placements.clear();
    }
}
