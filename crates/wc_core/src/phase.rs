use bitflags::bitflags;
use std::collections::BTreeSet;

bitflags! {
    /// How a spawn's phase assignment is interpreted.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct PhaseUseFlags: u8 {
        const ALWAYS_VISIBLE = 0b0000_0001;
        const INVERSE = 0b0000_0010;
    }
}

/// The set of phases an object currently sees, plus the terrain maps
/// those phases make visible.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PhaseShift {
    phases: BTreeSet<u32>,
    visible_map_ids: BTreeSet<u32>,
}

impl PhaseShift {
    /// An empty phase shift, used when no object context is available.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_phase(mut self, phase_id: u32) -> Self {
        self.phases.insert(phase_id);
        self
    }

    pub fn with_visible_map(mut self, map_id: u32) -> Self {
        self.visible_map_ids.insert(map_id);
        self
    }

    pub fn add_phase(&mut self, phase_id: u32) {
        self.phases.insert(phase_id);
    }

    pub fn add_visible_map(&mut self, map_id: u32) {
        self.visible_map_ids.insert(map_id);
    }

    pub fn has_phase(&self, phase_id: u32) -> bool {
        self.phases.contains(&phase_id)
    }

    pub fn has_visible_map_id(&self, map_id: u32) -> bool {
        self.visible_map_ids.contains(&map_id)
    }

    pub fn phases(&self) -> impl Iterator<Item = u32> + '_ {
        self.phases.iter().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.phases.is_empty() && self.visible_map_ids.is_empty()
    }
}

/// Phase metadata service.
pub trait PhaseVisibility {
    /// Whether the phase is unique to one player or group.
    fn is_personal_phase(&self, phase_id: u32) -> bool;
}
