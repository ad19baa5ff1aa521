use crate::phase::PhaseShift;

/// Zone id returned when a position cannot be attributed to any zone.
pub const UNKNOWN_ZONE: u32 = 0;

/// Geographic subdivision lookup.
pub trait ZoneHierarchy {
    /// Zone containing the position, or [`UNKNOWN_ZONE`].
    fn zone_id(&self, phase: &PhaseShift, map_id: u32, x: f32, y: f32, z: f32) -> u32;

    /// Parent area of a zone, if it has one.
    fn parent_area(&self, zone_id: u32) -> Option<u32>;
}
