use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Number of grids along one axis of a map.
pub const MAX_NUMBER_OF_GRIDS: u32 = 64;
/// Side length of one grid, in world units.
pub const SIZE_OF_GRIDS: f32 = 533.333_3;
/// Number of cells along one axis of a grid.
pub const MAX_NUMBER_OF_CELLS: u32 = 8;
/// Side length of one cell, in world units.
pub const SIZE_OF_GRID_CELL: f32 = SIZE_OF_GRIDS / MAX_NUMBER_OF_CELLS as f32;
/// Number of cells along one axis of a map (512).
pub const TOTAL_NUMBER_OF_CELLS_PER_MAP: u32 = MAX_NUMBER_OF_GRIDS * MAX_NUMBER_OF_CELLS;

const CENTER_GRID_CELL_ID: u32 = TOTAL_NUMBER_OF_CELLS_PER_MAP / 2;
const CENTER_GRID_CELL_OFFSET: f32 = SIZE_OF_GRID_CELL / 2.0;

/// Side length of a whole map.
pub const MAP_SIZE: f32 = SIZE_OF_GRIDS * MAX_NUMBER_OF_GRIDS as f32;
pub const MAP_HALFSIZE: f32 = MAP_SIZE / 2.0;

/// A point in a map plus facing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    #[serde(default)]
    pub orientation: f32,
}

impl Position {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self {
            x,
            y,
            z,
            orientation: 0.0,
        }
    }

    pub fn with_orientation(mut self, orientation: f32) -> Self {
        self.orientation = orientation;
        self
    }

    pub fn as_vec3(&self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }

    pub fn as_vec2(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// Squared 3D distance; callers compare these directly and never take the root.
    pub fn distance_squared(&self, other: &Position) -> f32 {
        self.as_vec3().distance_squared(other.as_vec3())
    }

    /// Squared distance in the horizontal plane.
    pub fn distance_squared_2d(&self, x: f32, y: f32) -> f32 {
        self.as_vec2().distance_squared(Vec2::new(x, y))
    }

    /// Whether all coordinates lie inside the map bounds and the facing is finite.
    pub fn is_valid_map_coord(&self) -> bool {
        is_valid_map_coord(self.x)
            && is_valid_map_coord(self.y)
            && is_valid_map_coord(self.z)
            && self.orientation.is_finite()
    }
}

/// A position on a specific map.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldLocation {
    pub map_id: u32,
    pub position: Position,
}

impl WorldLocation {
    pub const fn new(map_id: u32, position: Position) -> Self {
        Self { map_id, position }
    }
}

/// Check a single axis against the playable map extent.
pub fn is_valid_map_coord(c: f32) -> bool {
    c.is_finite() && c.abs() <= MAP_HALFSIZE - 0.5
}

/// Cell-space coordinate of a map position.
#[derive(Clone, Copy, Hash, Eq, PartialEq, Debug)]
pub struct CellCoord {
    pub x: u32,
    pub y: u32,
}

impl CellCoord {
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Quantize a world position into its cell.
    pub fn from_xy(x: f32, y: f32) -> Self {
        Self {
            x: quantize_axis(x),
            y: quantize_axis(y),
        }
    }

    pub fn from_position(position: &Position) -> Self {
        Self::from_xy(position.x, position.y)
    }

    /// Flat cell id, unique within a map.
    pub const fn id(&self) -> u32 {
        self.y * TOTAL_NUMBER_OF_CELLS_PER_MAP + self.x
    }

    pub const fn from_id(id: u32) -> Self {
        Self {
            x: id % TOTAL_NUMBER_OF_CELLS_PER_MAP,
            y: id / TOTAL_NUMBER_OF_CELLS_PER_MAP,
        }
    }
}

fn quantize_axis(v: f32) -> u32 {
    let offset = (f64::from(v) - f64::from(CENTER_GRID_CELL_OFFSET)) / f64::from(SIZE_OF_GRID_CELL);
    let cell = (offset + f64::from(CENTER_GRID_CELL_ID) + 0.5).floor();
    cell.clamp(0.0, f64::from(TOTAL_NUMBER_OF_CELLS_PER_MAP - 1)) as u32
}
