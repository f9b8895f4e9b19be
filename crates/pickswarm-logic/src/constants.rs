//! Warehouse constants: cell types, item sizes, weight classes, timings.
//!
//! The unit-cost and level-limit tables live here as plain functions so
//! that storage locations and picker loads enforce the same numbers.

use serde::{Deserialize, Serialize};

/// Capacity of one storage location, in small-item units.
pub const STORAGE_UNITS: u32 = 4;

/// Capacity of one picker's load, in small-item units.
pub const LOAD_UNITS: u32 = 4;

pub mod timing {
    /// Base time for a picker to advance one cell.
    pub const MOVE_QUANTUM: f64 = 1.0;
    /// Extra time per cell for every carried load unit.
    pub const LOAD_PENALTY_PER_UNIT: f64 = 0.1;
    /// How long a picker waits on a blocked cell before forcing a replan.
    pub const WAIT_TIMEOUT: f64 = 5.0;
    /// Dwell time at the exit before a drop-off or completion.
    pub const EXIT_DWELL: f64 = 2.0;
    /// Default simulation step.
    pub const TIME_STEP: f64 = 0.1;
}

/// How many upcoming path cells of each peer a congestion-avoidance
/// replan treats as blocked.
pub const CONGESTION_LOOKAHEAD: usize = 3;

/// Classification of a single floor cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellType {
    Aisle,
    Shelf,
    Hallway,
    CrossAisle,
    Entrance,
    Exit,
    Wall,
}

impl CellType {
    /// Whether pickers may stand on or pass through this cell.
    pub fn is_walkable(self) -> bool {
        matches!(
            self,
            CellType::Aisle
                | CellType::Hallway
                | CellType::CrossAisle
                | CellType::Entrance
                | CellType::Exit
        )
    }

    /// Glyph used by ASCII floor maps.
    pub fn glyph(self) -> char {
        match self {
            CellType::Wall => '#',
            CellType::Shelf => 'S',
            CellType::Aisle => '.',
            CellType::Hallway => '=',
            CellType::CrossAisle => '+',
            CellType::Entrance => 'E',
            CellType::Exit => 'X',
        }
    }

    /// Inverse of [`CellType::glyph`].
    pub fn from_glyph(glyph: char) -> Option<Self> {
        match glyph {
            '#' => Some(CellType::Wall),
            'S' => Some(CellType::Shelf),
            '.' => Some(CellType::Aisle),
            '=' => Some(CellType::Hallway),
            '+' => Some(CellType::CrossAisle),
            'E' => Some(CellType::Entrance),
            'X' => Some(CellType::Exit),
            _ => None,
        }
    }
}

/// Item size category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemSize {
    Small,
    Medium,
    Large,
}

impl ItemSize {
    pub const ALL: [ItemSize; 3] = [ItemSize::Small, ItemSize::Medium, ItemSize::Large];

    /// Capacity consumed by one item of this size (small=1, medium=2, large=4).
    pub fn unit_cost(self) -> u32 {
        match self {
            ItemSize::Small => 1,
            ItemSize::Medium => 2,
            ItemSize::Large => 4,
        }
    }
}

/// Item weight class, which limits how high it may be shelved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightClass {
    Light,
    Medium,
    Heavy,
}

impl WeightClass {
    pub const ALL: [WeightClass; 3] = [WeightClass::Light, WeightClass::Medium, WeightClass::Heavy];

    /// Highest shelf level (1-based) this weight class may occupy, or `None`
    /// if any level is allowed.
    pub fn max_level(self) -> Option<u8> {
        match self {
            WeightClass::Heavy => Some(1),
            WeightClass::Medium => Some(2),
            WeightClass::Light => None,
        }
    }

    /// Whether an item of this class may be stored on `level`.
    pub fn allows_level(self, level: u8) -> bool {
        level >= 1 && self.max_level().map_or(true, |max| level <= max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_CELLS: [CellType; 7] = [
        CellType::Aisle,
        CellType::Shelf,
        CellType::Hallway,
        CellType::CrossAisle,
        CellType::Entrance,
        CellType::Exit,
        CellType::Wall,
    ];

    #[test]
    fn test_walkable_subset() {
        let walkable: Vec<_> = ALL_CELLS.iter().filter(|c| c.is_walkable()).collect();
        assert_eq!(walkable.len(), 5);
        assert!(!CellType::Shelf.is_walkable());
        assert!(!CellType::Wall.is_walkable());
    }

    #[test]
    fn test_glyph_round_trip() {
        for cell in ALL_CELLS {
            assert_eq!(CellType::from_glyph(cell.glyph()), Some(cell));
        }
        assert_eq!(CellType::from_glyph('?'), None);
    }

    #[test]
    fn test_unit_costs() {
        assert_eq!(ItemSize::Small.unit_cost(), 1);
        assert_eq!(ItemSize::Medium.unit_cost(), 2);
        assert_eq!(ItemSize::Large.unit_cost(), 4);
        assert!(ItemSize::ALL.iter().all(|s| s.unit_cost() <= LOAD_UNITS));
    }

    #[test]
    fn test_weight_levels() {
        assert!(WeightClass::Heavy.allows_level(1));
        assert!(!WeightClass::Heavy.allows_level(2));
        assert!(WeightClass::Medium.allows_level(2));
        assert!(!WeightClass::Medium.allows_level(3));
        assert!(WeightClass::Light.allows_level(9));
        assert!(!WeightClass::Light.allows_level(0));
    }
}
