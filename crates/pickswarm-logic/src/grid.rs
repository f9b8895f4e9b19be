//! Warehouse floor grid: cell classification, landmarks and shelf storage.
//!
//! The floor is written once by [`GridBuilder`] (or parsed from an ASCII
//! map) and never changes cell types afterwards. Only the contents of the
//! storage locations mutate. Every query accepts arbitrary coordinates;
//! anything outside the floor reads as [`CellType::Wall`].
//!
//! The layout provider must guarantee that every walkable cell, including
//! the entrances and the exit, is reachable from every other walkable cell.
//! This is assumed here, not checked.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{CellType, ItemSize, WeightClass, STORAGE_UNITS};

/// A floor cell coordinate. Ordering is `x` then `y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn manhattan(self, other: Cell) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// 4-connected neighbors in N, S, E, W order (walkability not checked).
    pub fn adjacent(self) -> [Cell; 4] {
        [
            Cell::new(self.x, self.y + 1),
            Cell::new(self.x, self.y - 1),
            Cell::new(self.x + 1, self.y),
            Cell::new(self.x - 1, self.y),
        ]
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A shelf slot: floor cell plus 1-based level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Location {
    pub x: i32,
    pub y: i32,
    pub level: u8,
}

impl Location {
    pub const fn new(x: i32, y: i32, level: u8) -> Self {
        Self { x, y, level }
    }

    pub fn cell(self) -> Cell {
        Cell::new(self.x, self.y)
    }
}

/// An item sitting on a shelf.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredItem {
    pub id: String,
    pub size: ItemSize,
    pub weight: WeightClass,
}

/// One storage location and its contents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageLocation {
    location: Location,
    items: Vec<StoredItem>,
}

impl StorageLocation {
    pub fn new(location: Location) -> Self {
        Self {
            location,
            items: Vec::new(),
        }
    }

    pub fn location(&self) -> Location {
        self.location
    }

    pub fn items(&self) -> &[StoredItem] {
        &self.items
    }

    /// Units currently occupied.
    pub fn units_used(&self) -> u32 {
        self.items.iter().map(|i| i.size.unit_cost()).sum()
    }

    /// Whether `item` fits by both weight class and remaining units.
    pub fn can_store(&self, item: &StoredItem) -> bool {
        item.weight.allows_level(self.location.level)
            && self.units_used() + item.size.unit_cost() <= STORAGE_UNITS
    }

    pub fn add(&mut self, item: StoredItem) -> bool {
        if !self.can_store(&item) {
            return false;
        }
        self.items.push(item);
        true
    }

    pub fn remove(&mut self, item_id: &str) -> Option<StoredItem> {
        let index = self.items.iter().position(|i| i.id == item_id)?;
        Some(self.items.remove(index))
    }

    /// Fraction of the location's units in use (0.0 to 1.0).
    pub fn occupancy_rate(&self) -> f64 {
        self.units_used() as f64 / STORAGE_UNITS as f64
    }
}

/// Summary of a floor and its inventory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridStats {
    pub width: i32,
    pub depth: i32,
    pub levels: u8,
    pub shelf_cells: usize,
    pub walkable_cells: usize,
    pub storage_locations: usize,
    pub total_units: u32,
    pub used_units: u32,
    pub stored_items: usize,
    pub occupancy_rate: f64,
    pub entrances: usize,
}

/// Errors raised while building a grid.
#[derive(Debug, Clone, PartialEq)]
pub enum GridError {
    Empty,
    RaggedRow { row: usize, expected: usize, found: usize },
    UnknownGlyph { x: usize, y: usize, glyph: char },
    OutOfBounds(Cell),
    NoEntrance,
    NoExit,
    NotWalkable(Cell),
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GridError::Empty => write!(f, "floor map is empty"),
            GridError::RaggedRow {
                row,
                expected,
                found,
            } => write!(
                f,
                "row {} has {} cells, expected {}",
                row, found, expected
            ),
            GridError::UnknownGlyph { x, y, glyph } => {
                write!(f, "unknown glyph '{}' at ({}, {})", glyph, x, y)
            }
            GridError::OutOfBounds(cell) => write!(f, "cell {} is outside the floor", cell),
            GridError::NoEntrance => write!(f, "floor has no entrance"),
            GridError::NoExit => write!(f, "floor has no exit"),
            GridError::NotWalkable(cell) => write!(f, "landmark {} is not walkable", cell),
        }
    }
}

impl std::error::Error for GridError {}

/// Writes a floor plan cell by cell, then freezes it into a [`Grid`].
#[derive(Debug, Clone)]
pub struct GridBuilder {
    width: i32,
    depth: i32,
    levels: u8,
    cells: Vec<CellType>,
    entrances: Vec<Cell>,
    exit: Option<Cell>,
    out_of_bounds: Option<Cell>,
}

/// Number of cells on a `width` x `depth` floor, computed in `usize`.
fn cell_count(width: i32, depth: i32) -> usize {
    width.max(0) as usize * depth.max(0) as usize
}

impl GridBuilder {
    /// Start an all-wall floor.
    pub fn new(width: i32, depth: i32, levels: u8) -> Self {
        let width = width.max(0);
        let depth = depth.max(0);
        Self {
            width,
            depth,
            levels,
            cells: vec![CellType::Wall; cell_count(width, depth)],
            entrances: Vec::new(),
            exit: None,
            out_of_bounds: None,
        }
    }

    fn index(&self, cell: Cell) -> Option<usize> {
        if cell.x < 0 || cell.y < 0 || cell.x >= self.width || cell.y >= self.depth {
            return None;
        }
        Some(cell.y as usize * self.width as usize + cell.x as usize)
    }

    pub fn cell_type(&self, x: i32, y: i32) -> CellType {
        self.index(Cell::new(x, y))
            .map_or(CellType::Wall, |i| self.cells[i])
    }

    /// Set one cell. Out-of-bounds writes are reported by [`GridBuilder::build`].
    pub fn set(&mut self, x: i32, y: i32, cell_type: CellType) -> &mut Self {
        let cell = Cell::new(x, y);
        match self.index(cell) {
            Some(i) => self.cells[i] = cell_type,
            None => {
                self.out_of_bounds.get_or_insert(cell);
            }
        }
        self
    }

    /// Fill the half-open rectangle `[x0, x1) × [y0, y1)`, clipped to the floor.
    pub fn fill(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, cell_type: CellType) -> &mut Self {
        for y in y0.max(0)..y1.min(self.depth) {
            for x in x0.max(0)..x1.min(self.width) {
                self.set(x, y, cell_type);
            }
        }
        self
    }

    /// Mark `(x, y)` as an entrance landmark.
    pub fn entrance(&mut self, x: i32, y: i32) -> &mut Self {
        self.set(x, y, CellType::Entrance);
        self.entrances.push(Cell::new(x, y));
        self
    }

    /// Mark `(x, y)` as the exit landmark.
    pub fn exit(&mut self, x: i32, y: i32) -> &mut Self {
        self.set(x, y, CellType::Exit);
        self.exit = Some(Cell::new(x, y));
        self
    }

    pub fn build(&self) -> Result<Grid, GridError> {
        if self.width == 0 || self.depth == 0 {
            return Err(GridError::Empty);
        }
        if let Some(cell) = self.out_of_bounds {
            return Err(GridError::OutOfBounds(cell));
        }
        if self.entrances.is_empty() {
            return Err(GridError::NoEntrance);
        }
        let exit = self.exit.ok_or(GridError::NoExit)?;
        for &landmark in self.entrances.iter().chain(std::iter::once(&exit)) {
            if !self.cell_type(landmark.x, landmark.y).is_walkable() {
                return Err(GridError::NotWalkable(landmark));
            }
        }

        let mut storage = BTreeMap::new();
        for x in 0..self.width {
            for y in 0..self.depth {
                if self.cell_type(x, y) != CellType::Shelf {
                    continue;
                }
                for level in 1..=self.levels {
                    let location = Location::new(x, y, level);
                    storage.insert(location, StorageLocation::new(location));
                }
            }
        }

        Ok(Grid {
            width: self.width,
            depth: self.depth,
            levels: self.levels,
            cells: self.cells.clone(),
            entrances: self.entrances.clone(),
            exit,
            storage,
        })
    }
}

/// The warehouse floor: immutable cell types plus mutable shelf storage.
#[derive(Debug, Clone)]
pub struct Grid {
    width: i32,
    depth: i32,
    levels: u8,
    cells: Vec<CellType>,
    entrances: Vec<Cell>,
    exit: Cell,
    storage: BTreeMap<Location, StorageLocation>,
}

impl Grid {
    /// Parse an ASCII floor map, one string per row (`y` grows downwards).
    ///
    /// Glyphs: `#` wall, `S` shelf, `.` aisle, `=` hallway, `+` cross-aisle,
    /// `E` entrance, `X` exit. Every `E` becomes an entrance landmark in
    /// reading order; the first `X` becomes the exit landmark.
    pub fn from_rows(rows: &[&str], levels: u8) -> Result<Grid, GridError> {
        let width = rows.first().map_or(0, |r| r.chars().count());
        if width == 0 {
            return Err(GridError::Empty);
        }
        let mut builder = GridBuilder::new(width as i32, rows.len() as i32, levels);
        for (y, row) in rows.iter().enumerate() {
            let found = row.chars().count();
            if found != width {
                return Err(GridError::RaggedRow {
                    row: y,
                    expected: width,
                    found,
                });
            }
            for (x, glyph) in row.chars().enumerate() {
                let cell_type =
                    CellType::from_glyph(glyph).ok_or(GridError::UnknownGlyph { x, y, glyph })?;
                let (cx, cy) = (x as i32, y as i32);
                match cell_type {
                    CellType::Entrance => {
                        builder.entrance(cx, cy);
                    }
                    CellType::Exit if builder.exit.is_none() => {
                        builder.exit(cx, cy);
                    }
                    other => {
                        builder.set(cx, cy, other);
                    }
                }
            }
        }
        builder.build()
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn depth(&self) -> i32 {
        self.depth
    }

    pub fn levels(&self) -> u8 {
        self.levels
    }

    pub fn entrances(&self) -> &[Cell] {
        &self.entrances
    }

    pub fn exit(&self) -> Cell {
        self.exit
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && x < self.width && y < self.depth
    }

    /// Cell type at `(x, y)`; [`CellType::Wall`] outside the floor.
    pub fn cell_type(&self, x: i32, y: i32) -> CellType {
        if !self.in_bounds(x, y) {
            return CellType::Wall;
        }
        self.cells[y as usize * self.width as usize + x as usize]
    }

    pub fn is_walkable(&self, x: i32, y: i32) -> bool {
        self.cell_type(x, y).is_walkable()
    }

    /// Walkable 4-connected neighbors of `cell`, in N, S, E, W order.
    pub fn neighbors(&self, cell: Cell) -> Vec<Cell> {
        cell.adjacent()
            .into_iter()
            .filter(|c| self.is_walkable(c.x, c.y))
            .collect()
    }

    /// The walkable cell a picker stands on to reach `(x, y)`: the cell
    /// itself if walkable, otherwise its first walkable neighbor.
    pub fn access_point(&self, x: i32, y: i32) -> Option<Cell> {
        let cell = Cell::new(x, y);
        if self.is_walkable(x, y) {
            return Some(cell);
        }
        self.neighbors(cell).into_iter().next()
    }

    /// Iterate shelf cells in column-major order.
    pub fn shelf_cells(&self) -> impl Iterator<Item = Cell> + '_ {
        (0..self.width)
            .flat_map(move |x| (0..self.depth).map(move |y| Cell::new(x, y)))
            .filter(|c| self.cell_type(c.x, c.y) == CellType::Shelf)
    }

    pub fn storage(&self, location: Location) -> Option<&StorageLocation> {
        self.storage.get(&location)
    }

    pub fn storage_locations(&self) -> impl Iterator<Item = &StorageLocation> {
        self.storage.values()
    }

    /// Store `item` at `location`. Returns false if there is no such
    /// location, or the item's weight or size does not fit.
    pub fn place_item(&mut self, item: StoredItem, location: Location) -> bool {
        self.storage
            .get_mut(&location)
            .map_or(false, |slot| slot.add(item))
    }

    pub fn remove_item(&mut self, item_id: &str, location: Location) -> Option<StoredItem> {
        self.storage.get_mut(&location)?.remove(item_id)
    }

    /// Scan every storage location for `item_id`.
    pub fn find_item(&self, item_id: &str) -> Option<(Location, &StoredItem)> {
        self.storage.values().find_map(|slot| {
            slot.items()
                .iter()
                .find(|i| i.id == item_id)
                .map(|i| (slot.location(), i))
        })
    }

    pub fn stats(&self) -> GridStats {
        let shelf_cells = self
            .cells
            .iter()
            .filter(|c| **c == CellType::Shelf)
            .count();
        let walkable_cells = self.cells.iter().filter(|c| c.is_walkable()).count();
        let total_units = self.storage.len() as u32 * STORAGE_UNITS;
        let used_units: u32 = self.storage.values().map(|s| s.units_used()).sum();
        let stored_items = self.storage.values().map(|s| s.items().len()).sum();
        GridStats {
            width: self.width,
            depth: self.depth,
            levels: self.levels,
            shelf_cells,
            walkable_cells,
            storage_locations: self.storage.len(),
            total_units,
            used_units,
            stored_items,
            occupancy_rate: if total_units > 0 {
                used_units as f64 / total_units as f64
            } else {
                0.0
            },
            entrances: self.entrances.len(),
        }
    }

    /// Render the floor back to ASCII rows.
    pub fn to_rows(&self) -> Vec<String> {
        (0..self.depth)
            .map(|y| {
                (0..self.width)
                    .map(|x| self.cell_type(x, y).glyph())
                    .collect()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_floor() -> Grid {
        Grid::from_rows(
            &[
                "#######", //
                "#S.S.S#", //
                "E=====X", //
                "#S+S.S#", //
                "#######",
            ],
            3,
        )
        .unwrap()
    }

    fn item(id: &str, size: ItemSize, weight: WeightClass) -> StoredItem {
        StoredItem {
            id: id.into(),
            size,
            weight,
        }
    }

    #[test]
    fn test_cell_count_does_not_wrap() {
        assert_eq!(cell_count(4, 3), 12);
        assert_eq!(cell_count(-2, 5), 0);
        assert_eq!(cell_count(70_000, 70_000), 4_900_000_000);
    }

    #[test]
    fn test_parse_landmarks() {
        let grid = small_floor();
        assert_eq!(grid.width(), 7);
        assert_eq!(grid.depth(), 5);
        assert_eq!(grid.entrances(), &[Cell::new(0, 2)]);
        assert_eq!(grid.exit(), Cell::new(6, 2));
        assert_eq!(grid.cell_type(2, 3), CellType::CrossAisle);
    }

    #[test]
    fn test_walkable_matches_cell_type() {
        let grid = small_floor();
        for y in -2..grid.depth() + 2 {
            for x in -2..grid.width() + 2 {
                assert_eq!(grid.is_walkable(x, y), grid.cell_type(x, y).is_walkable());
            }
        }
    }

    #[test]
    fn test_out_of_bounds_is_wall() {
        let grid = small_floor();
        assert_eq!(grid.cell_type(-1, 0), CellType::Wall);
        assert_eq!(grid.cell_type(0, 99), CellType::Wall);
        assert!(!grid.is_walkable(100, 100));
    }

    #[test]
    fn test_neighbors_order_and_filter() {
        let grid = small_floor();
        // (2,2) hallway: N=(2,3) cross-aisle, S=(2,1) aisle, E=(3,2), W=(1,2)
        assert_eq!(
            grid.neighbors(Cell::new(2, 2)),
            vec![
                Cell::new(2, 3),
                Cell::new(2, 1),
                Cell::new(3, 2),
                Cell::new(1, 2)
            ]
        );
        // Entrance on the west wall has only its east neighbor
        assert_eq!(grid.neighbors(Cell::new(0, 2)), vec![Cell::new(1, 2)]);
    }

    #[test]
    fn test_access_point() {
        let grid = small_floor();
        // Shelf (1,1): N=(1,2) hallway is walkable
        assert_eq!(grid.access_point(1, 1), Some(Cell::new(1, 2)));
        assert_eq!(grid.access_point(2, 1), Some(Cell::new(2, 1)));
        assert_eq!(grid.access_point(-5, -5), None);
    }

    #[test]
    fn test_storage_created_per_level() {
        let grid = small_floor();
        // 6 shelf cells × 3 levels
        assert_eq!(grid.storage_locations().count(), 18);
        assert!(grid.storage(Location::new(1, 1, 3)).is_some());
        assert!(grid.storage(Location::new(1, 1, 4)).is_none());
        assert!(grid.storage(Location::new(2, 1, 1)).is_none());
    }

    #[test]
    fn test_unit_capacity() {
        let mut grid = small_floor();
        let loc = Location::new(1, 1, 1);
        assert!(grid.place_item(item("a", ItemSize::Medium, WeightClass::Light), loc));
        assert!(grid.place_item(item("b", ItemSize::Small, WeightClass::Light), loc));
        assert!(!grid.place_item(item("c", ItemSize::Medium, WeightClass::Light), loc));
        assert!(grid.place_item(item("d", ItemSize::Small, WeightClass::Light), loc));
        assert!(!grid.place_item(item("e", ItemSize::Small, WeightClass::Light), loc));
        assert_eq!(grid.storage(loc).unwrap().units_used(), 4);
        assert!((grid.storage(loc).unwrap().occupancy_rate() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_large_item_fills_location() {
        let mut grid = small_floor();
        let loc = Location::new(3, 1, 1);
        assert!(grid.place_item(item("big", ItemSize::Large, WeightClass::Light), loc));
        assert!(!grid.place_item(item("tiny", ItemSize::Small, WeightClass::Light), loc));
    }

    #[test]
    fn test_weight_restrictions() {
        let mut grid = small_floor();
        assert!(!grid.place_item(
            item("h2", ItemSize::Small, WeightClass::Heavy),
            Location::new(1, 1, 2)
        ));
        assert!(grid.place_item(
            item("h1", ItemSize::Small, WeightClass::Heavy),
            Location::new(1, 1, 1)
        ));
        assert!(!grid.place_item(
            item("m3", ItemSize::Small, WeightClass::Medium),
            Location::new(1, 1, 3)
        ));
        assert!(grid.place_item(
            item("m2", ItemSize::Small, WeightClass::Medium),
            Location::new(1, 1, 2)
        ));
        assert!(grid.place_item(
            item("l3", ItemSize::Small, WeightClass::Light),
            Location::new(1, 1, 3)
        ));
    }

    #[test]
    fn test_place_on_non_shelf_fails() {
        let mut grid = small_floor();
        assert!(!grid.place_item(
            item("x", ItemSize::Small, WeightClass::Light),
            Location::new(2, 2, 1)
        ));
    }

    #[test]
    fn test_find_and_remove() {
        let mut grid = small_floor();
        let loc = Location::new(5, 3, 2);
        grid.place_item(item("WH_007", ItemSize::Small, WeightClass::Light), loc);
        let (found, stored) = grid.find_item("WH_007").unwrap();
        assert_eq!(found, loc);
        assert_eq!(stored.size, ItemSize::Small);

        assert!(grid.remove_item("WH_007", Location::new(5, 3, 1)).is_none());
        assert!(grid.remove_item("WH_007", loc).is_some());
        assert!(grid.find_item("WH_007").is_none());
        assert!(grid.remove_item("WH_007", loc).is_none());
    }

    #[test]
    fn test_stats() {
        let mut grid = small_floor();
        grid.place_item(
            item("a", ItemSize::Large, WeightClass::Light),
            Location::new(1, 1, 1),
        );
        let stats = grid.stats();
        assert_eq!(stats.shelf_cells, 6);
        assert_eq!(stats.storage_locations, 18);
        assert_eq!(stats.total_units, 72);
        assert_eq!(stats.used_units, 4);
        assert_eq!(stats.stored_items, 1);
        assert_eq!(stats.entrances, 1);
        let expected_walkable = grid
            .to_rows()
            .iter()
            .flat_map(|r| r.chars())
            .filter(|g| CellType::from_glyph(*g).unwrap().is_walkable())
            .count();
        assert_eq!(stats.walkable_cells, expected_walkable);
    }

    #[test]
    fn test_to_rows_round_trip() {
        let rows = ["#E#", "#.#", "#X#"];
        let grid = Grid::from_rows(&rows, 1).unwrap();
        assert_eq!(grid.to_rows(), rows);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(Grid::from_rows(&[], 1).unwrap_err(), GridError::Empty);
        assert_eq!(
            Grid::from_rows(&["E.X", ".."], 1).unwrap_err(),
            GridError::RaggedRow {
                row: 1,
                expected: 3,
                found: 2
            }
        );
        assert!(matches!(
            Grid::from_rows(&["E?X"], 1).unwrap_err(),
            GridError::UnknownGlyph { x: 1, y: 0, glyph: '?' }
        ));
        assert_eq!(Grid::from_rows(&["..X"], 1).unwrap_err(), GridError::NoEntrance);
        assert_eq!(Grid::from_rows(&["E.."], 1).unwrap_err(), GridError::NoExit);
    }

    #[test]
    fn test_builder_errors() {
        let mut builder = GridBuilder::new(4, 4, 1);
        builder.entrance(0, 0).exit(3, 3).set(9, 9, CellType::Aisle);
        assert_eq!(
            builder.build().unwrap_err(),
            GridError::OutOfBounds(Cell::new(9, 9))
        );

        let mut builder = GridBuilder::new(4, 4, 1);
        builder.entrance(0, 0).exit(3, 3).set(3, 3, CellType::Wall);
        assert_eq!(
            builder.build().unwrap_err(),
            GridError::NotWalkable(Cell::new(3, 3))
        );
    }
}
