//! The standard warehouse floor plan.
//!
//! ```text
//!   ####################
//!   ###SS..SS..SS+.SS..#   upper zone: 2-wide shelf / aisle bands
//!   ###SS..SS..SS+.SS..#   cross-aisle every 8 columns
//!   ##================## ┐
//!   EE================XX │ 3-wide central hallway
//!   EE================## ┘
//!   ###SS..SS..SS+.SS..#   lower zone
//!   ####################
//! ```

use pickswarm_logic::constants::CellType;
use pickswarm_logic::grid::{Grid, GridBuilder, GridError};

/// Columns between cross-aisles.
const CROSS_AISLE_SPACING: usize = 8;

/// Build the standard floor: a 3-wide hallway through the middle, storage
/// zones above and below it, two entrances on the west wall and the exit
/// on the east wall.
pub fn standard_floor(width: i32, depth: i32, levels: u8) -> Result<Grid, GridError> {
    let mut builder = GridBuilder::new(width, depth, levels);
    let mid = depth / 2;

    builder.fill(2, mid - 1, width - 2, mid + 2, CellType::Hallway);

    let upper = (3, mid - 1);
    let lower = (mid + 2, depth - 3);
    for (y0, y1) in [upper, lower] {
        storage_zone(&mut builder, 3, width - 3, y0, y1);
    }

    for x in (CROSS_AISLE_SPACING as i32..width - 2).step_by(CROSS_AISLE_SPACING) {
        for (y0, y1) in [upper, lower] {
            for y in y0..y1 {
                if builder.cell_type(x, y) == CellType::Shelf {
                    builder.set(x, y, CellType::CrossAisle);
                }
            }
        }
    }

    builder
        .entrance(0, mid)
        .set(1, mid, CellType::Entrance)
        .entrance(0, mid + 1)
        .set(1, mid + 1, CellType::Entrance)
        .set(width - 2, mid, CellType::Exit)
        .exit(width - 1, mid);

    builder.build()
}

/// Alternate 2-wide shelf and aisle bands across `[x0, x1) × [y0, y1)`.
fn storage_zone(builder: &mut GridBuilder, x0: i32, x1: i32, y0: i32, y1: i32) {
    let mut x = x0;
    while x < x1 {
        let band = if (x - x0) % 4 < 2 {
            CellType::Shelf
        } else {
            CellType::Aisle
        };
        builder.fill(x, y0, (x + 2).min(x1), y1, band);
        x += 2;
    }
}
