//! Seeded item catalog and shelf placement.

use log::warn;
use pickswarm_logic::constants::{ItemSize, WeightClass};
use pickswarm_logic::grid::{Cell, Grid, Location, StoredItem};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use ItemSize::{Large, Medium as Mid, Small};
use WeightClass::{Heavy, Light, Medium};

/// Random placement attempts per item before giving up.
const PLACEMENT_ATTEMPTS: usize = 100;

struct Template {
    name: &'static str,
    size: ItemSize,
    weight: WeightClass,
    daily_picks: f64,
}

const fn t(name: &'static str, size: ItemSize, weight: WeightClass, daily_picks: f64) -> Template {
    Template {
        name,
        size,
        weight,
        daily_picks,
    }
}

const CATEGORIES: &[(&str, &[Template])] = &[
    (
        "electronics",
        &[
            t("Laptop Computer", Mid, Medium, 12.5),
            t("Smartphone", Small, Light, 15.2),
            t("Tablet Device", Small, Light, 8.3),
            t("Wireless Headphones", Small, Light, 18.7),
            t("Gaming Console", Mid, Medium, 6.4),
            t("Bluetooth Speaker", Small, Light, 11.8),
        ],
    ),
    (
        "home_garden",
        &[
            t("Space Heater", Mid, Medium, 3.8),
            t("Air Conditioner", Large, Heavy, 2.1),
            t("Garden Hose", Mid, Medium, 5.3),
            t("Lawn Mower", Large, Heavy, 1.8),
            t("Barbecue Grill", Large, Heavy, 1.9),
        ],
    ),
    (
        "clothing",
        &[
            t("Winter Coat", Mid, Light, 4.6),
            t("Running Shoes", Small, Light, 13.4),
            t("Jeans", Small, Light, 16.8),
            t("Sweater", Small, Light, 6.9),
            t("School Backpack", Mid, Light, 5.7),
        ],
    ),
    (
        "sports",
        &[
            t("Bicycle", Large, Heavy, 3.6),
            t("Tennis Racket", Mid, Light, 4.8),
            t("Camping Tent", Mid, Medium, 2.9),
            t("Yoga Mat", Mid, Light, 8.1),
            t("Football", Small, Light, 6.3),
        ],
    ),
    (
        "tools",
        &[
            t("Power Drill", Mid, Medium, 6.8),
            t("Tool Box Set", Large, Heavy, 4.2),
            t("Hammer", Small, Medium, 9.1),
            t("Screwdriver Set", Small, Light, 11.6),
            t("Work Gloves", Small, Light, 14.2),
        ],
    ),
    (
        "kitchen",
        &[
            t("Coffee Machine", Mid, Medium, 7.9),
            t("Microwave Oven", Large, Heavy, 3.8),
            t("Blender", Mid, Medium, 5.4),
            t("Stand Mixer", Large, Heavy, 2.7),
        ],
    ),
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogItem {
    pub id: String,
    pub name: String,
    pub category: &'static str,
    pub size: ItemSize,
    pub weight: WeightClass,
    pub daily_picks: f64,
}

/// A catalog item sitting at a known shelf location.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedItem {
    pub item: CatalogItem,
    pub location: Location,
}

/// Generate `count` items spread evenly over the categories, most popular
/// first. Repeated template names get a `v2`, `v3`, ... suffix.
pub fn generate(count: usize, rng: &mut StdRng) -> Vec<CatalogItem> {
    let per_category = count / CATEGORIES.len();
    let mut remainder = count % CATEGORIES.len();
    let mut items = Vec::with_capacity(count);

    for &(category, templates) in CATEGORIES {
        let mut n = per_category;
        if remainder > 0 {
            n += 1;
            remainder -= 1;
        }
        for i in 0..n {
            let template = &templates[i % templates.len()];
            let name = match i / templates.len() {
                0 => template.name.to_string(),
                round => format!("{} v{}", template.name, round + 1),
            };
            items.push(CatalogItem {
                id: format!("WH_{:03}", items.len() + 1),
                name,
                category,
                size: template.size,
                weight: template.weight,
                daily_picks: (template.daily_picks + rng.gen_range(-1.0..1.0_f64)).max(0.1),
            });
        }
    }

    items.sort_by(|a, b| b.daily_picks.total_cmp(&a.daily_picks));
    items
}

/// Shelf cells a picker can actually reach.
pub fn accessible_shelves(grid: &Grid) -> Vec<Cell> {
    grid.shelf_cells()
        .filter(|c| grid.access_point(c.x, c.y).is_some())
        .collect()
}

/// How items are assigned to shelves.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum Placement {
    /// Random accessible shelf at a random allowed level.
    #[default]
    Random,
    /// Most-picked items on the shelves nearest the first entrance.
    FrequencyBased,
}

impl Placement {
    pub const ALL: [Placement; 2] = [Placement::Random, Placement::FrequencyBased];
}

impl std::fmt::Display for Placement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Placement::Random => write!(f, "random"),
            Placement::FrequencyBased => write!(f, "frequency_based"),
        }
    }
}

/// Place every item using `placement`. Items that find no room are skipped
/// with a warning.
pub fn place(
    grid: &mut Grid,
    catalog: &[CatalogItem],
    placement: Placement,
    rng: &mut StdRng,
) -> Vec<PlacedItem> {
    match placement {
        Placement::Random => place_randomly(grid, catalog, rng),
        Placement::FrequencyBased => place_by_frequency(grid, catalog),
    }
}

/// Highest level `item` may sit at on this floor.
fn top_level(grid: &Grid, item: &CatalogItem) -> u8 {
    item.weight
        .max_level()
        .map_or(grid.levels(), |max| max.min(grid.levels()))
        .max(1)
}

fn stored(item: &CatalogItem) -> StoredItem {
    StoredItem {
        id: item.id.clone(),
        size: item.size,
        weight: item.weight,
    }
}

/// Random accessible shelf at a random level the item's weight class allows.
fn place_randomly(grid: &mut Grid, catalog: &[CatalogItem], rng: &mut StdRng) -> Vec<PlacedItem> {
    let shelves = accessible_shelves(grid);
    let mut placed = Vec::with_capacity(catalog.len());

    for item in catalog {
        let top = top_level(grid, item);
        let stored = stored(item);

        let location = (0..PLACEMENT_ATTEMPTS).find_map(|_| {
            let shelf = shelves.choose(rng)?;
            let location = Location::new(shelf.x, shelf.y, rng.gen_range(1..=top));
            grid.place_item(stored.clone(), location).then_some(location)
        });

        match location {
            Some(location) => placed.push(PlacedItem {
                item: item.clone(),
                location,
            }),
            None => warn!("No shelf space for {} ({})", item.id, item.name),
        }
    }
    placed
}

/// Most-picked items first, onto shelves ordered by distance from the first
/// entrance, filling the lowest free level. The shelf cursor only moves
/// forward, so a shelf an item could not use is not offered again.
fn place_by_frequency(grid: &mut Grid, catalog: &[CatalogItem]) -> Vec<PlacedItem> {
    let Some(&entrance) = grid.entrances().first() else {
        return Vec::new();
    };
    let mut shelves = accessible_shelves(grid);
    shelves.sort_by_key(|&c| (c.manhattan(entrance), c));

    let mut items: Vec<&CatalogItem> = catalog.iter().collect();
    items.sort_by(|a, b| b.daily_picks.total_cmp(&a.daily_picks));

    let mut placed = Vec::with_capacity(catalog.len());
    let mut cursor = 0;
    for item in items {
        let top = top_level(grid, item);
        let stored = stored(item);
        let mut location = None;

        while let Some(shelf) = shelves.get(cursor) {
            location = (1..=top)
                .map(|level| Location::new(shelf.x, shelf.y, level))
                .find(|&l| grid.place_item(stored.clone(), l));
            if location.is_some() {
                break;
            }
            cursor += 1;
        }

        match location {
            Some(location) => placed.push(PlacedItem {
                item: item.clone(),
                location,
            }),
            None => warn!("No shelf space for {} ({})", item.id, item.name),
        }
    }
    placed
}
