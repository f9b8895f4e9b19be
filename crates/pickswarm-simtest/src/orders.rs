//! Seeded order batches drawn from placed inventory.

use pickswarm_logic::constants::LOAD_UNITS;
use pickswarm_logic::order::{OrderItem, PickOrder, Priority};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::catalog::PlacedItem;

const MAX_ITEMS_PER_ORDER: usize = 5;
const SELECTION_ATTEMPTS: usize = 20;
/// Pick duration range, in seconds.
const PICK_SECONDS: std::ops::Range<f64> = 15.0..45.0;

/// Turn placed inventory into pickable order lines, each with a fixed
/// pick duration.
pub fn order_lines(placed: &[PlacedItem], rng: &mut StdRng) -> Vec<OrderItem> {
    placed
        .iter()
        .map(|p| OrderItem {
            item_id: p.item.id.clone(),
            name: p.item.name.clone(),
            size: p.item.size,
            location: p.location,
            pick_duration: rng.gen_range(PICK_SECONDS),
        })
        .collect()
}

/// Priority mix: 70% normal, 25% high, 5% urgent.
fn roll_priority(rng: &mut StdRng) -> Priority {
    match rng.gen_range(0..100) {
        0..=69 => Priority::Normal,
        70..=94 => Priority::High,
        _ => Priority::Urgent,
    }
}

/// Generate up to `count` orders of 1 to 5 distinct lines whose combined
/// unit cost fits one picker load. Orders that end up empty are dropped.
pub fn generate(lines: &[OrderItem], count: usize, rng: &mut StdRng) -> Vec<PickOrder> {
    let mut orders = Vec::with_capacity(count);
    for n in 1..=count {
        let target = rng.gen_range(1..=MAX_ITEMS_PER_ORDER);
        let mut chosen: Vec<OrderItem> = Vec::with_capacity(target);
        let mut units = 0;

        for _ in 0..SELECTION_ATTEMPTS {
            if chosen.len() >= target || units >= LOAD_UNITS {
                break;
            }
            let Some(line) = lines.choose(rng) else {
                break;
            };
            let fits = units + line.unit_cost() <= LOAD_UNITS;
            if fits && !chosen.iter().any(|c| c.item_id == line.item_id) {
                units += line.unit_cost();
                chosen.push(line.clone());
            }
        }

        if chosen.is_empty() {
            continue;
        }
        let priority = roll_priority(rng);
        orders.push(PickOrder::new(format!("ORD_{n:03}"), chosen).with_priority(priority));
    }
    orders
}
