//! What a picker is currently carrying.

use serde::{Deserialize, Serialize};

use crate::constants::{timing, LOAD_UNITS};
use crate::order::OrderItem;

/// A picker's carried items, bounded by [`LOAD_UNITS`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Load {
    items: Vec<OrderItem>,
    units: u32,
}

impl Load {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[OrderItem] {
        &self.items
    }

    pub fn units(&self) -> u32 {
        self.units
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn can_carry(&self, item: &OrderItem) -> bool {
        self.units + item.unit_cost() <= LOAD_UNITS
    }

    /// Add `item` if it fits. A rejected item leaves the load untouched.
    pub fn add_item(&mut self, item: OrderItem) -> bool {
        if !self.can_carry(&item) {
            return false;
        }
        self.units += item.unit_cost();
        self.items.push(item);
        true
    }

    /// Extra time per cell moved, proportional to the units carried.
    pub fn movement_penalty(&self) -> f64 {
        self.penalty_with(timing::LOAD_PENALTY_PER_UNIT)
    }

    pub(crate) fn penalty_with(&self, per_unit: f64) -> f64 {
        self.units as f64 * per_unit
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.units = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::ItemSize;
    use crate::grid::Location;

    fn line(id: &str, size: ItemSize) -> OrderItem {
        OrderItem {
            item_id: id.into(),
            name: id.into(),
            size,
            location: Location::new(0, 0, 1),
            pick_duration: 1.0,
        }
    }

    #[test]
    fn test_fills_to_capacity() {
        let mut load = Load::new();
        assert!(load.add_item(line("a", ItemSize::Medium)));
        assert!(load.add_item(line("b", ItemSize::Small)));
        assert!(load.add_item(line("c", ItemSize::Small)));
        assert_eq!(load.units(), LOAD_UNITS);
        assert!(!load.can_carry(&line("d", ItemSize::Small)));
    }

    #[test]
    fn test_rejection_leaves_load_unchanged() {
        let mut load = Load::new();
        load.add_item(line("a", ItemSize::Medium));
        load.add_item(line("b", ItemSize::Small));
        let before = load.clone();
        assert!(!load.add_item(line("big", ItemSize::Large)));
        assert!(!load.add_item(line("mid", ItemSize::Medium)));
        assert_eq!(load, before);
    }

    #[test]
    fn test_units_never_exceed_capacity() {
        let sizes = [
            ItemSize::Small,
            ItemSize::Large,
            ItemSize::Medium,
            ItemSize::Small,
            ItemSize::Medium,
            ItemSize::Small,
            ItemSize::Large,
        ];
        let mut load = Load::new();
        let mut accepted = 0;
        for (i, size) in sizes.iter().enumerate() {
            if load.add_item(line(&i.to_string(), *size)) {
                accepted += size.unit_cost();
            }
            assert!(load.units() <= LOAD_UNITS);
        }
        assert_eq!(load.units(), accepted);
        assert_eq!(
            load.items().iter().map(|i| i.unit_cost()).sum::<u32>(),
            load.units()
        );
    }

    #[test]
    fn test_movement_penalty() {
        let mut load = Load::new();
        assert_eq!(load.movement_penalty(), 0.0);
        load.add_item(line("a", ItemSize::Medium));
        assert!((load.movement_penalty() - 0.2).abs() < 1e-9);
        load.clear();
        assert!(load.is_empty());
        assert_eq!(load.units(), 0);
    }
}
