//! Pick orders as delivered by the order source.

use serde::{Deserialize, Serialize};

use crate::constants::ItemSize;
use crate::grid::Location;

/// One line of an order: which item, where it is shelved, and how long it
/// takes to pick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub item_id: String,
    pub name: String,
    pub size: ItemSize,
    pub location: Location,
    pub pick_duration: f64,
}

impl OrderItem {
    pub fn unit_cost(&self) -> u32 {
        self.size.unit_cost()
    }
}

/// Order urgency. Carried for reporting; assignment is strictly FIFO.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    #[default]
    Normal,
    High,
    Urgent,
}

/// A complete picking order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PickOrder {
    pub id: String,
    pub items: Vec<OrderItem>,
    #[serde(default)]
    pub priority: Priority,
    /// Set by the coordinator when the order is enqueued.
    #[serde(default)]
    pub created_at: f64,
}

impl PickOrder {
    pub fn new(id: impl Into<String>, items: Vec<OrderItem>) -> Self {
        Self {
            id: id.into(),
            items,
            priority: Priority::Normal,
            created_at: 0.0,
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Sum of the unit costs of every line.
    pub fn total_units(&self) -> u32 {
        self.items.iter().map(OrderItem::unit_cost).sum()
    }
}
