//! Scenario file: what floor to build, how much inventory and how many
//! orders to generate, and how long to run.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use pickswarm_logic::config::SwarmConfig;
use serde::{Deserialize, Serialize};

use crate::catalog::Placement;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scenario {
    pub warehouse: WarehouseSection,
    pub catalog: CatalogSection,
    pub orders: OrdersSection,
    pub run: RunSection,
    pub swarm: SwarmConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WarehouseSection {
    pub width: i32,
    pub depth: i32,
    pub levels: u8,
}

impl Default for WarehouseSection {
    fn default() -> Self {
        Self {
            width: 36,
            depth: 36,
            levels: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogSection {
    pub items: usize,
    pub seed: u64,
    pub placement: Placement,
}

impl Default for CatalogSection {
    fn default() -> Self {
        Self {
            items: 50,
            seed: 42,
            placement: Placement::Random,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrdersSection {
    pub count: usize,
    pub seed: u64,
}

impl Default for OrdersSection {
    fn default() -> Self {
        Self { count: 20, seed: 7 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunSection {
    /// Clock value to stop at.
    pub duration: f64,
    /// Stop early once every order is done.
    pub drain: bool,
}

impl Default for RunSection {
    fn default() -> Self {
        Self {
            duration: 3600.0,
            drain: true,
        }
    }
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading scenario {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("parsing scenario {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Use one seed for inventory, orders and the swarm.
    pub fn reseed(&mut self, seed: u64) {
        self.catalog.seed = seed;
        self.orders.seed = seed.wrapping_add(1);
        self.swarm.seed = seed.wrapping_add(2);
    }
}
