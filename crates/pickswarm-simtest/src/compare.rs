//! Stocking a warehouse from a scenario, and running the same shift under
//! each placement strategy to compare them.

use anyhow::{Context, Result};
use pickswarm_logic::grid::Grid;
use pickswarm_logic::order::PickOrder;
use pickswarm_logic::swarm::PickerSwarm;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

use crate::catalog::{self, Placement, PlacedItem};
use crate::layout;
use crate::orders;
use crate::scenario::Scenario;

/// A floor with its inventory on the shelves and an order batch to pick.
pub struct Stocked {
    pub grid: Grid,
    pub catalog_size: usize,
    pub placed: Vec<PlacedItem>,
    pub orders: Vec<PickOrder>,
}

/// Build the floor, generate and place the catalog with `placement`, and
/// generate the order batch. Catalog and orders draw from their own seeds,
/// so two placements of the same scenario see the same items and orders.
pub fn stock(scenario: &Scenario, placement: Placement) -> Result<Stocked> {
    let w = &scenario.warehouse;
    let mut grid = layout::standard_floor(w.width, w.depth, w.levels)
        .with_context(|| format!("building {}x{}x{} floor", w.width, w.depth, w.levels))?;

    let mut rng = StdRng::seed_from_u64(scenario.catalog.seed);
    let items = catalog::generate(scenario.catalog.items, &mut rng);
    let placed = catalog::place(&mut grid, &items, placement, &mut rng);

    let mut rng = StdRng::seed_from_u64(scenario.orders.seed);
    let lines = orders::order_lines(&placed, &mut rng);
    let orders = orders::generate(&lines, scenario.orders.count, &mut rng);

    Ok(Stocked {
        grid,
        catalog_size: items.len(),
        placed,
        orders,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacementOutcome {
    pub placement: Placement,
    pub orders_total: usize,
    pub orders_completed: u32,
    pub total_distance: u64,
    pub sim_time: f64,
    /// Run time per completed order.
    pub average_order_time: f64,
    pub average_turnaround: f64,
}

/// Run the scenario's shift with one placement strategy.
pub fn run_placement(scenario: &Scenario, placement: Placement) -> Result<PlacementOutcome> {
    let stocked = stock(scenario, placement)?;
    let orders_total = stocked.orders.len();
    let mut swarm = PickerSwarm::new(stocked.grid, scenario.swarm.clone())
        .context("configuring picker swarm")?;
    swarm.add_orders(stocked.orders);

    let (duration, step) = (scenario.run.duration, scenario.swarm.time_step);
    let stats = if scenario.run.drain {
        swarm.run_until_drained(duration, step)
    } else {
        swarm.run_for(duration, step)
    };

    let average_order_time = if stats.orders_completed > 0 {
        stats.sim_time / stats.orders_completed as f64
    } else {
        0.0
    };
    Ok(PlacementOutcome {
        placement,
        orders_total,
        orders_completed: stats.orders_completed,
        total_distance: stats.total_distance,
        sim_time: stats.sim_time,
        average_order_time,
        average_turnaround: stats.average_turnaround,
    })
}

/// Run every placement strategy on the same scenario.
pub fn compare(scenario: &Scenario) -> Result<Vec<PlacementOutcome>> {
    Placement::ALL
        .iter()
        .map(|&placement| run_placement(scenario, placement))
        .collect()
}

/// Percentage by which frequency-based placement shortened the total
/// distance walked compared to random placement.
pub fn distance_improvement(outcomes: &[PlacementOutcome]) -> Option<f64> {
    let distance = |placement| {
        outcomes
            .iter()
            .find(|o| o.placement == placement)
            .map(|o| o.total_distance as f64)
    };
    let random = distance(Placement::Random)?;
    let frequency = distance(Placement::FrequencyBased)?;
    (random > 0.0).then(|| (random - frequency) / random * 100.0)
}

pub fn print_comparison(outcomes: &[PlacementOutcome]) {
    println!("--- Placement Comparison ---");
    for o in outcomes {
        println!(
            "  {:<16} {:>3}/{:<3} orders, {:>6} cells, {:>7.1}s avg order, {:>7.1}s avg turnaround",
            o.placement.to_string(),
            o.orders_completed,
            o.orders_total,
            o.total_distance,
            o.average_order_time,
            o.average_turnaround
        );
    }
    if let Some(improvement) = distance_improvement(outcomes) {
        println!(
            "\nFrequency-based placement changed total distance by {:+.1}%",
            -improvement
        );
    }
}
