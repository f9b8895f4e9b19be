//! PickSwarm Headless Simulation Harness
//!
//! Builds the standard warehouse floor, stocks it from a seeded catalog,
//! generates a seeded order batch, runs the picker swarm and validates the
//! run's invariants. Exits non-zero if any check fails.
//!
//! Usage:
//!   cargo run -p pickswarm-simtest
//!   cargo run -p pickswarm-simtest -- --config crates/pickswarm-simtest/scenarios/rush_hour.toml
//!   cargo run -p pickswarm-simtest -- --agents 6 --orders 40 --verbose
//!   cargo run -p pickswarm-simtest -- --json > report.json
//!   cargo run -p pickswarm-simtest -- --placement frequency-based
//!   cargo run -p pickswarm-simtest -- --compare

mod catalog;
mod compare;
mod layout;
mod orders;
mod scenario;

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use pickswarm_logic::agent::AgentStatus;
use pickswarm_logic::config::RightOfWay;
use pickswarm_logic::constants::{LOAD_UNITS, STORAGE_UNITS};
use pickswarm_logic::grid::{Cell, Grid, GridStats};
use pickswarm_logic::order::PickOrder;
use pickswarm_logic::pathfinding::PathPlanner;
use pickswarm_logic::swarm::{PickerSwarm, RunStats};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use crate::catalog::{Placement, PlacedItem};
use crate::scenario::Scenario;

#[derive(Parser, Debug)]
#[command(name = "pickswarm-simtest")]
#[command(about = "Headless picker swarm harness - runs a seeded warehouse shift and validates it")]
struct Cli {
    /// Scenario file (TOML); defaults apply to anything it leaves out
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// One seed for inventory, orders and the swarm
    #[arg(long)]
    seed: Option<u64>,

    /// Number of picker agents
    #[arg(short, long)]
    agents: Option<usize>,

    /// Number of orders to generate
    #[arg(short, long)]
    orders: Option<usize>,

    /// Clock value to stop at
    #[arg(short, long)]
    duration: Option<f64>,

    /// Shuffle agent update order every tick
    #[arg(long)]
    shuffled: bool,

    /// How items are assigned to shelves
    #[arg(short, long, value_enum)]
    placement: Option<Placement>,

    /// Run the shift under every placement strategy and compare them
    #[arg(long)]
    compare: bool,

    /// Print the final report as JSON instead of text
    #[arg(long)]
    json: bool,

    /// Show passing checks and debug logs
    #[arg(short, long)]
    verbose: bool,
}

// ── Test harness ────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

impl TestResult {
    fn new(name: &str, passed: bool, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed,
            detail: detail.into(),
        }
    }
}

#[derive(Serialize)]
struct Report<'a> {
    scenario: &'a Scenario,
    floor: GridStats,
    stats: RunStats,
    agents: Vec<AgentStatus>,
    checks: &'a [TestResult],
}

fn init_logging(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn build_scenario(cli: &Cli) -> Result<Scenario> {
    let mut scenario = match &cli.config {
        Some(path) => Scenario::load(path)?,
        None => Scenario::default(),
    };
    if let Some(seed) = cli.seed {
        scenario.reseed(seed);
    }
    if let Some(agents) = cli.agents {
        scenario.swarm.agent_count = agents;
    }
    if let Some(orders) = cli.orders {
        scenario.orders.count = orders;
    }
    if let Some(duration) = cli.duration {
        scenario.run.duration = duration;
    }
    if cli.shuffled {
        scenario.swarm.right_of_way = RightOfWay::Shuffled;
    }
    if let Some(placement) = cli.placement {
        scenario.catalog.placement = placement;
    }
    Ok(scenario)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let scenario = build_scenario(&cli)?;
    let text = !cli.json;

    if text {
        println!("=== PickSwarm Simulation Harness ===\n");
    }

    if cli.compare {
        let outcomes = compare::compare(&scenario)?;
        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&outcomes).context("serializing comparison")?
            );
        } else {
            compare::print_comparison(&outcomes);
        }
        return Ok(());
    }

    let compare::Stocked {
        grid,
        catalog_size,
        placed,
        orders: batch,
    } = compare::stock(&scenario, scenario.catalog.placement)?;
    info!(
        "Stocked {}/{} items ({} placement), generated {} orders",
        placed.len(),
        catalog_size,
        scenario.catalog.placement,
        batch.len()
    );

    let mut results = Vec::new();

    // 1. Floor plan
    results.extend(validate_floor(&grid, text));

    // 2. Inventory placement
    results.extend(validate_inventory(&grid, &placed, catalog_size, text));

    // 3. Order batch
    results.extend(validate_orders(&batch, text));

    // 4. Swarm run
    let floor = grid.stats();
    let mut swarm =
        PickerSwarm::new(grid, scenario.swarm.clone()).context("configuring picker swarm")?;
    swarm.add_orders(batch.iter().cloned());
    results.extend(validate_run(&mut swarm, &scenario, batch.len(), text));

    // ── Summary ──
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.len() - passed;

    if cli.json {
        let report = Report {
            scenario: &scenario,
            floor,
            stats: swarm.stats(),
            agents: swarm.agent_statuses(),
            checks: &results,
        };
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("serializing report")?
        );
    } else {
        print_summary(&swarm.stats());
        println!();
        for r in &results {
            let icon = if r.passed { "✓" } else { "✗" };
            if !r.passed || cli.verbose {
                println!("  {} {}: {}", icon, r.name, r.detail);
            }
        }
        println!(
            "\n=== RESULT: {}/{} passed, {} failed ===",
            passed,
            results.len(),
            failed
        );
    }

    if failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}

// ── 1. Floor plan ───────────────────────────────────────────────────────

fn validate_floor(grid: &Grid, text: bool) -> Vec<TestResult> {
    if text {
        println!("--- Floor Plan ---");
    }
    let mut results = Vec::new();
    let stats = grid.stats();

    results.push(TestResult::new(
        "floor_has_storage",
        stats.storage_locations > 0,
        format!(
            "{}x{}x{}: {} shelf cells, {} storage locations, {} walkable cells",
            stats.width,
            stats.depth,
            stats.levels,
            stats.shelf_cells,
            stats.storage_locations,
            stats.walkable_cells
        ),
    ));

    let planner = PathPlanner::new(grid);
    let blocked = HashSet::new();
    let stranded: Vec<Cell> = grid
        .entrances()
        .iter()
        .copied()
        .filter(|&e| planner.find_path(e, grid.exit(), &blocked).is_empty())
        .collect();
    results.push(TestResult::new(
        "floor_entrances_reach_exit",
        stranded.is_empty(),
        if stranded.is_empty() {
            format!("{} entrances connected to exit {}", grid.entrances().len(), grid.exit())
        } else {
            format!("no route to exit from {:?}", stranded)
        },
    ));

    let out_of_range = (-1..=grid.width())
        .flat_map(|x| [(x, -1), (x, grid.depth())])
        .filter(|&(x, y)| grid.is_walkable(x, y))
        .count();
    results.push(TestResult::new(
        "floor_out_of_bounds_is_wall",
        out_of_range == 0,
        format!("{} out-of-bounds cells reported walkable", out_of_range),
    ));

    results
}

// ── 2. Inventory ────────────────────────────────────────────────────────

fn validate_inventory(
    grid: &Grid,
    placed: &[PlacedItem],
    catalog_size: usize,
    text: bool,
) -> Vec<TestResult> {
    if text {
        println!("--- Inventory ---");
    }
    let mut results = Vec::new();

    results.push(TestResult::new(
        "inventory_all_placed",
        placed.len() == catalog_size,
        format!("{}/{} catalog items on shelves", placed.len(), catalog_size),
    ));

    let over_capacity = grid
        .storage_locations()
        .filter(|s| s.units_used() > STORAGE_UNITS)
        .count();
    results.push(TestResult::new(
        "inventory_capacity",
        over_capacity == 0,
        format!(
            "{} over-capacity locations, occupancy {:.1}%",
            over_capacity,
            grid.stats().occupancy_rate * 100.0
        ),
    ));

    let misplaced: Vec<&str> = grid
        .storage_locations()
        .flat_map(|s| {
            s.items()
                .iter()
                .filter(move |i| !i.weight.allows_level(s.location().level))
        })
        .map(|i| i.id.as_str())
        .collect();
    results.push(TestResult::new(
        "inventory_weight_levels",
        misplaced.is_empty(),
        if misplaced.is_empty() {
            "every item at an allowed level".to_string()
        } else {
            format!("too high: {}", misplaced.join(", "))
        },
    ));

    let planner = PathPlanner::new(grid);
    let blocked = HashSet::new();
    let entrance = grid.entrances().first().copied().unwrap_or_else(|| grid.exit());
    let unreachable: Vec<&str> = placed
        .iter()
        .filter(|p| {
            grid.access_point(p.location.x, p.location.y)
                .map_or(true, |a| planner.find_path(entrance, a, &blocked).is_empty())
        })
        .map(|p| p.item.id.as_str())
        .collect();
    results.push(TestResult::new(
        "inventory_reachable",
        unreachable.is_empty(),
        if unreachable.is_empty() {
            format!("{} items pickable from {}", placed.len(), entrance)
        } else {
            format!("unreachable: {}", unreachable.join(", "))
        },
    ));

    results
}

// ── 3. Orders ───────────────────────────────────────────────────────────

fn validate_orders(batch: &[PickOrder], text: bool) -> Vec<TestResult> {
    if text {
        println!("--- Orders ---");
    }
    let mut results = Vec::new();

    results.push(TestResult::new(
        "orders_generated",
        !batch.is_empty(),
        format!("{} orders", batch.len()),
    ));

    let oversized: Vec<&str> = batch
        .iter()
        .filter(|o| o.total_units() > LOAD_UNITS || o.items.is_empty())
        .map(|o| o.id.as_str())
        .collect();
    let lines: usize = batch.iter().map(|o| o.items.len()).sum();
    results.push(TestResult::new(
        "orders_fit_one_load",
        oversized.is_empty(),
        if oversized.is_empty() {
            format!(
                "{} lines, {:.1} per order",
                lines,
                lines as f64 / batch.len().max(1) as f64
            )
        } else {
            format!("bad orders: {}", oversized.join(", "))
        },
    ));

    results
}

// ── 4. Swarm run ────────────────────────────────────────────────────────

fn validate_run(
    swarm: &mut PickerSwarm,
    scenario: &Scenario,
    total_orders: usize,
    text: bool,
) -> Vec<TestResult> {
    if text {
        println!("--- Swarm Run ---");
    }
    let mut results = Vec::new();
    let step = scenario.swarm.time_step;
    let entrances: HashSet<Cell> = swarm.grid().entrances().iter().copied().collect();

    let mut collisions = Vec::new();
    let mut intrusions = Vec::new();
    let mut stacked = 0u64;
    let mut overloads = 0;
    let mut off_floor = 0;
    let mut queue_grew = false;
    let mut previous_pending = swarm.pending_len();
    let mut ticks = 0u64;

    while swarm.clock() < scenario.run.duration && !(scenario.run.drain && swarm.is_drained()) {
        swarm.tick(step);
        ticks += 1;

        let mut by_cell: HashMap<Cell, Vec<Cell>> = HashMap::new();
        for agent in swarm.agents() {
            by_cell.entry(agent.position()).or_default().push(agent.home());
        }
        for (&cell, homes) in by_cell.iter().filter(|(_, homes)| homes.len() > 1) {
            if !entrances.contains(&cell) {
                collisions.push((swarm.clock(), cell));
            } else if homes.iter().any(|&home| home != cell) {
                intrusions.push((swarm.clock(), cell));
            } else {
                stacked += homes.len() as u64;
            }
        }

        for agent in swarm.agents().iter().filter(|a| !a.is_idle()) {
            let pos = agent.position();
            if agent.load().units() > LOAD_UNITS {
                overloads += 1;
            }
            if !swarm.grid().is_walkable(pos.x, pos.y) {
                off_floor += 1;
            }
        }

        let pending = swarm.pending_len();
        queue_grew |= pending > previous_pending;
        previous_pending = pending;
    }

    let stats = swarm.stats();
    let in_progress = swarm
        .agents()
        .iter()
        .filter(|a| a.current_order().is_some())
        .count();

    results.push(TestResult::new(
        "run_no_shared_cells",
        collisions.is_empty(),
        match collisions.first() {
            None => format!("{} ticks without collisions", ticks),
            Some((t, cell)) => format!(
                "{} collisions, first at t={:.1} on {}",
                collisions.len(),
                t,
                cell
            ),
        },
    ));
    results.push(TestResult::new(
        "run_entrances_hold_only_their_agents",
        intrusions.is_empty(),
        match intrusions.first() {
            None => format!("{} agent-ticks sharing a home entrance", stacked),
            Some((t, cell)) => format!(
                "{} foreign agents on entrances, first at t={:.1} on {}",
                intrusions.len(),
                t,
                cell
            ),
        },
    ));
    results.push(TestResult::new(
        "run_loads_within_capacity",
        overloads == 0,
        format!("{} overloaded agent-ticks", overloads),
    ));
    results.push(TestResult::new(
        "run_agents_on_walkable_cells",
        off_floor == 0,
        format!("{} agent-ticks off the walkable floor", off_floor),
    ));
    results.push(TestResult::new(
        "run_queue_only_drains",
        !queue_grew,
        format!("{} orders still pending", swarm.pending_len()),
    ));
    let accounted = stats.orders_completed as usize + swarm.pending_len() + in_progress;
    results.push(TestResult::new(
        "run_orders_conserved",
        accounted == total_orders,
        format!(
            "{} completed + {} pending + {} in progress = {} of {}",
            stats.orders_completed,
            swarm.pending_len(),
            in_progress,
            accounted,
            total_orders
        ),
    ));
    results.push(TestResult::new(
        "run_drained",
        !scenario.run.drain || swarm.is_drained(),
        format!(
            "{} pending, {} in progress at t={:.1}",
            swarm.pending_len(),
            in_progress,
            swarm.clock()
        ),
    ));
    results.push(TestResult::new(
        "run_made_progress",
        total_orders == 0 || stats.orders_completed > 0,
        format!(
            "{} orders completed in {:.0}s",
            stats.orders_completed, stats.sim_time
        ),
    ));

    results
}

fn print_summary(stats: &RunStats) {
    println!();
    println!("Simulation time:     {:.1}s", stats.sim_time);
    println!("Orders completed:    {}", stats.orders_completed);
    println!("Orders pending:      {}", stats.orders_pending);
    println!("Total distance:      {} cells", stats.total_distance);
    println!("Total wait time:     {:.1}s", stats.total_wait_time);
    println!("Wait timeouts:       {}", stats.wait_timeouts);
    println!("Avg turnaround:      {:.1}s", stats.average_turnaround);
    println!();
    println!(
        "  {:<10} {:>7} {:>9} {:>9} {:>10}",
        "agent", "orders", "distance", "wait(s)", "orders/h"
    );
    for a in &stats.agents {
        println!(
            "  {:<10} {:>7} {:>9} {:>9.1} {:>10.1}",
            a.name, a.orders_completed, a.distance, a.total_wait_time, a.orders_per_hour
        );
    }
}
