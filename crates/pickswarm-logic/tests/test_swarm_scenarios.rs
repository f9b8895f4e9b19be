//! End-to-end scenarios for the picker swarm.
//!
//! Exercises: Grid → PickerSwarm → tick loop → RunStats
//!
//! All tests are pure logic with ASCII floors and hand-built orders.

use std::collections::HashSet;

use pickswarm_logic::agent::{AgentEvent, PickerState};
use pickswarm_logic::config::{RightOfWay, SwarmConfig};
use pickswarm_logic::constants::{ItemSize, WeightClass, LOAD_UNITS, STORAGE_UNITS};
use pickswarm_logic::grid::{Cell, Grid, Location, StoredItem};
use pickswarm_logic::load::Load;
use pickswarm_logic::order::{OrderItem, PickOrder};
use pickswarm_logic::swarm::PickerSwarm;

const STEP: f64 = 0.1;

// ── Helpers ────────────────────────────────────────────────────────────

fn aisle_floor() -> Grid {
    Grid::from_rows(
        &[
            "#########", //
            "#S.S.S.S#", //
            "E=======X", //
            "#S.S+S.S#", //
            "#########",
        ],
        3,
    )
    .unwrap()
}

/// Two corridors crossing at (3, 3), one entrance at the end of each.
fn crossroads() -> Grid {
    Grid::from_rows(
        &[
            "###.###", //
            "###.###", //
            "###.###", //
            "E.....X", //
            "###.###", //
            "###.###", //
            "###E###",
        ],
        1,
    )
    .unwrap()
}

fn line(id: &str, size: ItemSize, location: Location) -> OrderItem {
    OrderItem {
        item_id: id.into(),
        name: format!("{id} widget"),
        size,
        location,
        pick_duration: 3.0,
    }
}

fn assert_no_shared_cells(swarm: &PickerSwarm) {
    let busy: Vec<Cell> = swarm
        .agents()
        .iter()
        .filter(|a| !a.is_idle())
        .map(|a| a.position())
        .collect();
    let unique: HashSet<&Cell> = busy.iter().collect();
    assert_eq!(
        unique.len(),
        busy.len(),
        "agents share a cell at t={:.1}: {:?}",
        swarm.clock(),
        busy
    );
}

// ── Scenario A: single agent, single item ──────────────────────────────

#[test]
fn single_agent_completes_single_item_order() {
    let mut swarm = PickerSwarm::new(aisle_floor(), SwarmConfig::with_agents(1)).unwrap();
    let entrance = swarm.grid().entrances()[0];
    swarm.add_order(PickOrder::new(
        "ORD_001",
        vec![line("SKU-1", ItemSize::Small, Location::new(3, 1, 2))],
    ));

    let stats = swarm.run_for(60.0, STEP);

    let agent = &swarm.agents()[0];
    assert_eq!(stats.orders_completed, 1);
    assert_eq!(agent.stats().orders_completed, 1);
    assert!(agent.load().is_empty());
    assert_eq!(agent.position(), entrance);
    assert_eq!(agent.state(), PickerState::Idle);
    assert_eq!(swarm.pending_len(), 0);
    assert_eq!(swarm.completed_orders()[0].order_id, "ORD_001");
}

#[test]
fn multi_item_order_visits_every_item() {
    let mut swarm = PickerSwarm::new(aisle_floor(), SwarmConfig::with_agents(1)).unwrap();
    swarm.add_order(PickOrder::new(
        "ORD_001",
        vec![
            line("SKU-1", ItemSize::Small, Location::new(1, 1, 1)),
            line("SKU-2", ItemSize::Medium, Location::new(5, 3, 1)),
            line("SKU-3", ItemSize::Small, Location::new(7, 1, 3)),
        ],
    ));

    let mut picked = Vec::new();
    while swarm.clock() < 120.0 {
        for (_, event) in swarm.tick(STEP).events {
            if let AgentEvent::Picked { item_id, .. } = event {
                picked.push(item_id);
            }
        }
    }
    assert_eq!(picked, vec!["SKU-1", "SKU-2", "SKU-3"]);
    assert_eq!(swarm.stats().orders_completed, 1);
    assert!((swarm.stats().total_pick_time - 9.0).abs() < 1e-9);
}

#[test]
fn oversized_order_is_split_into_drop_off_trips() {
    let mut swarm = PickerSwarm::new(aisle_floor(), SwarmConfig::with_agents(1)).unwrap();
    let order = PickOrder::new(
        "ORD_BIG",
        vec![
            line("SKU-L1", ItemSize::Large, Location::new(1, 1, 1)),
            line("SKU-L2", ItemSize::Large, Location::new(3, 3, 1)),
        ],
    );
    assert!(order.total_units() > LOAD_UNITS);
    swarm.add_order(order);

    let mut drop_offs = 0;
    while swarm.clock() < 200.0 && !swarm.is_drained() {
        let report = swarm.tick(STEP);
        drop_offs += report
            .events
            .iter()
            .filter(|(_, e)| matches!(e, AgentEvent::DroppedOff { .. }))
            .count();
        for agent in swarm.agents() {
            assert!(agent.load().units() <= LOAD_UNITS);
        }
    }
    assert_eq!(drop_offs, 1);
    assert_eq!(swarm.stats().orders_completed, 1);
}

// ── Scenario B: contested crossing ─────────────────────────────────────

#[test]
fn crossing_agents_never_share_a_cell() {
    let mut swarm = PickerSwarm::new(crossroads(), SwarmConfig::with_agents(2)).unwrap();
    swarm.add_orders([
        PickOrder::new("ORD_WEST", vec![]),
        PickOrder::new("ORD_SOUTH", vec![]),
    ]);

    while swarm.clock() < 60.0 && !swarm.is_drained() {
        swarm.tick(STEP);
        assert_no_shared_cells(&swarm);
    }

    let stats = swarm.stats();
    assert_eq!(stats.orders_completed, 2);
    assert!(stats.total_wait_time > 0.0);
    assert!(stats.agents.iter().any(|a| a.total_wait_time > 0.0));
}

#[test]
fn list_order_gives_first_agent_right_of_way() {
    let mut swarm = PickerSwarm::new(crossroads(), SwarmConfig::with_agents(2)).unwrap();
    swarm.add_orders([
        PickOrder::new("ORD_WEST", vec![]),
        PickOrder::new("ORD_SOUTH", vec![]),
    ]);
    swarm.run_until_drained(60.0, STEP);

    let stats = swarm.stats();
    assert_eq!(stats.agents[0].total_wait_time, 0.0);
    assert!(stats.agents[1].total_wait_time > 0.0);
    assert_eq!(swarm.completed_orders()[0].order_id, "ORD_WEST");
}

#[test]
fn shuffled_right_of_way_still_avoids_collisions() {
    let mut config = SwarmConfig::with_agents(2);
    config.right_of_way = RightOfWay::Shuffled;
    config.seed = 99;
    let mut swarm = PickerSwarm::new(crossroads(), config).unwrap();
    swarm.add_orders([
        PickOrder::new("ORD_WEST", vec![]),
        PickOrder::new("ORD_SOUTH", vec![]),
    ]);

    while swarm.clock() < 60.0 && !swarm.is_drained() {
        swarm.tick(STEP);
        assert_no_shared_cells(&swarm);
    }
    assert_eq!(swarm.stats().orders_completed, 2);
}

// ── Scenario C: more orders than agents ────────────────────────────────

#[test]
fn excess_orders_wait_in_queue() {
    let mut swarm = PickerSwarm::new(aisle_floor(), SwarmConfig::with_agents(2)).unwrap();
    swarm.add_orders((0..5).map(|i| {
        PickOrder::new(
            format!("ORD_{i:03}"),
            vec![line(
                &format!("SKU-{i}"),
                ItemSize::Small,
                Location::new(1 + 2 * (i % 4), 1, 1),
            )],
        )
    }));
    assert_eq!(swarm.pending_len(), 5);

    let first = swarm.tick(STEP);
    assert_eq!(first.orders_assigned, 2);
    assert_eq!(swarm.pending_len(), 3);

    let mut previous = swarm.pending_len();
    while swarm.clock() < 400.0 && !swarm.is_drained() {
        let report = swarm.tick(STEP);
        let now = swarm.pending_len();
        assert!(now <= previous);
        assert_eq!(previous - now, report.orders_assigned);
        previous = now;
    }
    assert!(swarm.is_drained());
    assert_eq!(swarm.stats().orders_completed, 5);

    let ids: HashSet<&str> = swarm
        .completed_orders()
        .iter()
        .map(|c| c.order_id.as_str())
        .collect();
    assert_eq!(ids.len(), 5);
    assert!(swarm.completed_orders().iter().all(|c| c.turnaround() > 0.0));
}

// ── Spawn entrances ────────────────────────────────────────────────────

#[test]
fn extra_agents_share_spawn_entrances_and_return_home() {
    let grid = Grid::from_rows(
        &[
            "#######", //
            "E=====X", //
            "#S.S.S#", //
            "E=====#",
        ],
        1,
    )
    .unwrap();
    let entrances = grid.entrances().to_vec();
    let mut swarm = PickerSwarm::new(grid, SwarmConfig::with_agents(3)).unwrap();

    let homes: Vec<Cell> = swarm.agents().iter().map(|a| a.home()).collect();
    assert_eq!(homes, vec![entrances[0], entrances[1], entrances[0]]);
    assert_eq!(swarm.occupancy_map()[&entrances[0]].len(), 2);

    swarm.add_orders((0..3).map(|i| {
        PickOrder::new(
            format!("ORD_{i:03}"),
            vec![line(&format!("SKU-{i}"), ItemSize::Small, Location::new(1 + 2 * i, 2, 1))],
        )
    }));
    swarm.run_until_drained(600.0, STEP);

    assert!(swarm.is_drained());
    assert_eq!(swarm.stats().orders_completed, 3);
    for agent in swarm.agents() {
        assert_eq!(agent.position(), agent.home());
    }
}

// ── Invariants ─────────────────────────────────────────────────────────

#[test]
fn walkability_matches_cell_type() {
    let grid = aisle_floor();
    for y in -1..=grid.depth() {
        for x in -1..=grid.width() {
            assert_eq!(grid.is_walkable(x, y), grid.cell_type(x, y).is_walkable());
        }
    }
    assert!(!grid.is_walkable(-1, 0));
    assert!(!grid.is_walkable(0, grid.depth()));
}

#[test]
fn load_never_exceeds_capacity() {
    let mut load = Load::new();
    let sizes = [
        ItemSize::Medium,
        ItemSize::Large,
        ItemSize::Small,
        ItemSize::Medium,
        ItemSize::Small,
    ];
    for (i, size) in sizes.into_iter().enumerate() {
        let before = load.clone();
        let accepted = load.add_item(line(&format!("SKU-{i}"), size, Location::new(1, 1, 1)));
        if !accepted {
            assert_eq!(load, before);
        }
        assert!(load.units() <= LOAD_UNITS);
    }
    assert_eq!(load.units(), 4);
}

#[test]
fn storage_respects_capacity_and_weight_levels() {
    let mut grid = aisle_floor();
    let mut n = 0;
    for level in 1..=3 {
        for weight in WeightClass::ALL {
            for size in ItemSize::ALL {
                let item = StoredItem {
                    id: format!("ITEM_{n:03}"),
                    size,
                    weight,
                };
                n += 1;
                grid.place_item(item, Location::new(3, 1, level));
            }
        }
    }
    grid.remove_item("ITEM_000", Location::new(3, 1, 1));

    for slot in grid.storage_locations() {
        assert!(slot.units_used() <= STORAGE_UNITS);
        for item in slot.items() {
            assert!(item.weight.allows_level(slot.location().level));
        }
    }
    assert!(grid.stats().stored_items > 0);
}
