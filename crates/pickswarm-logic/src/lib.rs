//! Pure simulation logic for PickSwarm.
//!
//! This crate contains the whole picker coordination engine and nothing
//! else: no file I/O, no logger installation, no global random state.
//! Functions take plain data and return results, so every piece is
//! unit-testable and a host driver decides how floors and orders are
//! produced.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`agent`] | Picker state machine, peer snapshots, per-agent stats |
//! | [`config`] | Swarm tunables (timings, right-of-way, seed) and validation |
//! | [`constants`] | Cell types, item sizes, weight classes, unit costs, timings |
//! | [`grid`] | Warehouse floor: cell classes, landmarks, shelf storage, ASCII maps |
//! | [`load`] | Carried-item capacity accounting and movement penalty |
//! | [`order`] | Order items, pick orders, priorities |
//! | [`pathfinding`] | A* over the 4-connected walkable floor |
//! | [`swarm`] | Coordinator: order queue, assignment, tick loop, run statistics |
//!
//! # Host driver loop
//!
//! ```
//! use pickswarm_logic::config::SwarmConfig;
//! use pickswarm_logic::grid::Grid;
//! use pickswarm_logic::order::PickOrder;
//! use pickswarm_logic::swarm::PickerSwarm;
//!
//! let grid = Grid::from_rows(&["E....X"], 1).unwrap();
//! let mut swarm = PickerSwarm::new(grid, SwarmConfig::with_agents(1)).unwrap();
//! swarm.add_order(PickOrder::new("ORD_001", vec![]));
//! let stats = swarm.run_for(30.0, 0.1);
//! assert_eq!(stats.orders_completed, 1);
//! ```

pub mod agent;
pub mod config;
pub mod constants;
pub mod grid;
pub mod load;
pub mod order;
pub mod pathfinding;
pub mod swarm;
