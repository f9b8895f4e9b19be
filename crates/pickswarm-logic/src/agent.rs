//! Picker agent: the per-agent state machine advanced once per tick.
//!
//! ```text
//! Idle → MovingToItem → Picking ─┬─→ MovingToItem (next item fits)
//!                                └─→ MovingToExit → Exiting ─┬─→ MovingToItem (drop-off, items left)
//!                                                            └─→ Idle (order complete)
//! MovingToItem / MovingToExit ⇄ Waiting (next cell contested)
//! ```
//!
//! An agent never reads another agent directly. Each update receives
//! [`PeerSnapshot`]s of every agent (its own entry is skipped) and decides
//! against those. Movement is rate-limited to one cell per
//! `move_quantum + load penalty` of clock time.

use std::collections::HashSet;
use std::fmt;

use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::config::Timing;
use crate::grid::{Cell, Grid};
use crate::load::Load;
use crate::order::{OrderItem, PickOrder, Priority};
use crate::pathfinding::PathPlanner;

/// Stable agent identity, 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentId(pub u32);

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PICKER_{:02}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PickerState {
    /// At the entrance, waiting for an order.
    Idle,
    MovingToItem,
    /// Taking the current order item off the shelf.
    Picking,
    MovingToExit,
    /// Next cell is contested by a peer.
    Waiting,
    /// Dwelling at the exit.
    Exiting,
}

impl PickerState {
    pub fn is_moving(self) -> bool {
        matches!(self, PickerState::MovingToItem | PickerState::MovingToExit)
    }
}

/// What one agent exposes to the others during a tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeerSnapshot {
    pub id: AgentId,
    pub position: Cell,
    /// Next cells of the agent's planned path, nearest first.
    pub upcoming: Vec<Cell>,
}

impl PeerSnapshot {
    pub fn next_step(&self) -> Option<Cell> {
        self.upcoming.first().copied()
    }
}

/// Why a step was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Conflict {
    /// Peer is about to step into our cell while we step into theirs.
    HeadOn,
    /// Peer is standing on our next cell.
    Occupied,
}

/// Notable things that happened during one agent update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AgentEvent {
    Picked {
        order_id: String,
        item_id: String,
    },
    /// Load emptied at the exit with order items still to pick.
    DroppedOff { order_id: String },
    OrderCompleted {
        order_id: String,
        priority: Priority,
        created_at: f64,
    },
}

/// Cumulative per-agent counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentStats {
    /// Cells moved.
    pub distance: u64,
    pub orders_completed: u32,
    pub total_wait_time: f64,
    pub total_pick_time: f64,
    /// Waits that ended in a forced congestion-avoidance replan.
    pub wait_timeouts: u32,
}

/// Read-only status record for reporting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentStatus {
    pub id: AgentId,
    pub name: String,
    pub position: Cell,
    pub state: PickerState,
    pub load_units: u32,
    pub items_carried: usize,
    pub current_order: Option<String>,
    pub distance: u64,
    pub orders_completed: u32,
    pub total_wait_time: f64,
}

#[derive(Debug, Clone)]
pub struct PickerAgent {
    id: AgentId,
    home: Cell,
    position: Cell,
    target: Option<Cell>,
    /// Cells still to walk, excluding the current position.
    path: Vec<Cell>,
    path_index: usize,
    state: PickerState,
    /// Moving state to return to when a wait ends.
    resume_state: PickerState,
    order: Option<PickOrder>,
    item_index: usize,
    load: Load,
    timing: Timing,
    last_move_time: f64,
    phase_started: f64,
    wait_started: f64,
    stats: AgentStats,
}

impl PickerAgent {
    /// Create an idle agent standing on `home`, where it returns after
    /// every completed order.
    pub fn new(id: AgentId, home: Cell, timing: Timing) -> Self {
        Self {
            id,
            home,
            position: home,
            target: None,
            path: Vec::new(),
            path_index: 0,
            state: PickerState::Idle,
            resume_state: PickerState::MovingToItem,
            order: None,
            item_index: 0,
            load: Load::new(),
            timing,
            last_move_time: 0.0,
            phase_started: 0.0,
            wait_started: 0.0,
            stats: AgentStats::default(),
        }
    }

    pub fn id(&self) -> AgentId {
        self.id
    }

    pub fn home(&self) -> Cell {
        self.home
    }

    pub fn position(&self) -> Cell {
        self.position
    }

    pub fn target(&self) -> Option<Cell> {
        self.target
    }

    pub fn state(&self) -> PickerState {
        self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == PickerState::Idle
    }

    pub fn load(&self) -> &Load {
        &self.load
    }

    pub fn current_order(&self) -> Option<&PickOrder> {
        self.order.as_ref()
    }

    pub fn item_index(&self) -> usize {
        self.item_index
    }

    pub fn stats(&self) -> &AgentStats {
        &self.stats
    }

    /// Remaining planned cells, nearest first.
    pub fn remaining_path(&self) -> &[Cell] {
        self.path.get(self.path_index..).unwrap_or(&[])
    }

    /// Time to advance one cell with the current load.
    pub fn move_delay(&self) -> f64 {
        self.timing.move_quantum + self.load.penalty_with(self.timing.load_penalty_per_unit)
    }

    pub fn snapshot(&self, lookahead: usize) -> PeerSnapshot {
        PeerSnapshot {
            id: self.id,
            position: self.position,
            upcoming: self.remaining_path().iter().take(lookahead).copied().collect(),
        }
    }

    pub fn status(&self) -> AgentStatus {
        AgentStatus {
            id: self.id,
            name: self.id.to_string(),
            position: self.position,
            state: self.state,
            load_units: self.load.units(),
            items_carried: self.load.items().len(),
            current_order: self.order.as_ref().map(|o| o.id.clone()),
            distance: self.stats.distance,
            orders_completed: self.stats.orders_completed,
            total_wait_time: self.stats.total_wait_time,
        }
    }

    /// Take on `order` if idle with no current order; otherwise hand it back.
    pub fn assign_order(&mut self, order: PickOrder, grid: &Grid) -> Result<(), PickOrder> {
        if self.state != PickerState::Idle || self.order.is_some() {
            return Err(order);
        }
        self.order = Some(order);
        self.item_index = 0;
        self.load.clear();
        self.plan_next_item(grid);
        Ok(())
    }

    /// Advance this agent to clock time `now`.
    pub fn update(&mut self, now: f64, grid: &Grid, peers: &[PeerSnapshot]) -> Option<AgentEvent> {
        match self.state {
            PickerState::Idle => None,
            PickerState::MovingToItem | PickerState::MovingToExit => {
                self.update_movement(now, grid, peers)
            }
            PickerState::Picking => self.update_picking(now, grid),
            PickerState::Waiting => self.update_waiting(now, grid, peers),
            PickerState::Exiting => self.update_exiting(now, grid),
        }
    }

    fn current_item(&self) -> Option<&OrderItem> {
        self.order.as_ref()?.items.get(self.item_index)
    }

    fn has_remaining_items(&self) -> bool {
        self.order
            .as_ref()
            .map_or(false, |o| self.item_index < o.items.len())
    }

    /// Head for the next item if it fits, otherwise for the exit.
    fn plan_next_item(&mut self, grid: &Grid) {
        self.path.clear();
        self.path_index = 0;

        let next = self
            .current_item()
            .map(|item| (item.location, self.load.can_carry(item)));
        match next {
            Some((location, true)) => {
                let access = grid
                    .access_point(location.x, location.y)
                    .unwrap_or_else(|| location.cell());
                self.target = Some(access);
                self.state = PickerState::MovingToItem;
            }
            _ => {
                self.target = Some(grid.exit());
                self.state = PickerState::MovingToExit;
            }
        }
    }

    fn update_movement(
        &mut self,
        now: f64,
        grid: &Grid,
        peers: &[PeerSnapshot],
    ) -> Option<AgentEvent> {
        let target = self.target?;

        if self.path_index >= self.path.len() {
            self.replan(grid, peers, false);
        }

        if now - self.last_move_time < self.move_delay() {
            return None;
        }

        if let Some((peer, conflict)) = self.conflict(peers) {
            trace!(
                "{} at {} blocked by {} ({:?})",
                self.id,
                self.position,
                peer,
                conflict
            );
            self.resume_state = self.state;
            self.state = PickerState::Waiting;
            self.wait_started = now;
            return None;
        }

        if let Some(&next) = self.path.get(self.path_index) {
            self.position = next;
            self.path_index += 1;
            self.last_move_time = now;
            self.stats.distance += 1;
        }

        if self.position == target {
            self.phase_started = now;
            self.path.clear();
            self.path_index = 0;
            self.state = match self.state {
                PickerState::MovingToItem => PickerState::Picking,
                _ => PickerState::Exiting,
            };
        }
        None
    }

    fn update_picking(&mut self, now: f64, grid: &Grid) -> Option<AgentEvent> {
        let Some(duration) = self.current_item().map(|i| i.pick_duration) else {
            self.plan_next_item(grid);
            return None;
        };
        if now - self.phase_started < duration {
            return None;
        }

        let item = self.current_item()?.clone();
        let item_id = item.item_id.clone();
        if !self.load.add_item(item) {
            // Does not fit after all: drop off first and come back for it.
            self.plan_next_item(grid);
            return None;
        }
        self.stats.total_pick_time += duration;
        self.item_index += 1;
        self.plan_next_item(grid);

        Some(AgentEvent::Picked {
            order_id: self.order.as_ref().map(|o| o.id.clone()).unwrap_or_default(),
            item_id,
        })
    }

    fn update_waiting(
        &mut self,
        now: f64,
        grid: &Grid,
        peers: &[PeerSnapshot],
    ) -> Option<AgentEvent> {
        let waited = now - self.wait_started;
        if self.conflict(peers).is_none() {
            self.stats.total_wait_time += waited;
            self.state = self.resume_state;
        } else if waited > self.timing.wait_timeout {
            debug!(
                "{} blocked at {} for {:.1}, replanning around congestion",
                self.id, self.position, waited
            );
            self.stats.total_wait_time += waited;
            self.stats.wait_timeouts += 1;
            self.replan(grid, peers, true);
            self.state = self.resume_state;
        }
        None
    }

    fn update_exiting(&mut self, now: f64, grid: &Grid) -> Option<AgentEvent> {
        if now - self.phase_started < self.timing.exit_dwell {
            return None;
        }
        self.load.clear();

        if self.has_remaining_items() {
            let order_id = self.order.as_ref().map(|o| o.id.clone()).unwrap_or_default();
            debug!(
                "{} dropped off part of {}, {} items left",
                self.id,
                order_id,
                self.order.as_ref().map_or(0, |o| o.items.len()) - self.item_index
            );
            self.plan_next_item(grid);
            return Some(AgentEvent::DroppedOff { order_id });
        }

        let order = self.order.take();
        self.stats.orders_completed += 1;
        self.item_index = 0;
        self.target = None;
        self.path.clear();
        self.path_index = 0;
        self.position = self.home;
        self.state = PickerState::Idle;

        order.map(|o| AgentEvent::OrderCompleted {
            order_id: o.id,
            priority: o.priority,
            created_at: o.created_at,
        })
    }

    /// Plan a fresh path to the target, routing around peers' positions and,
    /// when `avoid_congestion` is set, their upcoming cells too. If that
    /// leaves no route, upcoming cells are dropped first and peers' positions
    /// last.
    fn replan(&mut self, grid: &Grid, peers: &[PeerSnapshot], avoid_congestion: bool) {
        let Some(target) = self.target else {
            return;
        };
        let planner = PathPlanner::new(grid);
        let me = self.id;
        let others = || peers.iter().filter(move |p| p.id != me);

        let occupied: HashSet<Cell> = others().map(|p| p.position).collect();
        let mut path = Vec::new();
        if avoid_congestion {
            let mut congested = occupied.clone();
            congested.extend(others().flat_map(|p| p.upcoming.iter().copied()));
            path = planner.find_path(self.position, target, &congested);
            if path.is_empty() {
                trace!("{} has no route around congestion, keeping to free cells", self.id);
            }
        }
        if path.is_empty() {
            path = planner.find_path(self.position, target, &occupied);
        }
        if path.is_empty() {
            trace!("{} has no clear route to {}, ignoring peers", self.id, target);
            path = planner.find_path(self.position, target, &HashSet::new());
        }
        if !path.is_empty() {
            path.remove(0);
        }
        self.path = path;
        self.path_index = 0;
    }

    /// First peer that prevents the next step, checked in peer order.
    fn conflict(&self, peers: &[PeerSnapshot]) -> Option<(AgentId, Conflict)> {
        let next = *self.path.get(self.path_index)?;
        peers
            .iter()
            .filter(|p| p.id != self.id)
            .find_map(|peer| {
                if peer.next_step() == Some(self.position) && peer.position == next {
                    Some((peer.id, Conflict::HeadOn))
                } else if peer.position == next {
                    Some((peer.id, Conflict::Occupied))
                } else {
                    None
                }
            })
    }
}
