//! Swarm coordinator: owns the agents, the pending-order queue and the
//! simulation clock.
//!
//! Each tick runs in three phases:
//!
//! 1. snapshot every agent into a [`PeerSnapshot`] list,
//! 2. update agents one at a time in right-of-way order, refreshing the
//!    mover's snapshot right after its update so later agents see the
//!    committed move,
//! 3. hand pending orders to idle agents, oldest first.

use std::collections::{BTreeMap, VecDeque};

use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::agent::{AgentEvent, AgentId, AgentStatus, PeerSnapshot, PickerAgent};
use crate::config::{ConfigError, RightOfWay, SwarmConfig};
use crate::grid::{Cell, Grid};
use crate::order::{PickOrder, Priority};

/// Seconds per hour; one clock unit counts as one second.
const SECONDS_PER_HOUR: f64 = 3600.0;

/// Ledger entry for a finished order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletedOrder {
    pub order_id: String,
    pub agent: AgentId,
    pub priority: Priority,
    pub created_at: f64,
    pub completed_at: f64,
}

impl CompletedOrder {
    /// Time from enqueue to completion.
    pub fn turnaround(&self) -> f64 {
        self.completed_at - self.created_at
    }
}

/// Summary of one call to [`PickerSwarm::tick`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickReport {
    pub clock: f64,
    pub pending_orders: usize,
    /// Agents not idle after the tick.
    pub active_agents: usize,
    pub orders_assigned: usize,
    pub orders_completed: usize,
    pub events: Vec<(AgentId, AgentEvent)>,
}

/// Per-agent totals with derived throughput.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentThroughput {
    pub id: AgentId,
    pub name: String,
    pub orders_completed: u32,
    pub distance: u64,
    pub total_wait_time: f64,
    pub total_pick_time: f64,
    pub orders_per_hour: f64,
}

/// Aggregate statistics, available at any point in a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunStats {
    pub sim_time: f64,
    pub orders_completed: u32,
    pub orders_pending: usize,
    pub total_distance: u64,
    pub total_wait_time: f64,
    pub total_pick_time: f64,
    pub wait_timeouts: u32,
    pub average_turnaround: f64,
    pub agents: Vec<AgentThroughput>,
}

pub struct PickerSwarm {
    grid: Grid,
    agents: Vec<PickerAgent>,
    pending: VecDeque<PickOrder>,
    completed: Vec<CompletedOrder>,
    clock: f64,
    config: SwarmConfig,
    rng: StdRng,
}

impl PickerSwarm {
    /// Build a swarm of `config.agent_count` idle agents, spawned on the
    /// grid's entrances round-robin.
    pub fn new(grid: Grid, config: SwarmConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let entrances = grid.entrances();
        let agents = (0..config.agent_count)
            .map(|i| {
                let home = entrances[i % entrances.len()];
                PickerAgent::new(AgentId(i as u32 + 1), home, config.timing)
            })
            .collect();

        info!(
            "Swarm ready: {} agents on a {}x{} floor, {} entrances, right of way {:?}",
            config.agent_count,
            grid.width(),
            grid.depth(),
            entrances.len(),
            config.right_of_way
        );

        Ok(Self {
            rng: StdRng::seed_from_u64(config.seed),
            grid,
            agents,
            pending: VecDeque::new(),
            completed: Vec::new(),
            clock: 0.0,
            config,
        })
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn config(&self) -> &SwarmConfig {
        &self.config
    }

    pub fn clock(&self) -> f64 {
        self.clock
    }

    pub fn agents(&self) -> &[PickerAgent] {
        &self.agents
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn pending_orders(&self) -> impl Iterator<Item = &PickOrder> {
        self.pending.iter()
    }

    pub fn completed_orders(&self) -> &[CompletedOrder] {
        &self.completed
    }

    /// Enqueue an order, stamping it with the current clock.
    pub fn add_order(&mut self, mut order: PickOrder) {
        order.created_at = self.clock;
        debug!(
            "Queued {} ({} items, {} units, {:?})",
            order.id,
            order.items.len(),
            order.total_units(),
            order.priority
        );
        self.pending.push_back(order);
    }

    pub fn add_orders(&mut self, orders: impl IntoIterator<Item = PickOrder>) {
        for order in orders {
            self.add_order(order);
        }
    }

    /// Give the oldest pending orders to idle agents, in agent-list order.
    /// Returns the number of orders handed out.
    pub fn assign_orders(&mut self) -> usize {
        let mut assigned = 0;
        for agent in self.agents.iter_mut() {
            if self.pending.is_empty() {
                break;
            }
            if !agent.is_idle() || agent.current_order().is_some() {
                continue;
            }
            let Some(order) = self.pending.pop_front() else {
                break;
            };
            let order_id = order.id.clone();
            match agent.assign_order(order, &self.grid) {
                Ok(()) => {
                    info!("Assigned {} to {} at t={:.1}", order_id, agent.id(), self.clock);
                    assigned += 1;
                }
                Err(order) => self.pending.push_front(order),
            }
        }
        assigned
    }

    /// Advance the clock by `step`, update every agent once, then assign
    /// orders. A non-positive step leaves the clock and agents untouched.
    pub fn tick(&mut self, step: f64) -> TickReport {
        let mut events = Vec::new();

        if step > 0.0 {
            self.clock += step;
            let now = self.clock;
            let lookahead = self.config.congestion_lookahead;

            let mut peers: Vec<PeerSnapshot> =
                self.agents.iter().map(|a| a.snapshot(lookahead)).collect();
            for i in self.update_order() {
                let agent = &mut self.agents[i];
                if let Some(event) = agent.update(now, &self.grid, &peers) {
                    events.push((agent.id(), event));
                }
                peers[i] = agent.snapshot(lookahead);
            }
        }

        let mut orders_completed = 0;
        for (agent, event) in &events {
            if let AgentEvent::OrderCompleted {
                order_id,
                priority,
                created_at,
            } = event
            {
                info!(
                    "{} completed {} at t={:.1} ({:.1} after enqueue)",
                    agent,
                    order_id,
                    self.clock,
                    self.clock - created_at
                );
                self.completed.push(CompletedOrder {
                    order_id: order_id.clone(),
                    agent: *agent,
                    priority: *priority,
                    created_at: *created_at,
                    completed_at: self.clock,
                });
                orders_completed += 1;
            }
        }

        let orders_assigned = self.assign_orders();

        TickReport {
            clock: self.clock,
            pending_orders: self.pending.len(),
            active_agents: self.agents.iter().filter(|a| !a.is_idle()).count(),
            orders_assigned,
            orders_completed,
            events,
        }
    }

    fn update_order(&mut self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.agents.len()).collect();
        if self.config.right_of_way == RightOfWay::Shuffled {
            order.shuffle(&mut self.rng);
        }
        order
    }

    /// Tick until the clock reaches `duration` (an absolute clock value).
    pub fn run_for(&mut self, duration: f64, step: f64) -> RunStats {
        if !(step > 0.0) {
            warn!("run_for needs a positive step, got {}", step);
            return self.stats();
        }
        while self.clock < duration {
            self.tick(step);
        }
        self.stats()
    }

    /// Tick until no work is left or the clock reaches `max_duration`.
    pub fn run_until_drained(&mut self, max_duration: f64, step: f64) -> RunStats {
        if !(step > 0.0) {
            warn!("run_until_drained needs a positive step, got {}", step);
            return self.stats();
        }
        while self.clock < max_duration && !self.is_drained() {
            self.tick(step);
        }
        if !self.is_drained() {
            warn!(
                "Stopped at t={:.1} with {} orders pending and {} agents busy",
                self.clock,
                self.pending.len(),
                self.agents.iter().filter(|a| !a.is_idle()).count()
            );
        }
        self.stats()
    }

    /// No pending orders and every agent idle.
    pub fn is_drained(&self) -> bool {
        self.pending.is_empty() && self.agents.iter().all(PickerAgent::is_idle)
    }

    pub fn agent_statuses(&self) -> Vec<AgentStatus> {
        self.agents.iter().map(PickerAgent::status).collect()
    }

    /// Which agents stand on each occupied cell.
    pub fn occupancy_map(&self) -> BTreeMap<Cell, Vec<AgentId>> {
        let mut map: BTreeMap<Cell, Vec<AgentId>> = BTreeMap::new();
        for agent in &self.agents {
            map.entry(agent.position()).or_default().push(agent.id());
        }
        map
    }

    pub fn stats(&self) -> RunStats {
        let hours = self.clock / SECONDS_PER_HOUR;
        let agents: Vec<AgentThroughput> = self
            .agents
            .iter()
            .map(|a| {
                let s = a.stats();
                AgentThroughput {
                    id: a.id(),
                    name: a.id().to_string(),
                    orders_completed: s.orders_completed,
                    distance: s.distance,
                    total_wait_time: s.total_wait_time,
                    total_pick_time: s.total_pick_time,
                    orders_per_hour: if hours > 0.0 {
                        s.orders_completed as f64 / hours
                    } else {
                        0.0
                    },
                }
            })
            .collect();

        let average_turnaround = if self.completed.is_empty() {
            0.0
        } else {
            self.completed
                .iter()
                .map(CompletedOrder::turnaround)
                .sum::<f64>()
                / self.completed.len() as f64
        };

        RunStats {
            sim_time: self.clock,
            orders_completed: agents.iter().map(|a| a.orders_completed).sum(),
            orders_pending: self.pending.len(),
            total_distance: agents.iter().map(|a| a.distance).sum(),
            total_wait_time: agents.iter().map(|a| a.total_wait_time).sum(),
            total_pick_time: agents.iter().map(|a| a.total_pick_time).sum(),
            wait_timeouts: self.agents.iter().map(|a| a.stats().wait_timeouts).sum(),
            average_turnaround,
            agents,
        }
    }
}
