//! Swarm configuration: agent count, time step, timings, right-of-way.
//!
//! All fields have defaults matching [`crate::constants`], so a config file
//! only needs to name what it overrides.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{timing, CONGESTION_LOOKAHEAD};

/// Per-agent timing parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timing {
    /// Base time to advance one cell.
    pub move_quantum: f64,
    /// Extra time per cell for each carried load unit.
    pub load_penalty_per_unit: f64,
    /// Continuous blocking time before a forced congestion-avoidance replan.
    pub wait_timeout: f64,
    /// Dwell at the exit before dropping off.
    pub exit_dwell: f64,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            move_quantum: timing::MOVE_QUANTUM,
            load_penalty_per_unit: timing::LOAD_PENALTY_PER_UNIT,
            wait_timeout: timing::WAIT_TIMEOUT,
            exit_dwell: timing::EXIT_DWELL,
        }
    }
}

/// Order in which agents are updated within a tick.
///
/// Agents updated earlier see the previous positions of later agents and
/// so win contested cells.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RightOfWay {
    /// Always agent-list order.
    #[default]
    ListOrder,
    /// A fresh seeded permutation every tick.
    Shuffled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwarmConfig {
    pub agent_count: usize,
    /// Default step used by the harness driver.
    pub time_step: f64,
    pub right_of_way: RightOfWay,
    /// Seed for the coordinator's random source.
    pub seed: u64,
    /// Upcoming peer path cells blocked by a congestion-avoidance replan.
    pub congestion_lookahead: usize,
    pub timing: Timing,
}

impl Default for SwarmConfig {
    fn default() -> Self {
        Self {
            agent_count: 4,
            time_step: timing::TIME_STEP,
            right_of_way: RightOfWay::ListOrder,
            seed: 42,
            congestion_lookahead: CONGESTION_LOOKAHEAD,
            timing: Timing::default(),
        }
    }
}

impl SwarmConfig {
    pub fn with_agents(agent_count: usize) -> Self {
        Self {
            agent_count,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.agent_count == 0 {
            return Err(ConfigError::NoAgents);
        }
        if !(self.time_step > 0.0) {
            return Err(ConfigError::NonPositive {
                field: "time_step",
                value: self.time_step,
            });
        }
        if !(self.timing.move_quantum > 0.0) {
            return Err(ConfigError::NonPositive {
                field: "timing.move_quantum",
                value: self.timing.move_quantum,
            });
        }
        let non_negative = [
            ("timing.load_penalty_per_unit", self.timing.load_penalty_per_unit),
            ("timing.wait_timeout", self.timing.wait_timeout),
            ("timing.exit_dwell", self.timing.exit_dwell),
        ];
        for (field, value) in non_negative {
            if !(value >= 0.0) {
                return Err(ConfigError::Negative { field, value });
            }
        }
        if self.congestion_lookahead == 0 {
            return Err(ConfigError::NoLookahead);
        }
        Ok(())
    }
}

/// Invalid swarm configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    NoAgents,
    NonPositive { field: &'static str, value: f64 },
    Negative { field: &'static str, value: f64 },
    NoLookahead,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::NoAgents => write!(f, "swarm needs at least one agent"),
            ConfigError::NonPositive { field, value } => {
                write!(f, "{} must be positive, got {}", field, value)
            }
            ConfigError::Negative { field, value } => {
                write!(f, "{} must not be negative, got {}", field, value)
            }
            ConfigError::NoLookahead => write!(f, "congestion_lookahead must be at least 1"),
        }
    }
}

impl std::error::Error for ConfigError {}
