//! Cyber Arena Core - Adversarial Attack/Defense Game Engine
//!
//! This library holds the two pieces of the game that carry real logic:
//! 1. **Environment**: the state-transition model of the system under attack,
//!    with defender effects resolved before attacker effects in every step
//! 2. **Learning Agent**: a red team attacker that learns a tabular value
//!    function with epsilon-greedy exploration, strategy modes and reward shaping
//!
//! Everything else (defender policies, pacing, export) lives in `arena_sim`.

pub mod environment;
pub mod agent;
pub mod value_table;
pub mod strategy;
pub mod history;

// Re-export key types for convenience
pub use environment::NetworkEnvironment;
pub use agent::{AgentConfig, AgentStats, RedTeamAgent};
pub use value_table::{state_key, ActionValues, ValueTable};
pub use strategy::Strategy;
pub use history::BoundedHistory;
