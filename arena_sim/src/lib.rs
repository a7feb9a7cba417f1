//! Red/Blue Cyber Arena - match harness
//!
//! Pits the learning red team agent from `arena_core` against a blue team
//! defender and plays rounds until one side wins.
//!
//! # Round Loop
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                          Arena                           │
//! │                                                          │
//! │   reset ──► defender.choose ──► agent.choose_action      │
//! │               ▲                        │                 │
//! │               │                        ▼                 │
//! │         RoundObserver ◄── agent.learn ◄── env.step       │
//! │                                                          │
//! │   until breach (red) | detection > 4 (blue) | step cap   │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! All randomness is derived from a single 64-bit seed, and pacing goes
//! through an `ArenaContext`, so a match on [`SimContext`] replays exactly
//! and finishes instantly.
//!
//! # Usage
//!
//! ```ignore
//! use arena_sim::{Arena, ArenaConfig, MatchRunner, SimContext, TracingObserver};
//!
//! let arena = Arena::new(ArenaConfig { seed: 42, rounds: 10, ..Default::default() })?;
//! let report = MatchRunner::new(arena)
//!     .run(&SimContext::new(), TracingObserver)
//!     .await;
//! ```

mod context;
pub mod defender;
mod exporter;
pub mod profiles;
mod runner;
mod world;

pub use context::SimContext;
pub use defender::{recommend_action, DefenderLedger, DefenderPolicy, DefenderSummary, Difficulty};
pub use exporter::{MatchExport, MatchRecorder, RoundSummary, StepFrame};
pub use profiles::DefenderProfile;
pub use runner::{MatchReport, MatchRunner, NullObserver, Pacing, RoundObserver, TracingObserver};
pub use world::{Arena, ArenaConfig, RoundOutcome, RoundResult, Scoreboard, StepRecord};
