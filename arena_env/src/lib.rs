//! Cyber Arena Environment Abstraction Layer
//!
//! Shared vocabulary for the red/blue cyber arena: the round-scoped
//! [`EnvironmentState`] record, the closed attacker and defender action sets,
//! the crate-wide error type, and the [`ArenaContext`] trait that lets a match
//! run against either a real clock (tokio) or a virtual one (simulation).
//!
//! # Core Concept
//!
//! The game core never sleeps and never reads a clock. Drivers that want
//! human-watchable pacing go through an [`ArenaContext`]:
//! - **Production**: [`TokioContext`] sleeps for real
//! - **Simulation**: a virtual clock advances instantly
//!
//! # Example
//!
//! ```ignore
//! use arena_env::{ArenaContext, TokioContext};
//!
//! async fn paced_loop<Ctx: ArenaContext>(ctx: &Ctx) {
//!     loop {
//!         play_one_step();
//!         ctx.sleep(Duration::from_millis(500)).await;
//!     }
//! }
//! ```

mod context;
mod types;
mod error;
mod tokio_impl;

pub use context::ArenaContext;
pub use types::{AttackAction, DefenseAction, EnvironmentState};
pub use error::ArenaError;
pub use tokio_impl::TokioContext;
