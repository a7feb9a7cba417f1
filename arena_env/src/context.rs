//! Clock and pacing abstraction for match drivers.

use async_trait::async_trait;
use std::time::Duration;

/// The interface a match driver uses for time.
///
/// # Implementations
///
/// - **Production**: `TokioContext` - wraps `tokio::time`
/// - **Simulation**: `SimContext` - a virtual clock advanced by `sleep`
///
/// # Determinism
///
/// The game itself never consults the context. Only the pacing between steps
/// and rounds does, so swapping contexts never changes a seeded outcome.
#[async_trait]
pub trait ArenaContext: Send + Sync + 'static {
    /// Returns the monotonic time since context creation.
    ///
    /// In simulation, this is the virtual clock time.
    fn now(&self) -> Duration;

    /// Suspends execution for the given duration.
    ///
    /// In production: wraps `tokio::time::sleep`
    /// In simulation: advances the virtual clock
    async fn sleep(&self, duration: Duration);
}
