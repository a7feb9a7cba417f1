//! Simulation context implementing ArenaContext with a virtual clock.

use arena_env::ArenaContext;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Simulation context backed by a virtual clock.
///
/// Sleeping advances the clock instead of waiting, so a fully paced match
/// completes instantly while still reporting how long it would have taken.
pub struct SimContext {
    /// Current virtual time (nanoseconds since simulation start)
    virtual_time_ns: Arc<Mutex<u64>>,
}

impl SimContext {
    /// Creates a new SimContext at virtual time zero.
    pub fn new() -> Self {
        Self {
            virtual_time_ns: Arc::new(Mutex::new(0)),
        }
    }

    /// Creates an Arc-wrapped context for sharing.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Advances virtual time by the given duration.
    pub fn advance_time(&self, duration: Duration) {
        let mut time = self.lock_time();
        let nanos = u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX);
        *time = time.saturating_add(nanos);
    }

    /// Returns the current virtual time in nanoseconds.
    pub fn time_ns(&self) -> u64 {
        *self.lock_time()
    }

    fn lock_time(&self) -> std::sync::MutexGuard<'_, u64> {
        // The clock is a plain counter; a poisoned lock still holds a valid value
        self.virtual_time_ns
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for SimContext {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for SimContext {
    fn clone(&self) -> Self {
        Self {
            virtual_time_ns: Arc::clone(&self.virtual_time_ns),
        }
    }
}

#[async_trait]
impl ArenaContext for SimContext {
    fn now(&self) -> Duration {
        Duration::from_nanos(self.time_ns())
    }

    async fn sleep(&self, duration: Duration) {
        self.advance_time(duration);
    }
}
