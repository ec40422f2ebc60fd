//! Injector Activity Counters.
//!
//! Monotonic counters for bring-up diagnostics and tests. They record *that*
//! something happened, never which byte was drawn, so reading them leaks
//! nothing about the delay sequence.

/// Counters kept across the lifetime of an injector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RdiStats {
    /// Number of buffer refills (including the one done by `start()`).
    pub refills: u64,
    /// Number of DRBG reseeds (including the one done by `start()`).
    pub reseeds: u64,
    /// Number of delays injected by the tick handler.
    pub delays: u64,
    /// Sum of the requested wait lengths, in cycles.
    pub cycles_requested: u64,
}

impl RdiStats {
    /// Creates zeroed counters.
    pub const fn new() -> Self {
        Self {
            refills: 0,
            reseeds: 0,
            delays: 0,
            cycles_requested: 0,
        }
    }

    pub(crate) fn record_refill(&mut self) {
        self.refills = self.refills.saturating_add(1);
    }

    pub(crate) fn record_reseed(&mut self) {
        self.reseeds = self.reseeds.saturating_add(1);
    }

    pub(crate) fn record_delay(&mut self, cycles: u32) {
        self.delays = self.delays.saturating_add(1);
        self.cycles_requested = self.cycles_requested.saturating_add(u64::from(cycles));
    }

    /// Mean requested wait, or `None` before the first delay.
    pub fn mean_cycles(&self) -> Option<u64> {
        if self.delays == 0 {
            return None;
        }
        Some(self.cycles_requested / self.delays)
    }
}
