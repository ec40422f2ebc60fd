//! Delay Injector Lifecycle.
//!
//! [`RandomDelayInjector`] owns the whole mechanism: the entropy buffer, the
//! DRBG inside it and the active flag. The platform creates exactly one,
//! calls [`start`](RandomDelayInjector::start) at boot, wires
//! [`on_periodic_tick`](RandomDelayInjector::on_periodic_tick) to its timer
//! interrupt and calls [`stop`](RandomDelayInjector::stop) at shutdown.
//!
//! # Execution Context
//! - The tick handler allocates nothing, never blocks and does not suspend.
//!   It does not log either: only `start()` and `stop()` do.
//! - It must not be re-entered; `&mut self` enforces this in safe code.
//! - The caller masks the tick interrupt around `start()` and `stop()`.

use crate::buffer::EntropyBuffer;
use crate::config::RdiConfig;
use crate::delay;
use crate::drbg::Drbg;
use crate::entropy::EntropySource;
use crate::error::RdiError;
use crate::stats::RdiStats;

/// Random delay injection context.
pub struct RandomDelayInjector<E, D> {
    buffer: EntropyBuffer<E, D>,
    active: bool,
}

impl<E: EntropySource, D: Drbg> RandomDelayInjector<E, D> {
    /// Creates an inactive injector with the default configuration.
    pub fn new(source: E, drbg: D) -> Self {
        Self {
            buffer: EntropyBuffer::with_defaults(source, drbg),
            active: false,
        }
    }

    /// Creates an inactive injector with a host-supplied configuration.
    pub fn with_config(source: E, drbg: D, config: RdiConfig) -> Result<Self, RdiError> {
        Ok(Self {
            buffer: EntropyBuffer::new(source, drbg, config)?,
            active: false,
        })
    }

    /// Reseeds the DRBG, refills the buffer and enables the tick handler.
    ///
    /// Calling it again while active simply reseeds and refills again. On
    /// failure the injector is left inactive.
    pub fn start(&mut self) -> Result<(), RdiError> {
        self.active = false;
        self.buffer.prime().map_err(|e| {
            log::error!("Random delay injection failed to start: {}", e);
            e
        })?;
        self.active = true;
        log::info!(
            "Random delay injection started (entropy: {}, ~{} bits/byte)",
            self.buffer.source().name(),
            self.buffer.source().entropy_estimate()
        );
        Ok(())
    }

    /// Disables the tick handler. Buffer contents are left in place.
    pub fn stop(&mut self) {
        if self.active {
            log::info!("Random delay injection stopped");
        }
        self.active = false;
    }

    /// Timer interrupt handler: injects one random delay when active.
    ///
    /// A collaborator failure during a reseed or refill deactivates the
    /// injector and is returned for the platform to treat as fatal. Nothing
    /// is logged from here; report the error outside the interrupt.
    pub fn on_periodic_tick(&mut self) -> Result<(), RdiError> {
        if !self.active {
            return Ok(());
        }

        match delay::next_delay_cycles(&mut self.buffer) {
            Ok(cycles) => {
                self.buffer.stats_mut().record_delay(cycles);
                Ok(())
            }
            Err(e) => {
                self.active = false;
                Err(e)
            }
        }
    }

    /// Whether the tick handler is enabled.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// The underlying entropy buffer.
    pub fn buffer(&self) -> &EntropyBuffer<E, D> {
        &self.buffer
    }

    /// Activity counters.
    pub fn stats(&self) -> &RdiStats {
        self.buffer.stats()
    }
}
