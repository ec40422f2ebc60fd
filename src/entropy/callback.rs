//! Platform TRNG exposed through a C function pointer.
//!
//! Firmware written in C hands the injector its `random_buffer`-style routine;
//! this source forwards each fill request to it.

use super::{EntropyError, EntropySource};

/// Fills `len` bytes at `dest` with hardware randomness. Returns 0 on success.
pub type FillFn = unsafe extern "C" fn(dest: *mut u8, len: usize) -> i32;

/// Entropy source backed by a platform fill routine.
#[derive(Debug, Clone, Copy)]
pub struct CallbackSource {
    fill: FillFn,
    last_status: i32,
}

impl CallbackSource {
    /// Wraps a platform fill routine.
    ///
    /// # Safety
    /// `fill` must write exactly `len` bytes at `dest` and must be callable
    /// from the context that drives the injector (including the tick ISR).
    pub unsafe fn new(fill: FillFn) -> Self {
        Self {
            fill,
            last_status: 0,
        }
    }

    /// Status returned by the most recent call of the fill routine.
    pub fn last_status(&self) -> i32 {
        self.last_status
    }
}

impl EntropySource for CallbackSource {
    fn name(&self) -> &'static str {
        "PlatformCallback"
    }

    fn fill(&mut self, dest: &mut [u8]) -> Result<(), EntropyError> {
        // Safety: the pointer/length pair describes `dest`; the callee contract
        // was accepted in `new`.
        let rc = unsafe { (self.fill)(dest.as_mut_ptr(), dest.len()) };
        self.last_status = rc;
        if rc == 0 {
            Ok(())
        } else {
            Err(EntropyError::CollectionFailed)
        }
    }

    fn entropy_estimate(&self) -> f64 {
        // Platform TRNGs are assumed full-entropy; the health tests catch
        // stuck outputs.
        8.0
    }
}
