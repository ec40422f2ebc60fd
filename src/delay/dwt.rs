//! On-target measurement with the ARMv7-M DWT cycle counter.

use core::hint::black_box;
use core::ptr::{read_volatile, write_volatile};

use super::verify::{verify_delays, CycleCounter, DelayMismatch};

const DEMCR: *mut u32 = 0xE000_EDFC as *mut u32;
const DEMCR_TRCENA: u32 = 1 << 24;
const DWT_CTRL: *mut u32 = 0xE000_1000 as *mut u32;
const DWT_CTRL_CYCCNTENA: u32 = 1;
const DWT_CYCCNT: *const u32 = 0xE000_1004 as *const u32;

/// The DWT `CYCCNT` register.
pub struct Dwt {
    _private: (),
}

impl Dwt {
    /// Turns on trace and the cycle counter.
    ///
    /// # Safety
    /// Privileged mode on an ARMv7-M core. Takes over `CYCCNT` from any
    /// debugger or profiler using it.
    pub unsafe fn enable() -> Self {
        write_volatile(DEMCR, read_volatile(DEMCR) | DEMCR_TRCENA);
        write_volatile(DWT_CTRL, read_volatile(DWT_CTRL) | DWT_CTRL_CYCCNTENA);
        Self { _private: () }
    }
}

impl CycleCounter for Dwt {
    #[inline(always)]
    fn read(&mut self) -> u32 {
        // Safety: `CYCCNT` is a read-only view of a free-running counter.
        unsafe { read_volatile(DWT_CYCCNT) }
    }
}

/// Measures [`super::wait_cycles`] for all 256 bytes.
///
/// Run it at bring-up on every new board and toolchain. Flash wait states
/// stretch instruction fetches, so run it from the memory the firmware runs
/// the tick handler from.
///
/// # Safety
/// As [`Dwt::enable`]. Interrupts must be masked for the duration.
pub unsafe fn self_test() -> Result<(), DelayMismatch> {
    let mut dwt = Dwt::enable();
    let result = verify_delays(&mut dwt, |b| super::wait_cycles(black_box(b)));
    if let Err(mismatch) = result {
        log::error!("{}", mismatch);
    }
    result
}
