//! ARMv7-M Thumb-2 delay routine.
//!
//! Cycle costs follow the Cortex-M3/M4 technical reference manuals. The
//! instruction sequence is mirrored one-for-one by [`super::model::ROUTINE`];
//! keep the two in step. Run [`super::dwt::self_test`] on each new board or
//! toolchain before shipping.

use core::arch::asm;

/// Spins for exactly `18 + delay` cycles.
///
/// Touches no memory and no stack. Register `r0` and the flags are clobbered.
#[inline(never)]
pub fn wait_cycles(delay: u8) {
    // Safety: pure register arithmetic and branches local to this block. The
    // computed jump lands on one of the two `nop`s or just past them.
    unsafe {
        asm!(
            // r0 = delay + 3
            "adds r0, #3",
            // Runs delay / 3 + 1 taken iterations at 3 cycles each; the extra
            // one trains the predictor. Leaves r0 = (delay % 3) - 3.
            "2:",
            "subs r0, #3",
            "bhs 2b",
            // r0 = -(2 * r0 + 4): 2, 0 or -2 for delay % 3 = 0, 1, 2.
            "lsls r0, r0, #1",
            "adds r0, #4",
            "rsbs r0, r0, #0",
            // pc reads as this instruction + 4, i.e. the second nop.
            "add pc, r0",
            // delay % 3 == 2 lands here
            "nop",
            // delay % 3 == 1 lands here
            "nop",
            // delay % 3 == 0 lands past the end
            inout("r0") u32::from(delay) => _,
            options(nomem, nostack),
        );
    }
}
