//! Loop-shaped delay for targets without the Thumb routine.
//!
//! Runs the same iteration structure as the assembly version so host builds
//! exercise the same control flow, but makes no cycle-count promise: the
//! compiler and the host CPU decide the cost of each step.

use core::hint::{black_box, spin_loop};

use super::DelayPlan;

/// Spins for a delay shaped like `18 + delay` cycles. Not cycle-exact.
#[inline(never)]
pub fn wait_cycles(delay: u8) {
    let plan = DelayPlan::for_byte(delay);

    // Taken iterations plus the final exit test.
    let mut remaining = black_box(plan.taken_iterations + 1);
    while remaining > 0 {
        remaining = black_box(remaining - 1);
        spin_loop();
    }

    let mut nops = black_box(plan.correction_nops);
    while nops > 0 {
        nops = black_box(nops - 1);
        spin_loop();
    }
}
