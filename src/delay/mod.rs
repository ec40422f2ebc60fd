//! Cycle-Exact Random Delay.
//!
//! Each call draws one byte `b` from the entropy buffer and spins for exactly
//! `18 + b` cycles. The spin itself must not leak anything beyond its length:
//!
//! - the loop body costs 3 cycles whatever `b` is;
//! - the loop runs one redundant taken iteration so the branch predictor has
//!   settled on "taken" before the final exit;
//! - `b mod 3` is absorbed by a computed jump into a run of `nop`s, so all
//!   three residues execute the same instructions up to the correction.
//!
//! The routine lives in [`thumb`] as inline assembly and is only built for
//! ARMv7-M targets. [`model`] executes the same instruction sequence on the
//! host to check the per-byte cost and the jump targets, [`DelayPlan`] is the
//! closed form of that cost, and [`verify`] measures the real thing against a
//! cycle counter ([`dwt::self_test`] on hardware). Other targets get
//! [`portable`], which keeps the loop shape but is not cycle-exact.

pub mod model;
pub mod verify;

#[cfg(rdi_cycle_exact)]
pub mod dwt;

#[cfg(rdi_cycle_exact)]
pub mod thumb;

#[cfg(not(rdi_cycle_exact))]
pub mod portable;

use crate::buffer::EntropyBuffer;
use crate::drbg::Drbg;
use crate::entropy::EntropySource;
use crate::error::RdiError;

#[cfg(rdi_cycle_exact)]
pub use self::thumb::wait_cycles;

#[cfg(not(rdi_cycle_exact))]
pub use self::portable::wait_cycles;

/// Whether [`wait_cycles`] is the cycle-exact routine on this target.
pub const CYCLE_EXACT: bool = cfg!(rdi_cycle_exact);

/// Cycles spent by a zero-byte delay.
pub const FIXED_OVERHEAD_CYCLES: u32 = 18;

/// Delays are counted in cycles of this many per loop iteration.
pub const CYCLES_PER_ITERATION: u32 = 3;

/// Cortex-M3/M4 instruction costs, zero-wait-state memory.
pub mod cost {
    /// Pipeline refill after a taken branch or a write to pc.
    pub const REFILL: u32 = 1;
    /// Data-processing instruction, `nop` included.
    pub const ALU: u32 = 1;
    pub const BRANCH_TAKEN: u32 = 1 + REFILL;
    pub const BRANCH_NOT_TAKEN: u32 = 1;
    /// `add pc, r0`.
    pub const WRITE_PC: u32 = 1 + REFILL;
    /// Argument set-up, `bl` into the routine and `bx lr` out of it.
    ///
    /// Depends on the caller's code generation; `dwt::self_test` measures it.
    pub const CALL_SITE: u32 = 7;
}

const _: () = assert!(cost::ALU + cost::BRANCH_TAKEN == CYCLES_PER_ITERATION);
const _: () = match model::execute(model::ExecState::Thumb, 0) {
    Ok(trace) => assert!(trace.cycles + cost::CALL_SITE == FIXED_OVERHEAD_CYCLES),
    Err(_) => panic!("delay routine jumps outside itself"),
};

/// Closed-form cost of one delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayPlan {
    /// Taken loop iterations: `b / 3 + 1`, the extra one training the predictor.
    pub taken_iterations: u32,
    /// Trailing `nop`s selected by the computed jump: `b mod 3`.
    pub correction_nops: u32,
}

impl DelayPlan {
    /// Plans the delay for byte `b`.
    pub const fn for_byte(b: u8) -> Self {
        let b = b as u32;
        Self {
            taken_iterations: b / CYCLES_PER_ITERATION + 1,
            correction_nops: b % CYCLES_PER_ITERATION,
        }
    }

    /// Cycles spent on everything except the correction `nop`s.
    pub const fn path_cycles(&self) -> u32 {
        cost::CALL_SITE
            // adds r0, #3
            + cost::ALU
            + self.taken_iterations * (cost::ALU + cost::BRANCH_TAKEN)
            + cost::ALU
            + cost::BRANCH_NOT_TAKEN
            // lsls, adds, rsbs
            + 3 * cost::ALU
            + cost::WRITE_PC
    }

    /// Total cycles including the call.
    pub const fn cycles(&self) -> u32 {
        self.path_cycles() + self.correction_nops * cost::ALU
    }
}

/// Length in cycles of the delay injected for byte `b`.
pub const fn delay_cycles(b: u8) -> u32 {
    FIXED_OVERHEAD_CYCLES + b as u32
}

/// Draws one byte, spins for `18 + b` cycles and returns that cycle count.
///
/// Safe to call from the tick interrupt: no allocation, no blocking.
pub fn next_delay_cycles<E, D>(buffer: &mut EntropyBuffer<E, D>) -> Result<u32, RdiError>
where
    E: EntropySource,
    D: Drbg,
{
    let b = buffer.next_byte()?;
    wait_cycles(b);
    Ok(delay_cycles(b))
}
