//! Measured check of the delay length.
//!
//! Brackets every possible delay with two reads of a free-running cycle
//! counter, subtracts the cost of the reads themselves and compares the rest
//! with `18 + b`.

use core::fmt;

use super::delay_cycles;

/// Free-running 32-bit cycle counter.
pub trait CycleCounter {
    fn read(&mut self) -> u32;
}

/// First byte whose delay did not measure `18 + b`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayMismatch {
    pub byte: u8,
    pub expected: u32,
    pub measured: u32,
}

impl fmt::Display for DelayMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Delay for byte {} took {} cycles, expected {}",
            self.byte, self.measured, self.expected
        )
    }
}

#[cfg(feature = "std")]
impl std::error::Error for DelayMismatch {}

/// Cycles between two back-to-back reads.
pub fn measurement_overhead<C: CycleCounter>(counter: &mut C) -> u32 {
    let start = counter.read();
    let end = counter.read();
    end.wrapping_sub(start)
}

/// Measures `wait(b)` for every byte against [`delay_cycles`].
///
/// Counter wrap-around between the two reads is handled.
pub fn verify_delays<C, W>(counter: &mut C, mut wait: W) -> Result<(), DelayMismatch>
where
    C: CycleCounter,
    W: FnMut(u8),
{
    let overhead = measurement_overhead(counter);
    for byte in 0..=u8::MAX {
        let start = counter.read();
        wait(byte);
        let end = counter.read();

        let measured = end.wrapping_sub(start).wrapping_sub(overhead);
        let expected = delay_cycles(byte);
        if measured != expected {
            return Err(DelayMismatch {
                byte,
                expected,
                measured,
            });
        }
    }
    Ok(())
}
