//! NIST SP 800-90B Continuous Health Tests.
//!
//! Screens the raw bytes drawn for each DRBG reseed. A stuck or heavily
//! biased TRNG must not silently keep feeding the generator.
//!
//! # Tests
//! - Repetition Count Test: detects a source stuck on one value.
//! - Adaptive Proportion Test: detects one value becoming too common within
//!   a window. Windows span reseed draws.

use super::EntropyError;

/// RCT cutoff. For H = 4 bits/byte and alpha = 2^-20, C = 1 + ceil(20 / 4) = 6;
/// rounded up for margin.
const RCT_CUTOFF: usize = 10;

/// APT window size.
const APT_WINDOW: usize = 512;

/// APT cutoff for H = 4 bits/byte, alpha = 2^-20 (~39), rounded up.
const APT_CUTOFF: usize = 50;

/// Health tester state, kept across reseed draws.
#[derive(Debug, Clone, Default)]
pub struct HealthTester {
    last_sample: Option<u8>,
    repetition_count: usize,

    window_count: usize,
    sample_value: u8,
    sample_count: usize,
}

impl HealthTester {
    /// Creates a new health tester.
    pub const fn new() -> Self {
        Self {
            last_sample: None,
            repetition_count: 0,
            window_count: 0,
            sample_value: 0,
            sample_count: 0,
        }
    }

    /// Feeds a byte sample into both tests.
    pub fn feed(&mut self, sample: u8) -> Result<(), EntropyError> {
        self.check_repetition_count(sample)?;
        self.check_adaptive_proportion(sample)?;
        Ok(())
    }

    /// Feeds every byte of `samples`, stopping at the first failure.
    pub fn feed_all(&mut self, samples: &[u8]) -> Result<(), EntropyError> {
        samples.iter().try_for_each(|&s| self.feed(s))
    }

    /// Clears all test state, e.g. after the source has been restarted.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    fn check_repetition_count(&mut self, sample: u8) -> Result<(), EntropyError> {
        if self.last_sample == Some(sample) {
            self.repetition_count += 1;
            if self.repetition_count >= RCT_CUTOFF {
                return Err(EntropyError::HealthTestFailed);
            }
        } else {
            self.last_sample = Some(sample);
            self.repetition_count = 1;
        }
        Ok(())
    }

    fn check_adaptive_proportion(&mut self, sample: u8) -> Result<(), EntropyError> {
        if self.window_count == 0 {
            self.sample_value = sample;
            self.sample_count = 1;
            self.window_count = 1;
            return Ok(());
        }

        if sample == self.sample_value {
            self.sample_count += 1;
            if self.sample_count >= APT_CUTOFF {
                return Err(EntropyError::HealthTestFailed);
            }
        }

        self.window_count += 1;
        if self.window_count >= APT_WINDOW {
            self.window_count = 0;
        }
        Ok(())
    }
}
