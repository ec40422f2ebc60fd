//! Configuration for the delay injector.
//!
//! Buffer geometry is fixed at compile time; the reseed policy is carried by
//! [`RdiConfig`], which the host populates once at boot.

use core::fmt;

/// Capacity of the random byte buffer.
pub const BUFFER_LENGTH: usize = 128;

/// Default bound on DRBG output per seed.
pub const RESEED_AFTER_BYTES: u32 = 1024 * 1024;

/// Bytes drawn from the entropy source on every reseed.
pub const RESEED_ENTROPY_LEN: usize = 48;

/// Largest threshold for which the reseed counter cannot overflow: the
/// counter can exceed the threshold by at most two buffer lengths before it
/// is reset.
pub const MAX_RESEED_AFTER_BYTES: u32 = u32::MAX - 2 * BUFFER_LENGTH as u32;

/// Errors in a host-supplied configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// `reseed_after_bytes` exceeds [`MAX_RESEED_AFTER_BYTES`].
    ThresholdTooLarge,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ThresholdTooLarge => write!(f, "Reseed threshold too large"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

/// Runtime settings for the injector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RdiConfig {
    /// Reseed once the bytes-since-reseed counter exceeds this value.
    ///
    /// The counter is advanced per byte and again per whole buffer, so the
    /// effective interval is roughly half this many output bytes.
    pub reseed_after_bytes: u32,

    /// Run SP 800-90B health tests over every reseed draw.
    pub health_tests: bool,
}

impl RdiConfig {
    /// Checks the configuration against the counter limits.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.reseed_after_bytes > MAX_RESEED_AFTER_BYTES {
            return Err(ConfigError::ThresholdTooLarge);
        }
        Ok(())
    }
}

impl Default for RdiConfig {
    fn default() -> Self {
        Self {
            reseed_after_bytes: RESEED_AFTER_BYTES,
            health_tests: true,
        }
    }
}
