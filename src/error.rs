//! Top-level error type for the delay injector.
//!
//! The mechanism itself has no recoverable failure modes. Everything here is a
//! collaborator failure or a lifecycle misuse, surfaced so the layer above can
//! treat it as fatal.

use core::fmt;

use crate::config::ConfigError;
use crate::drbg::DrbgError;
use crate::entropy::EntropyError;

/// Errors surfaced by the injector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RdiError {
    /// `start()` has not run, or a previous failure left the buffer unprimed.
    NotStarted,
    /// The hardware entropy source failed.
    Entropy(EntropyError),
    /// The DRBG rejected a seed, reseed or generate request.
    Drbg(DrbgError),
    /// The supplied configuration is out of range.
    Config(ConfigError),
}

impl RdiError {
    /// Status code used across the C ABI. Zero is reserved for success.
    pub fn status_code(&self) -> i32 {
        match self {
            RdiError::NotStarted => -1,
            RdiError::Entropy(_) => -2,
            RdiError::Drbg(_) => -3,
            RdiError::Config(_) => -4,
        }
    }
}

impl fmt::Display for RdiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RdiError::NotStarted => write!(f, "Delay injector not started"),
            RdiError::Entropy(e) => write!(f, "Entropy source failure: {}", e),
            RdiError::Drbg(e) => write!(f, "DRBG failure: {}", e),
            RdiError::Config(e) => write!(f, "Invalid configuration: {}", e),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for RdiError {}

impl From<EntropyError> for RdiError {
    fn from(e: EntropyError) -> Self {
        RdiError::Entropy(e)
    }
}

impl From<DrbgError> for RdiError {
    fn from(e: DrbgError) -> Self {
        RdiError::Drbg(e)
    }
}

impl From<ConfigError> for RdiError {
    fn from(e: ConfigError) -> Self {
        RdiError::Config(e)
    }
}
