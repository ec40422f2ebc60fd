//! Hardware entropy interface.
//!
//! The injector only ever asks its entropy source for one thing: 48 fresh
//! bytes on every DRBG reseed. This module defines that interface and a few
//! concrete sources for the platforms the crate is built for.
//!
//! # Design
//! - **Fallible Fill**: sources report failure; the injector never retries or
//!   falls back on its own.
//! - **Health Tests**: reseed draws can be screened with the SP 800-90B
//!   continuous tests in [`sp800_90b`].

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
pub mod rdrand;

pub mod callback;
pub mod replay;
pub mod rng;
pub mod sources;
pub mod sp800_90b;

use core::fmt;

/// Error types for entropy collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntropyError {
    /// Failed to collect sufficient entropy bytes.
    CollectionFailed,
    /// Source is exhausted (e.g., fixed buffer).
    Exhausted,
    /// Health test failure (SP 800-90B).
    HealthTestFailed,
    /// Platform not supported.
    NotSupported,
}

impl fmt::Display for EntropyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntropyError::CollectionFailed => write!(f, "Entropy collection failed"),
            EntropyError::Exhausted => write!(f, "Entropy source exhausted"),
            EntropyError::HealthTestFailed => write!(f, "Entropy health test failed"),
            EntropyError::NotSupported => write!(f, "Entropy source not supported"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for EntropyError {}

/// A trait for entropy sources.
pub trait EntropySource {
    /// Returns a unique identifier for the source.
    fn name(&self) -> &'static str;

    /// Fills `dest` with random bytes from the source.
    ///
    /// # Returns
    /// * `Ok(())` on success.
    /// * `Err(EntropyError)` if the source fails.
    fn fill(&mut self, dest: &mut [u8]) -> Result<(), EntropyError>;

    /// Returns the estimated entropy per byte (in bits, 0.0-8.0).
    fn entropy_estimate(&self) -> f64;
}
