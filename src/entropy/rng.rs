//! Adapter from `rand_core` generators.
//!
//! Lets any `RngCore + CryptoRng` (for example `rand_core::OsRng` on hosted
//! targets) stand in as the injector's entropy source.

use rand_core::{CryptoRng, RngCore};

use super::{EntropyError, EntropySource};

/// Entropy source wrapping a cryptographic `rand_core` generator.
#[derive(Debug, Clone, Default)]
pub struct RngEntropy<R> {
    rng: R,
}

impl<R: RngCore + CryptoRng> RngEntropy<R> {
    /// Wraps `rng`.
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Returns the wrapped generator.
    pub fn into_inner(self) -> R {
        self.rng
    }
}

impl<R: RngCore + CryptoRng> EntropySource for RngEntropy<R> {
    fn name(&self) -> &'static str {
        "RngCore"
    }

    fn fill(&mut self, dest: &mut [u8]) -> Result<(), EntropyError> {
        self.rng
            .try_fill_bytes(dest)
            .map_err(|_| EntropyError::CollectionFailed)
    }

    fn entropy_estimate(&self) -> f64 {
        8.0
    }
}

#[cfg(all(test, feature = "std"))]
mod tests {
    use super::*;
    use rand_core::OsRng;

    #[test]
    fn test_os_rng_fill() {
        let mut source = RngEntropy::new(OsRng);
        let mut a = [0u8; 48];
        let mut b = [0u8; 48];
        assert!(source.fill(&mut a).is_ok());
        assert!(source.fill(&mut b).is_ok());
        assert_ne!(a, b);
    }
}
