//! Intel Secure Key (RDRAND) Entropy Source.
//!
//! Uses the on-chip hardware random number generator present in modern
//! x86/x86_64 CPUs. Mostly useful for host-side bring-up of the injector;
//! embedded targets supply their TRNG through [`super::callback`].

use super::{EntropyError, EntropySource};

#[cfg(target_arch = "x86")]
use core::arch::x86::_rdrand32_step;
#[cfg(target_arch = "x86_64")]
use core::arch::x86_64::_rdrand64_step;

/// Consecutive RDRAND underflows tolerated before giving up.
const MAX_RETRIES: usize = 10;

/// Hardware RDRAND Entropy Source.
#[derive(Debug)]
pub struct RdRandSource {
    _private: (),
}

impl RdRandSource {
    /// Creates a new RDRAND source without checking CPU support.
    ///
    /// # Safety
    /// Caller must ensure the CPU supports RDRAND (CPUID.01H:ECX.RDRAND[bit 30] = 1).
    pub unsafe fn new_unchecked() -> Self {
        Self { _private: () }
    }

    /// Creates a new RDRAND source if the CPU supports it.
    ///
    /// Without `std` the check falls back to the compile-time target features.
    pub fn new() -> Option<Self> {
        #[cfg(feature = "std")]
        let supported = std::is_x86_feature_detected!("rdrand");
        #[cfg(not(feature = "std"))]
        let supported = cfg!(target_feature = "rdrand");

        if supported {
            Some(Self { _private: () })
        } else {
            log::warn!("RDRAND not available on this CPU");
            None
        }
    }

    #[cfg(target_arch = "x86_64")]
    fn step() -> Option<[u8; 8]> {
        let mut val: u64 = 0;
        // Safety: support was checked when the source was constructed.
        let success = unsafe { _rdrand64_step(&mut val) };
        (success == 1).then(|| val.to_le_bytes())
    }

    #[cfg(target_arch = "x86")]
    fn step() -> Option<[u8; 4]> {
        let mut val: u32 = 0;
        // Safety: support was checked when the source was constructed.
        let success = unsafe { _rdrand32_step(&mut val) };
        (success == 1).then(|| val.to_le_bytes())
    }
}

impl EntropySource for RdRandSource {
    fn name(&self) -> &'static str {
        "RdRand"
    }

    fn fill(&mut self, dest: &mut [u8]) -> Result<(), EntropyError> {
        for chunk in dest.chunks_mut(core::mem::size_of::<usize>()) {
            let mut retries = 0;
            let word = loop {
                match Self::step() {
                    Some(word) => break word,
                    None => {
                        retries += 1;
                        if retries > MAX_RETRIES {
                            return Err(EntropyError::CollectionFailed);
                        }
                    }
                }
            };
            chunk.copy_from_slice(&word[..chunk.len()]);
        }
        Ok(())
    }

    fn entropy_estimate(&self) -> f64 {
        // RDRAND output is DRBG-conditioned per SP 800-90B/C.
        8.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rdrand_fill() {
        let Some(mut source) = RdRandSource::new() else {
            return;
        };
        let mut buf = [0u8; 48];
        assert!(source.fill(&mut buf).is_ok());
        assert!(buf.iter().any(|&x| x != 0), "RDRAND produced all zeros");
    }

    #[test]
    fn test_rdrand_partial_word() {
        let Some(mut source) = RdRandSource::new() else {
            return;
        };
        let mut buf = [0u8; 5];
        assert!(source.fill(&mut buf).is_ok());
    }
}
