//! Deterministic random bit generator interface.
//!
//! The injector treats its DRBG as an opaque primitive: it seeds it once,
//! reseeds it on policy, and asks it to overwrite the byte buffer. Anything
//! implementing [`Drbg`] can be plugged in; [`hmac_drbg::HmacDrbg`] is the
//! SP 800-90A generator used by default.

pub mod hmac_drbg;

use core::fmt;

pub use self::hmac_drbg::HmacDrbg;

/// Errors reported by a DRBG.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrbgError {
    /// `generate` or `reseed` called before `seed`.
    NotSeeded,
    /// Seed material shorter than the security strength requires.
    InsufficientEntropy,
    /// A single request asked for more output than the construction allows.
    RequestTooLarge,
    /// The reseed interval has been exhausted.
    ReseedRequired,
}

impl fmt::Display for DrbgError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DrbgError::NotSeeded => write!(f, "DRBG not seeded"),
            DrbgError::InsufficientEntropy => write!(f, "Insufficient seed entropy"),
            DrbgError::RequestTooLarge => write!(f, "DRBG request too large"),
            DrbgError::ReseedRequired => write!(f, "DRBG reseed required"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for DrbgError {}

/// Deterministic random bit generator operations consumed by the injector.
pub trait Drbg {
    /// Instantiates the generator from fresh entropy.
    fn seed(&mut self, entropy: &[u8]) -> Result<(), DrbgError>;

    /// Mixes fresh entropy and optional additional input into the state.
    fn reseed(&mut self, entropy: &[u8], additional_input: Option<&[u8]>) -> Result<(), DrbgError>;

    /// Overwrites `out` with generator output and advances the state.
    fn generate(&mut self, out: &mut [u8]) -> Result<(), DrbgError>;

    /// Whether `seed` has been called.
    fn is_seeded(&self) -> bool;
}
