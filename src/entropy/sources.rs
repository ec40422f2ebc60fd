//! Standard Entropy Sources Registry.
//!
//! Re-exports available entropy sources for convenient access.

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
pub use super::rdrand::RdRandSource;

pub use super::callback::{CallbackSource, FillFn};
pub use super::replay::ReplaySource;
pub use super::rng::RngEntropy;
