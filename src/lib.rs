//! Random Delay Injection (RDI).
//!
//! A timing side-channel countermeasure for embedded firmware. On every tick
//! of a periodic interrupt the injector draws one byte from a DRBG-backed
//! buffer and spins for exactly `18 + byte` cycles, so cryptographic code
//! running after the interrupt is not aligned to a fixed clock phase.
//!
//! # Modules
//! - `buffer`: random byte buffer, refill and reseed policy.
//! - `delay`: cycle-exact spin and its cycle model.
//! - `controller`: start/stop/tick lifecycle around one owned context.
//! - `entropy`, `drbg`: collaborator interfaces and default implementations.
//! - `ffi`: C ABI with a single static injector (feature `ffi`).

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(all(test, not(feature = "std")))]
extern crate std;

#[cfg(all(not(feature = "std"), not(test)))]
use core::panic::PanicInfo;

#[cfg(all(not(feature = "std"), not(test)))]
#[panic_handler]
fn panic(_info: &PanicInfo) -> ! {
    loop {}
}

pub mod buffer;
pub mod config;
pub mod controller;
pub mod delay;
pub mod drbg;
pub mod entropy;
pub mod error;
pub mod stats;

#[cfg(feature = "ffi")]
pub mod ffi;

pub use buffer::EntropyBuffer;
pub use config::RdiConfig;
pub use controller::RandomDelayInjector;
pub use drbg::{Drbg, HmacDrbg};
pub use entropy::EntropySource;
pub use error::RdiError;
pub use stats::RdiStats;

/// Library version, `0xMMmmpp`.
#[no_mangle]
pub extern "C" fn rdi_version() -> u32 {
    0x000100
}
