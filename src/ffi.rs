//! C ABI for firmware integration.
//!
//! Exposes one static injector driven by the platform's TRNG callback and the
//! HMAC-DRBG. The platform calls `rdi_start` at boot, `rdi_handler` from its
//! periodic timer ISR and `rdi_stop` at shutdown.
//!
//! # Safety Contract
//! - `rdi_handler` must not be re-entered (same-priority ISR, or guarded).
//! - The timer interrupt is masked around `rdi_start` and `rdi_stop`.
//! - The fill callback passed to the first `rdi_start` is retained for the
//!   life of the firmware image; later calls only restart the injector.

use core::cell::UnsafeCell;

use crate::controller::RandomDelayInjector;
use crate::drbg::HmacDrbg;
use crate::entropy::callback::{CallbackSource, FillFn};

/// Success status.
pub const RDI_OK: i32 = 0;

/// `rdi_start` was given a null callback.
pub const RDI_ERR_NULL_CALLBACK: i32 = -5;

type PlatformInjector = RandomDelayInjector<CallbackSource, HmacDrbg>;

struct InjectorSlot(UnsafeCell<Option<PlatformInjector>>);

// Safety: every access goes through the entry points below, which the
// platform serializes per the module contract.
unsafe impl Sync for InjectorSlot {}

static INJECTOR: InjectorSlot = InjectorSlot(UnsafeCell::new(None));

/// # Safety
/// No other reference into the slot may be live.
unsafe fn slot() -> &'static mut Option<PlatformInjector> {
    &mut *INJECTOR.0.get()
}

/// Seeds the generator, fills the buffer and enables the handler.
///
/// # Safety
/// See the module contract. `fill` must satisfy [`CallbackSource::new`].
#[no_mangle]
pub unsafe extern "C" fn rdi_start(fill: Option<FillFn>) -> i32 {
    let slot = slot();
    if slot.is_none() {
        let Some(fill) = fill else {
            return RDI_ERR_NULL_CALLBACK;
        };
        *slot = Some(RandomDelayInjector::new(CallbackSource::new(fill), HmacDrbg::new()));
    }

    match slot.as_mut().map(|injector| injector.start()) {
        Some(Ok(())) => RDI_OK,
        Some(Err(e)) => e.status_code(),
        None => RDI_ERR_NULL_CALLBACK,
    }
}

/// Disables the handler. A no-op before the first `rdi_start`.
///
/// # Safety
/// See the module contract.
#[no_mangle]
pub unsafe extern "C" fn rdi_stop() {
    if let Some(injector) = slot() {
        injector.stop();
    }
}

/// Periodic timer handler: injects one random delay when active.
///
/// Returns [`RDI_OK`] or a negative status; on failure the injector has
/// deactivated itself and the platform should treat it as fatal.
///
/// # Safety
/// See the module contract.
#[no_mangle]
pub unsafe extern "C" fn rdi_handler() -> i32 {
    match slot() {
        Some(injector) => match injector.on_periodic_tick() {
            Ok(()) => RDI_OK,
            Err(e) => e.status_code(),
        },
        None => RDI_OK,
    }
}
