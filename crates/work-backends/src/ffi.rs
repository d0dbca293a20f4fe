//! FFI adapter for the vendor accelerator library.
//!
//! Binds the card driver's two entry points (`init`, `pow_`) and exposes
//! them as an [`AcceleratorDevice`]. Link against the vendor SDK by
//! enabling the `fpga-driver` feature; every other backend builds without
//! it.

use crate::ports::AcceleratorDevice;
use crate::{BackendError, Result};
use work_core::WorkHash;

/// Output width of the card's `pow_` call.
const CARD_OUTPUT_LEN: usize = 20;

extern "C" {
    fn init() -> i32;
    fn pow_(pin: *const u8, pout: *mut u8) -> i32;
}

/// The vendor accelerator card, one handle per process.
pub struct VendorAccelerator;

impl VendorAccelerator {
    /// Create a handle. Initialization itself happens through
    /// [`AcceleratorDevice::init`] when the solver is constructed.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for VendorAccelerator {
    fn default() -> Self {
        Self::new()
    }
}

impl AcceleratorDevice for VendorAccelerator {
    fn init(&self) -> Result<()> {
        // SAFETY: the vendor call takes no arguments and reports failure
        // through its return code.
        let rc = unsafe { init() };
        if rc != 0 {
            return Err(BackendError::Device(format!(
                "accelerator init failed (rc={rc})"
            )));
        }
        Ok(())
    }

    fn compute(&self, hash: &[u8; WorkHash::LEN]) -> Result<Vec<u8>> {
        let mut out = vec![0u8; CARD_OUTPUT_LEN];
        // SAFETY: `pin` points at 32 readable bytes and `pout` at
        // CARD_OUTPUT_LEN writable bytes, matching the driver contract.
        let rc = unsafe { pow_(hash.as_ptr(), out.as_mut_ptr()) };
        if rc != 0 {
            return Err(BackendError::Device(format!(
                "accelerator compute failed (rc={rc})"
            )));
        }
        Ok(out)
    }
}
