//! Accelerator card backend.

use crate::ports::AcceleratorDevice;
use crate::{BackendDescriptor, BackendKind, Result, Solver};
use async_trait::async_trait;
use tracing::info;
use work_core::{NonceLayout, RawOutput, WorkHash};

/// Backend driving an accelerator card through its vendor driver.
///
/// The card's output places the nonce at bytes `[8, 16)` in canonical
/// order; unlike the serial firmware there is no reversed revision in the
/// field, so the layout is fixed.
pub struct AcceleratorSolver {
    descriptor: BackendDescriptor,
    device: Box<dyn AcceleratorDevice>,
}

impl AcceleratorSolver {
    /// Take ownership of the card and run its one-time initialization.
    ///
    /// Construction fails if the card does not come up; there is no lazy
    /// retry path, a card that cannot initialize should fail the process
    /// start.
    pub fn new(name: impl Into<String>, device: Box<dyn AcceleratorDevice>) -> Result<Self> {
        device.init()?;
        let descriptor = BackendDescriptor {
            kind: BackendKind::Accelerator,
            name: name.into(),
        };
        info!(device = %descriptor, "accelerator initialized");
        Ok(Self { descriptor, device })
    }
}

#[async_trait]
impl Solver for AcceleratorSolver {
    fn descriptor(&self) -> &BackendDescriptor {
        &self.descriptor
    }

    fn layout(&self) -> NonceLayout {
        NonceLayout::standard()
    }

    async fn solve_raw(&self, hash: &WorkHash) -> Result<RawOutput> {
        let raw = self.device.compute(hash.as_bytes())?;
        Ok(RawOutput::new(raw))
    }
}
