//! Software stand-in backend.

use crate::{BackendDescriptor, BackendKind, Result, Solver};
use async_trait::async_trait;
use work_core::{Nonce, NonceLayout, RawOutput, WorkHash, DEFAULT_NONCE_OFFSET};

/// Width of the simulated device's output buffer, matching the serial
/// co-processor so the extraction path is exercised identically.
pub const SIMULATED_OUTPUT_LEN: usize = 20;

/// A backend that computes nothing: it answers every request with one
/// fixed raw buffer.
///
/// Useful only for exercising the dispatch protocol - round trips,
/// timeouts, isolation between concurrent requests - without hardware
/// attached.
pub struct SimulatedSolver {
    descriptor: BackendDescriptor,
    output: RawOutput,
}

impl SimulatedSolver {
    /// Answer every request with `output`.
    #[must_use]
    pub fn new(output: RawOutput) -> Self {
        Self {
            descriptor: BackendDescriptor {
                kind: BackendKind::Simulated,
                name: "fixed-output fixture".to_string(),
            },
            output,
        }
    }

    /// Answer every request with a buffer whose nonce window holds
    /// `nonce`, padded to the serial device's 20-byte shape.
    #[must_use]
    pub fn with_nonce(nonce: Nonce) -> Self {
        let mut buf = vec![0u8; DEFAULT_NONCE_OFFSET];
        buf.extend_from_slice(nonce.as_bytes());
        buf.resize(SIMULATED_OUTPUT_LEN, 0);
        Self::new(RawOutput::new(buf))
    }
}

#[async_trait]
impl Solver for SimulatedSolver {
    fn descriptor(&self) -> &BackendDescriptor {
        &self.descriptor
    }

    fn layout(&self) -> NonceLayout {
        NonceLayout::standard()
    }

    async fn solve_raw(&self, _hash: &WorkHash) -> Result<RawOutput> {
        Ok(self.output.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_hash() -> WorkHash {
        "C8E5B875778702445B25657276ABC56AA9910B283537CA438B2CC59B0CF93712"
            .parse()
            .unwrap()
    }

    #[tokio::test]
    async fn echoes_the_configured_output() {
        let raw = RawOutput::new((0u8..20).collect());
        let solver = SimulatedSolver::new(raw.clone());
        assert_eq!(solver.solve_raw(&sample_hash()).await.unwrap(), raw);
    }

    #[tokio::test]
    async fn with_nonce_places_it_in_the_standard_window() {
        let nonce: Nonce = "00000000005f9505".parse().unwrap();
        let solver = SimulatedSolver::with_nonce(nonce);

        let raw = solver.solve_raw(&sample_hash()).await.unwrap();
        assert_eq!(raw.len(), SIMULATED_OUTPUT_LEN);
        assert_eq!(solver.layout().extract(&raw).unwrap(), nonce);

        // The default direct path agrees with extraction.
        assert_eq!(solver.solve_direct(&sample_hash()).await.unwrap(), nonce);
    }

    #[tokio::test]
    async fn answers_are_deterministic() {
        let nonce: Nonce = "0102030405060708".parse().unwrap();
        let solver = SimulatedSolver::with_nonce(nonce);
        let first = solver.solve_direct(&sample_hash()).await.unwrap();
        let second = solver.solve_direct(&sample_hash()).await.unwrap();
        assert_eq!(first, second);
    }
}
