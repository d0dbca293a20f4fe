//! Configuration for the dispatch coordinator.

use std::time::Duration;

/// Default reply window. Sized for hardware solve latency, not dispatch
/// overhead.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Runtime configuration for a dispatcher.
#[derive(Clone, Copy, Debug)]
pub struct DispatchConfig {
    /// How long a solve call waits for a reply before failing with
    /// `Timeout`.
    pub timeout: Duration,

    /// Re-check every backend-produced nonce against the threshold before
    /// returning it. Costs one digest per request and turns a buggy
    /// backend into a visible `ValidationFailure` instead of a silently
    /// wrong answer.
    pub revalidate: bool,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            revalidate: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = DispatchConfig::default();
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
        assert!(config.revalidate);
    }
}
