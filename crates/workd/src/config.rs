//! Environment-driven daemon configuration.
//!
//! Every knob has a default that brings up a working simulated-backend
//! service; hardware deployments set the `WORKD_*` variables below.
//!
//! | Variable | Meaning | Default |
//! |----------|---------|---------|
//! | `WORKD_BACKEND` | `simulated` / `serial` / `accelerator` | `simulated` |
//! | `WORKD_DEVICE` | serial device path | required for `serial` |
//! | `WORKD_SERIAL_REVERSE_NONCE` | firmware nonce byte order (`1`/`0`) | `1` |
//! | `WORKD_SIMULATED_OUTPUT` | hex raw output for the simulated backend | zeroed buffer |
//! | `WORKD_DISPATCH_MODE` | `bus` / `direct` | `bus` |
//! | `WORKD_TIMEOUT_MS` | reply window in milliseconds | `10000` |
//! | `WORKD_REVALIDATE` | re-check nonces before returning (`1`/`0`) | `1` |
//! | `WORKD_HTTP_LISTEN` | listen address | `0.0.0.0:8090` |
//! | `WORKD_BUS_CAPACITY` | per-topic buffer | `1000` |

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use work_backends::BackendKind;
use work_core::RawOutput;
use work_dispatch::DispatchConfig;

/// Errors from loading or validating the daemon configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required variable for the selected backend is missing.
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// A variable was set to something unparseable.
    #[error("invalid environment variable {name}={value}: {reason}")]
    InvalidEnvVar {
        /// Variable name.
        name: &'static str,
        /// Offending value.
        value: String,
        /// Why it was rejected.
        reason: String,
    },
}

/// How the gateway reaches its backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DispatchMode {
    /// Through the bus and a backend worker (the default).
    Bus,
    /// Straight into a co-located solver, no pub/sub hop.
    Direct,
}

/// Backend selection and its device-specific knobs.
#[derive(Clone, Debug)]
pub struct BackendConfig {
    /// Which solver variant to construct.
    pub kind: BackendKind,
    /// Serial device path (`serial` backend only).
    pub device: Option<PathBuf>,
    /// Firmware nonce byte order for the serial backend.
    pub serial_reverse_nonce: bool,
    /// Fixed raw output for the simulated backend.
    pub simulated_output: RawOutput,
}

/// Full daemon configuration.
#[derive(Clone, Debug)]
pub struct WorkdConfig {
    /// Backend selection.
    pub backend: BackendConfig,
    /// Gateway-to-backend path.
    pub mode: DispatchMode,
    /// Coordinator settings.
    pub dispatch: DispatchConfig,
    /// HTTP listen address.
    pub http_listen: SocketAddr,
    /// Per-topic bus buffer capacity.
    pub bus_capacity: usize,
}

impl Default for WorkdConfig {
    fn default() -> Self {
        Self {
            backend: BackendConfig {
                kind: BackendKind::Simulated,
                device: None,
                serial_reverse_nonce: true,
                simulated_output: RawOutput::new(vec![0u8; 20]),
            },
            mode: DispatchMode::Bus,
            dispatch: DispatchConfig::default(),
            http_listen: SocketAddr::from(([0, 0, 0, 0], 8090)),
            bus_capacity: work_bus::DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

impl WorkdConfig {
    /// Load configuration from the environment, on top of the defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(value) = env::var("WORKD_BACKEND") {
            config.backend.kind = value.parse().map_err(|reason| invalid("WORKD_BACKEND", &value, reason))?;
        }

        if let Ok(value) = env::var("WORKD_DEVICE") {
            config.backend.device = Some(PathBuf::from(value));
        }

        if let Ok(value) = env::var("WORKD_SERIAL_REVERSE_NONCE") {
            config.backend.serial_reverse_nonce = parse_flag("WORKD_SERIAL_REVERSE_NONCE", &value)?;
        }

        if let Ok(value) = env::var("WORKD_SIMULATED_OUTPUT") {
            let raw = hex::decode(&value)
                .map_err(|err| invalid("WORKD_SIMULATED_OUTPUT", &value, err.to_string()))?;
            config.backend.simulated_output = RawOutput::new(raw);
        }

        if let Ok(value) = env::var("WORKD_DISPATCH_MODE") {
            config.mode = match value.to_ascii_lowercase().as_str() {
                "bus" => DispatchMode::Bus,
                "direct" => DispatchMode::Direct,
                _ => {
                    return Err(invalid(
                        "WORKD_DISPATCH_MODE",
                        &value,
                        "expected bus or direct".to_string(),
                    ))
                }
            };
        }

        if let Ok(value) = env::var("WORKD_TIMEOUT_MS") {
            let millis: u64 = value
                .parse()
                .map_err(|_| invalid("WORKD_TIMEOUT_MS", &value, "not a number".to_string()))?;
            config.dispatch.timeout = Duration::from_millis(millis);
        }

        if let Ok(value) = env::var("WORKD_REVALIDATE") {
            config.dispatch.revalidate = parse_flag("WORKD_REVALIDATE", &value)?;
        }

        if let Ok(value) = env::var("WORKD_HTTP_LISTEN") {
            config.http_listen = value
                .parse()
                .map_err(|_| invalid("WORKD_HTTP_LISTEN", &value, "not a socket address".to_string()))?;
        }

        if let Ok(value) = env::var("WORKD_BUS_CAPACITY") {
            config.bus_capacity = value
                .parse()
                .map_err(|_| invalid("WORKD_BUS_CAPACITY", &value, "not a number".to_string()))?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Cross-field checks that individual parses cannot catch.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.backend.kind == BackendKind::Serial && self.backend.device.is_none() {
            return Err(ConfigError::MissingEnvVar("WORKD_DEVICE"));
        }
        if self.backend.kind == BackendKind::Simulated
            && self.backend.simulated_output.len() < work_core::DEFAULT_NONCE_OFFSET + 8
        {
            return Err(ConfigError::InvalidEnvVar {
                name: "WORKD_SIMULATED_OUTPUT",
                value: hex::encode(self.backend.simulated_output.as_slice()),
                reason: "shorter than the nonce window".to_string(),
            });
        }
        if self.dispatch.timeout.is_zero() {
            return Err(ConfigError::InvalidEnvVar {
                name: "WORKD_TIMEOUT_MS",
                value: "0".to_string(),
                reason: "timeout must be positive".to_string(),
            });
        }
        Ok(())
    }
}

fn invalid(name: &'static str, value: &str, reason: String) -> ConfigError {
    ConfigError::InvalidEnvVar {
        name,
        value: value.to_string(),
        reason,
    }
}

fn parse_flag(name: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value {
        "1" | "true" => Ok(true),
        "0" | "false" => Ok(false),
        _ => Err(invalid(name, value, "expected 0/1 or true/false".to_string())),
    }
}
