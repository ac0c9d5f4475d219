//! TOML-based simulator configuration and preset definitions.

use std::fmt;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::world::{Battery, Grid, Loadpoint, Pv, Site, Vehicle, WorldState};

/// Listen address used when none is configured.
pub const DEFAULT_BIND: &str = "127.0.0.1:7070";

/// Top-level simulator configuration parsed from TOML.
///
/// All fields have defaults matching the baseline preset. Load from TOML
/// with [`SimulatorConfig::from_toml_file`] or use
/// [`SimulatorConfig::baseline`] for the built-in default.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SimulatorConfig {
    /// Listener and output settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Initial world state.
    #[serde(default)]
    pub state: WorldState,
}

/// Listener and output settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Socket address to listen on, e.g. `"127.0.0.1:7070"`.
    pub bind: String,
    /// Where to write the request journal as CSV when the server stops.
    pub journal_out: Option<PathBuf>,
    /// Keep at most this many journal entries; unbounded when unset.
    pub journal_limit: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            journal_out: None,
            journal_limit: None,
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    /// Dotted field path (e.g., `"state.site.battery.soc"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "config error: {} — {}", self.field, self.message)
    }
}

impl std::error::Error for ConfigError {}

const LOADPOINT_STATUSES: &[&str] = &["A", "B", "C", "D", "E", "F"];

impl SimulatorConfig {
    /// Returns the baseline configuration: every meter at zero, one idle
    /// loadpoint, one empty vehicle, water heater at 60/45 °C.
    pub fn baseline() -> Self {
        Self {
            server: ServerConfig::default(),
            state: WorldState::default(),
        }
    }

    /// Returns the daytime preset: PV producing, battery charging from the
    /// surplus, one vehicle plugged in and charging.
    pub fn daytime() -> Self {
        Self {
            server: ServerConfig::default(),
            state: WorldState {
                site: Site {
                    grid: Grid { power: -1500.0 },
                    pv: Pv {
                        power: 6000.0,
                        energy: 12_500.0,
                    },
                    battery: Battery {
                        power: -2500.0,
                        soc: 65.0,
                    },
                },
                loadpoints: vec![Loadpoint {
                    power: 2000.0,
                    energy: 3.5,
                    enabled: true,
                    status: "C".to_string(),
                }],
                vehicles: vec![Vehicle {
                    soc: 45.0,
                    range: 210.0,
                }],
                ..WorldState::default()
            },
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["baseline", "daytime"];

    /// Loads a configuration from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "baseline" => Ok(Self::baseline()),
            "daytime" => Ok(Self::daytime()),
            _ => Err(ConfigError {
                field: "preset".to_string(),
                message: format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            }),
        }
    }

    /// Parses a configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError {
            field: "config".to_string(),
            message: format!("cannot read \"{}\": {e}", path.display()),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError {
            field: "toml".to_string(),
            message: e.to_string(),
        })
    }

    /// Parsed listen address.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if `server.bind` is not a socket address.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.server.bind.parse().map_err(|e| ConfigError {
            field: "server.bind".to_string(),
            message: format!("\"{}\" is not a socket address: {e}", self.server.bind),
        })
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if let Err(e) = self.bind_addr() {
            errors.push(e);
        }

        if self.server.journal_limit == Some(0) {
            errors.push(ConfigError {
                field: "server.journal_limit".into(),
                message: "must be >= 1 when set".into(),
            });
        }

        let soc = self.state.site.battery.soc;
        if !(0.0..=100.0).contains(&soc) {
            errors.push(ConfigError {
                field: "state.site.battery.soc".into(),
                message: format!("must be in [0, 100], got {soc}"),
            });
        }

        for (i, lp) in self.state.loadpoints.iter().enumerate() {
            if !LOADPOINT_STATUSES.contains(&lp.status.as_str()) {
                errors.push(ConfigError {
                    field: format!("state.loadpoints[{i}].status"),
                    message: format!("must be one of A-F, got \"{}\"", lp.status),
                });
            }
        }

        for (i, v) in self.state.vehicles.iter().enumerate() {
            if !(0.0..=100.0).contains(&v.soc) {
                errors.push(ConfigError {
                    field: format!("state.vehicles[{i}].soc"),
                    message: format!("must be in [0, 100], got {}", v.soc),
                });
            }
            if v.range < 0.0 {
                errors.push(ConfigError {
                    field: format!("state.vehicles[{i}].range"),
                    message: "must be >= 0".into(),
                });
            }
        }

        let heater = &self.state.chargers.waterheater;
        if heater.reduced > heater.comfort {
            errors.push(ConfigError {
                field: "state.chargers.waterheater.reduced".into(),
                message: "must be <= state.chargers.waterheater.comfort".into(),
            });
        }

        errors
    }
}
