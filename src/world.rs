//! World state: the single document backing every simulated device response.
//!
//! The typed model ([`WorldState`]) describes the defaults and the initial
//! state loaded from configuration. At runtime the state is held as a JSON
//! document ([`World`]) so that a replaced document is echoed back verbatim,
//! including fields the typed model does not know about.

use serde::Deserialize;
use serde_json::{Map, Value, json};

/// JSON pointers into the world document read or written by device handlers.
pub mod pointer {
    pub const GRID_POWER: &str = "/site/grid/power";
    pub const PV_POWER: &str = "/site/pv/power";
    pub const PV_ENERGY: &str = "/site/pv/energy";
    pub const BATTERY_POWER: &str = "/site/battery/power";
    pub const BATTERY_SOC: &str = "/site/battery/soc";
    pub const VEHICLES: &str = "/vehicles";
    pub const WATERHEATER_BOOST: &str = "/chargers/waterheater/boost";
    pub const WATERHEATER_COMFORT: &str = "/chargers/waterheater/comfort";
    pub const WATERHEATER_REDUCED: &str = "/chargers/waterheater/reduced";
}

/// Typed world state used for defaults and configuration.
///
/// Every section falls back to its default when omitted, so a configuration
/// file only needs to name the values it changes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorldState {
    /// Site-level meters.
    pub site: Site,
    /// Simulated charging points.
    pub loadpoints: Vec<Loadpoint>,
    /// Simulated vehicles, addressed by 1-based position.
    pub vehicles: Vec<Vehicle>,
    /// Controllable chargers keyed by device kind.
    pub chargers: Chargers,
}

impl Default for WorldState {
    fn default() -> Self {
        Self {
            site: Site::default(),
            loadpoints: vec![Loadpoint::default()],
            vehicles: vec![Vehicle::default()],
            chargers: Chargers::default(),
        }
    }
}

/// Site-level meters.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Site {
    pub grid: Grid,
    pub pv: Pv,
    pub battery: Battery,
}

/// Grid connection meter.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Grid {
    /// Instantaneous grid power (W).
    pub power: f64,
}

/// Solar production meter.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Pv {
    /// Instantaneous solar power (W).
    pub power: f64,
    /// Cumulative solar energy (Wh).
    pub energy: f64,
}

/// Home battery meter.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Battery {
    /// Instantaneous battery power (W).
    pub power: f64,
    /// State of charge (%).
    pub soc: f64,
}

/// A simulated charging point.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Loadpoint {
    pub power: f64,
    pub energy: f64,
    pub enabled: bool,
    /// IEC 61851 status letter (`A`..`F`).
    pub status: String,
}

impl Default for Loadpoint {
    fn default() -> Self {
        Self {
            power: 0.0,
            energy: 0.0,
            enabled: false,
            status: "A".to_string(),
        }
    }
}

/// A simulated vehicle.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Vehicle {
    /// State of charge (%).
    pub soc: f64,
    /// Remaining range (km).
    pub range: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Chargers {
    pub waterheater: WaterHeater,
}

/// Water-heater target temperatures and boost flag.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WaterHeater {
    pub boost: bool,
    /// Comfort target temperature (°C).
    pub comfort: f64,
    /// Reduced target temperature (°C).
    pub reduced: f64,
}

impl Default for WaterHeater {
    fn default() -> Self {
        Self {
            boost: false,
            comfort: 60.0,
            reduced: 45.0,
        }
    }
}

/// Whole numbers render as JSON integers (`60`, not `60.0`).
fn number(value: f64) -> Value {
    const MAX_EXACT: f64 = 9_007_199_254_740_992.0;
    if value.fract() == 0.0 && value.abs() <= MAX_EXACT {
        json!(value as i64)
    } else {
        json!(value)
    }
}

impl From<&WorldState> for Value {
    fn from(state: &WorldState) -> Self {
        let site = &state.site;
        let heater = &state.chargers.waterheater;
        json!({
            "site": {
                "grid": { "power": number(site.grid.power) },
                "pv": { "power": number(site.pv.power), "energy": number(site.pv.energy) },
                "battery": {
                    "power": number(site.battery.power),
                    "soc": number(site.battery.soc),
                },
            },
            "loadpoints": state
                .loadpoints
                .iter()
                .map(|lp| json!({
                    "power": number(lp.power),
                    "energy": number(lp.energy),
                    "enabled": lp.enabled,
                    "status": lp.status,
                }))
                .collect::<Vec<_>>(),
            "vehicles": state
                .vehicles
                .iter()
                .map(|v| json!({ "soc": number(v.soc), "range": number(v.range) }))
                .collect::<Vec<_>>(),
            "chargers": {
                "waterheater": {
                    "boost": heater.boost,
                    "comfort": number(heater.comfort),
                    "reduced": number(heater.reduced),
                },
            },
        })
    }
}

/// The live world document.
///
/// Owned by the router state and lent to handlers one request at a time.
#[derive(Debug, Clone, PartialEq)]
pub struct World {
    document: Value,
}

impl World {
    /// Creates a world from the typed initial state.
    pub fn new(state: &WorldState) -> Self {
        Self {
            document: Value::from(state),
        }
    }

    /// The current document, exactly as last written.
    pub fn document(&self) -> &Value {
        &self.document
    }

    /// Replaces the whole document. No merge with the previous state.
    pub fn replace(&mut self, document: Value) {
        self.document = document;
    }

    /// Reads the value at `pointer`, or `null` when the path is absent.
    pub fn get(&self, pointer: &str) -> Value {
        self.document.pointer(pointer).cloned().unwrap_or(Value::Null)
    }

    /// Returns the vehicle at 0-based `index`, if present.
    pub fn vehicle(&self, index: usize) -> Option<&Value> {
        self.document
            .pointer(pointer::VEHICLES)
            .and_then(Value::as_array)
            .and_then(|vehicles| vehicles.get(index))
    }

    /// Writes `value` at `pointer`, creating intermediate objects as needed.
    ///
    /// Any non-object found along the path is replaced by an empty object.
    pub fn set(&mut self, pointer: &str, value: Value) {
        let mut target = &mut self.document;
        for key in pointer.split('/').skip(1) {
            if !target.is_object() {
                *target = Value::Object(Map::new());
            }
            target = match target {
                Value::Object(map) => map.entry(key).or_insert(Value::Null),
                _ => return,
            };
        }
        *target = value;
    }

    /// Deletes the field at `pointer`, keeping the order of its siblings.
    ///
    /// Returns the removed value; a missing path is a no-op.
    pub fn remove(&mut self, pointer: &str) -> Option<Value> {
        let (parent, key) = pointer.rsplit_once('/')?;
        self.document
            .pointer_mut(parent)
            .and_then(Value::as_object_mut)
            .and_then(|map| map.shift_remove(key))
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new(&WorldState::default())
    }
}
