//! TeslaLogger-style vehicle telemetry (`GET /currentjson/<id>`).

use axum::http::{Method, StatusCode};
use serde_json::{Value, json};

use crate::devices::types::{DeviceRequest, Handler, Reply};
use crate::world::World;

const PREFIX: &str = "/currentjson/";

/// Odometer reading reported for every vehicle (km).
const ODOMETER_KM: u32 = 10_000;
/// Charge current every vehicle asks for (A).
const CHARGE_CURRENT_REQUEST_A: u32 = 10;

/// Telemetry record for a known vehicle.
///
/// Only `battery_level` and `battery_range_km` come from the world; the rest
/// describe a parked, plugged-in car that is not charging.
fn telemetry(vehicle: &Value) -> Value {
    json!({
        "battery_level": vehicle.get("soc").cloned().unwrap_or(Value::Null),
        "battery_range_km": vehicle.get("range").cloned().unwrap_or(Value::Null),
        "plugged_in": true,
        "charging": false,
        "odometer": ODOMETER_KM,
        "is_preconditioning": false,
        "charge_current_request": CHARGE_CURRENT_REQUEST_A,
    })
}

/// Vehicle telemetry service. Vehicles are addressed by 1-based position.
#[derive(Debug, Clone, Copy, Default)]
pub struct VehicleTelemetryReader;

impl Handler for VehicleTelemetryReader {
    fn name(&self) -> &'static str {
        "vehicle"
    }

    fn handle(&self, request: &DeviceRequest, world: &mut World) -> Option<Reply> {
        if request.method != Method::GET {
            return None;
        }
        let segment = request.path().strip_prefix(PREFIX)?;
        let vehicle = vehicle_index(segment).and_then(|index| world.vehicle(index));

        let Some(vehicle) = vehicle else {
            return Some(
                Reply::json(json!({ "error": "Vehicle not found" }))
                    .with_status(StatusCode::NOT_FOUND),
            );
        };

        Some(Reply::json(telemetry(vehicle)))
    }
}

/// Converts the id segment to a 0-based index.
///
/// The id is the leading integer of the segment (`"2"`, `"2/extra"` and
/// `"2abc"` all address vehicle 2). Ids below 1 address nothing.
fn vehicle_index(segment: &str) -> Option<usize> {
    let digits: &str = segment
        .find(|c: char| !c.is_ascii_digit())
        .map_or(segment, |end| &segment[..end]);
    let id: usize = digits.parse().ok()?;
    id.checked_sub(1)
}
