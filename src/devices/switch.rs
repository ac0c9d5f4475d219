//! Shelly gen2 smart switch metering the PV production.

use serde_json::json;

use crate::devices::types::{DeviceRequest, Handler, Reply};
use crate::world::{World, pointer};

/// Gen2 switch: device probe, method listing and a status query that reports
/// the site's PV power and energy at call time.
#[derive(Debug, Clone, Copy, Default)]
pub struct Switch;

impl Handler for Switch {
    fn name(&self) -> &'static str {
        "switch"
    }

    fn handle(&self, request: &DeviceRequest, world: &mut World) -> Option<Reply> {
        let body = match request.uri.as_str() {
            "/shelly" => json!({ "gen": 2 }),
            "/rpc/Shelly.ListMethods" => json!({ "methods": ["Switch.GetStatus"] }),
            "/rpc/Switch.GetStatus?id=0" => json!({
                "apower": world.get(pointer::PV_POWER),
                "aenergy": { "total": world.get(pointer::PV_ENERGY) },
            }),
            _ => return None,
        };
        Some(Reply::json(body))
    }
}
