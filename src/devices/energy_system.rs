//! OpenEMS-style REST channel reads for the site meters.

use axum::http::Method;
use serde_json::json;

use crate::devices::types::{DeviceRequest, Handler, Reply};
use crate::world::{World, pointer};

/// Channel path to world pointer, one entry per exposed meter.
const CHANNELS: &[(&str, &str)] = &[
    ("/rest/channel/_sum/GridActivePower", pointer::GRID_POWER),
    ("/rest/channel/_sum/ProductionActivePower", pointer::PV_POWER),
    ("/rest/channel/_sum/EssDischargePower", pointer::BATTERY_POWER),
    ("/rest/channel/_sum/EssSoc", pointer::BATTERY_SOC),
];

/// Read-only energy-management system. `GET <channel>` → `{"value": <field>}`.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnergySystem;

impl Handler for EnergySystem {
    fn name(&self) -> &'static str {
        "energy-system"
    }

    fn handle(&self, request: &DeviceRequest, world: &mut World) -> Option<Reply> {
        if request.method != Method::GET {
            return None;
        }
        let (_, field) = CHANNELS
            .iter()
            .find(|(channel, _)| *channel == request.uri)?;
        Some(Reply::json(json!({ "value": world.get(field) })))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use super::*;

    fn world_with_site() -> World {
        let mut world = World::default();
        world.replace(json!({
            "site": {
                "grid": { "power": 1200 },
                "pv": { "power": 3400, "energy": 10 },
                "battery": { "power": -500, "soc": 77 },
            }
        }));
        world
    }

    fn get(world: &mut World, uri: &str) -> Option<Reply> {
        EnergySystem.handle(&DeviceRequest::new(Method::GET, uri), world)
    }

    #[test]
    fn each_channel_maps_to_its_field() {
        let mut world = world_with_site();
        let cases = [
            ("/rest/channel/_sum/GridActivePower", 1200),
            ("/rest/channel/_sum/ProductionActivePower", 3400),
            ("/rest/channel/_sum/EssDischargePower", -500),
            ("/rest/channel/_sum/EssSoc", 77),
        ];
        for (uri, expected) in cases {
            let reply = get(&mut world, uri).unwrap();
            assert_eq!(reply.body, Some(json!({ "value": expected })), "{uri}");
        }
    }

    #[test]
    fn missing_field_reads_as_null() {
        let mut world = World::default();
        world.replace(json!({}));
        let reply = get(&mut world, "/rest/channel/_sum/EssSoc").unwrap();
        assert_eq!(reply.body, Some(json!({ "value": Value::Null })));
    }

    #[test]
    fn declines_other_methods_and_paths() {
        let mut world = world_with_site();
        assert!(get(&mut world, "/rest/channel/_sum/Unknown").is_none());
        assert!(get(&mut world, "/rest/channel/_sum/EssSoc?x=1").is_none());
        assert!(
            EnergySystem
                .handle(
                    &DeviceRequest::new(Method::POST, "/rest/channel/_sum/EssSoc"),
                    &mut world
                )
                .is_none()
        );
    }
}
