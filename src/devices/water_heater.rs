//! Ariston-style water-heater cloud API.
//!
//! The real service authenticates with a token and addresses installations
//! ("plants") by id in the URL. The simulator accepts any credentials and any
//! plant id; all plants share the single `chargers.waterheater` record.

use axum::http::Method;
use serde_json::{Map, Value, json};
use tracing::info;

use crate::devices::types::{DeviceRequest, Handler, Reply};
use crate::world::{World, pointer};

const LOGIN_PATH: &str = "/api/v2/accounts/login";
const PLANTS_SEGMENT: &str = "/api/v2/remote/plants/";
const PLANT_DATA_SEGMENT: &str = "/api/v2/velis/slpPlantData/";

/// Token handed out by every login.
pub const TEST_TOKEN: &str = "test-token";

/// Water-heater cloud API: login, features query, boost and temperature commands.
#[derive(Debug, Clone, Copy, Default)]
pub struct WaterHeaterCloud;

impl Handler for WaterHeaterCloud {
    fn name(&self) -> &'static str {
        "water-heater"
    }

    fn handle(&self, request: &DeviceRequest, world: &mut World) -> Option<Reply> {
        let uri = request.uri.as_str();
        let is_post = request.method == Method::POST;

        if is_post && uri == LOGIN_PATH {
            return Some(Reply::json(json!({ "token": TEST_TOKEN })));
        }

        let is_features = uri.contains(PLANTS_SEGMENT) && uri.contains("/features");
        if request.method == Method::GET && is_features {
            return Some(Reply::json(features(world)));
        }

        if !is_post || !uri.contains(PLANT_DATA_SEGMENT) {
            return None;
        }

        if uri.contains("/boost") {
            info!(boost = %request.body, "water heater boost set");
            world.set(pointer::WATERHEATER_BOOST, request.body.clone());
            return Some(success());
        }

        if uri.contains("/temperatures") {
            let targets = request.body.get("new");
            let comfort = targets.and_then(|t| t.get("comfort")).cloned();
            let reduced = targets.and_then(|t| t.get("reduced")).cloned();
            info!(?comfort, ?reduced, "water heater temperatures set");
            assign_or_remove(world, pointer::WATERHEATER_COMFORT, comfort);
            assign_or_remove(world, pointer::WATERHEATER_REDUCED, reduced);
            return Some(success());
        }

        None
    }
}

/// A target missing from the command clears the stored one.
fn assign_or_remove(world: &mut World, pointer: &str, value: Option<Value>) {
    match value {
        Some(value) => world.set(pointer, value),
        None => {
            world.remove(pointer);
        }
    }
}

fn success() -> Reply {
    Reply::json(json!({ "success": true }))
}

/// Body of the `features` reply for the current world.
///
/// A temperature absent from the world is left out of the reply.
pub fn features(world: &World) -> Value {
    let mut body = Map::new();
    body.insert("success".into(), Value::Bool(true));
    for (key, pointer) in [
        ("comfort", pointer::WATERHEATER_COMFORT),
        ("reduced", pointer::WATERHEATER_REDUCED),
    ] {
        if let Some(value) = world.document().pointer(pointer) {
            body.insert(key.into(), value.clone());
        }
    }
    Value::Object(body)
}
