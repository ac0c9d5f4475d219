//! Test-control endpoints: replace or read the world, or stop the simulator.

use axum::http::Method;
use tracing::info;

use crate::devices::types::{DeviceRequest, Handler, Reply};
use crate::world::World;

const STATE_PATH: &str = "/api/state";
const SHUTDOWN_PATH: &str = "/api/shutdown";

/// Handles `/api/state` and `/api/shutdown`.
///
/// - `POST /api/state` replaces the world with the body.
/// - `POST /api/shutdown` acknowledges and asks the server to stop.
/// - any other method on `/api/state` returns the current world.
#[derive(Debug, Clone, Copy, Default)]
pub struct StateControl;

impl Handler for StateControl {
    fn name(&self) -> &'static str {
        "state"
    }

    fn handle(&self, request: &DeviceRequest, world: &mut World) -> Option<Reply> {
        let is_post = request.method == Method::POST;
        match request.uri.as_str() {
            STATE_PATH if is_post => {
                info!("world state replaced");
                world.replace(request.body.clone());
                Some(Reply::empty())
            }
            SHUTDOWN_PATH if is_post => {
                info!("shutdown requested");
                Some(Reply::empty().then_shutdown())
            }
            STATE_PATH => Some(Reply::json(world.document().clone())),
            _ => None,
        }
    }
}
