//! Simulated device APIs and the ordered chain that dispatches to them.

/// Energy-management system channel reads.
pub mod energy_system;
/// Test-control endpoints for the world state and shutdown.
pub mod state_control;
/// Smart switch metering PV production.
pub mod switch;
pub mod types;
/// Vehicle telemetry service.
pub mod vehicle;
/// Water-heater cloud API.
pub mod water_heater;

// Re-export the main types for convenience
pub use energy_system::EnergySystem;
pub use state_control::StateControl;
pub use switch::Switch;
pub use types::{DeviceRequest, Disposition, Handler, Reply};
pub use vehicle::VehicleTelemetryReader;
pub use water_heater::WaterHeaterCloud;

use crate::world::World;

/// Ordered list of handlers, consulted first to last.
///
/// The first handler that claims a request answers it; later handlers never
/// see it.
pub struct HandlerChain {
    handlers: Vec<Box<dyn Handler>>,
}

impl HandlerChain {
    /// Creates a chain from handlers in priority order.
    pub fn new(handlers: Vec<Box<dyn Handler>>) -> Self {
        Self { handlers }
    }

    /// The simulator's standard chain: state control, energy system,
    /// vehicle telemetry, switch, water heater.
    pub fn standard() -> Self {
        Self::new(vec![
            Box::new(StateControl),
            Box::new(EnergySystem),
            Box::new(VehicleTelemetryReader),
            Box::new(Switch),
            Box::new(WaterHeaterCloud),
        ])
    }

    /// Handler names in priority order.
    pub fn names(&self) -> Vec<&'static str> {
        self.handlers.iter().map(|h| h.name()).collect()
    }

    /// Offers `request` to each handler in turn.
    ///
    /// # Returns
    ///
    /// The claiming handler's name and its reply, or `None` if no handler
    /// claimed the request.
    pub fn dispatch(
        &self,
        request: &DeviceRequest,
        world: &mut World,
    ) -> Option<(&'static str, Reply)> {
        self.handlers
            .iter()
            .find_map(|handler| handler.handle(request, world).map(|reply| (handler.name(), reply)))
    }
}

impl Default for HandlerChain {
    fn default() -> Self {
        Self::standard()
    }
}
