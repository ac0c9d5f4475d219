//! Mock device simulator for end-to-end tests of an energy-management application.
//!
//! Imitates an energy-management system, a vehicle telemetry service, a smart
//! switch and a water-heater cloud API over HTTP, all backed by one mutable
//! world document.

/// HTTP router, dispatch and server loop.
pub mod api;
pub mod config;
/// Simulated device APIs and the ordered handler chain.
pub mod devices;
pub mod error;
pub mod io;
pub mod journal;
/// The world state document.
pub mod world;
