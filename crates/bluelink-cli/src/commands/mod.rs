//! Command implementations for the bluelink CLI

pub mod cars;
pub mod vehicle;

#[cfg(test)]
mod mock;

pub use cars::cars;
pub use vehicle::{vehicle, VehicleCommand};
