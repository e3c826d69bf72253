//! Vehicle commands - remote actions on a single vehicle

use std::process::ExitCode;

use anyhow::Result;
use bluelink_client::{BlueLink, StartOptions};
use tracing::debug;

use crate::output::OutputContext;

/// Remote command to run against one vehicle
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VehicleCommand {
    Lock,
    Unlock,
    Start(StartOptions),
    Stop,
    Find,
    Odometer,
}

/// Log in, resolve `vin`, and run `command` on it.
///
/// An unknown VIN is reported to the user and yields a failing exit code.
pub async fn vehicle(
    session: &mut BlueLink,
    vin: &str,
    command: VehicleCommand,
    ctx: &OutputContext,
) -> Result<ExitCode> {
    session.login().await?;

    let Some(car) = session.vehicle(vin).await? else {
        ctx.error(&format!("Car with VIN {} not found.", vin));
        return Ok(ExitCode::FAILURE);
    };
    debug!(?command, vin, "Running vehicle command");

    match command {
        VehicleCommand::Lock => {
            car.lock().await?;
            ctx.success("Locking...");
        }
        VehicleCommand::Unlock => {
            car.unlock().await?;
            ctx.success("Unlocking...");
        }
        VehicleCommand::Start(options) => {
            car.start(options).await?;
            ctx.success("Starting...");
        }
        VehicleCommand::Stop => {
            car.stop().await?;
            ctx.success("Stopping...");
        }
        VehicleCommand::Find => {
            let location = car.find().await?;
            ctx.print_kv(&[
                ("Latitude", location.latitude.to_string()),
                ("Longitude", location.longitude.to_string()),
            ]);
        }
        VehicleCommand::Odometer => {
            let mileage = car.odometer().await?;
            ctx.print_kv(&[("Odometer", mileage.to_string())]);
        }
    }

    Ok(ExitCode::SUCCESS)
}
