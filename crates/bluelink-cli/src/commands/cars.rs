//! Cars command - list vehicles on the account

use anyhow::Result;
use bluelink_client::BlueLink;

use crate::output::{OutputContext, VehicleRow};

/// List all vehicles on the account
pub async fn cars(session: &mut BlueLink, ctx: &OutputContext) -> Result<()> {
    session.login().await?;

    let rows: Vec<VehicleRow> = session
        .vehicles()
        .await?
        .values()
        .map(|car| VehicleRow {
            vin: car.vin().to_string(),
            nickname: car.nickname().to_string(),
            model: car.model().to_string(),
            year: car.year(),
            bluelink: car.is_bluelink(),
        })
        .collect();

    ctx.print(&rows);
    Ok(())
}
