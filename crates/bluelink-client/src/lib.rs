//! BlueLink Client Library
//!
//! Talks to the private endpoints behind the Hyundai BlueLink owner dashboard:
//! log in, list the vehicles on an account, and send remote commands.
//!
//! # Example
//!
//! ```rust,no_run
//! use bluelink_client::{BlueLink, Credentials, StartOptions, Temperature};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     // Falls back to BLUELINK_EMAIL / BLUELINK_PASSWORD / BLUELINK_PIN
//!     let credentials = Credentials::resolve(None, None, None)?;
//!     let mut bluelink = BlueLink::new(credentials)?;
//!     bluelink.login().await?;
//!
//!     for (vin, car) in bluelink.vehicles().await? {
//!         println!("{} {} - {}", car.year(), car.model(), vin);
//!     }
//!
//!     if let Some(car) = bluelink.vehicle("KM8KN4AE0NU000001").await? {
//!         car.start(StartOptions {
//!             temperature: Temperature::Degrees(72.0),
//!             ..Default::default()
//!         })
//!         .await?;
//!
//!         let location = car.find().await?;
//!         println!("{}, {}", location.latitude, location.longitude);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Testing
//!
//! The `testing` module runs an axum router in-process and hands out
//! sessions pointed at it:
//!
//! ```rust,ignore
//! use bluelink_client::testing::TestServer;
//!
//! let server = TestServer::start(mock_router()).await?;
//! let mut session = server.session(credentials)?;
//! session.login().await?;
//! ```

mod client;
mod config;
pub mod envelope;
mod error;
pub mod testing;
mod types;
mod vehicle;

pub use client::BlueLink;
pub use config::{
    ClientConfig, Credentials, DEFAULT_BASE_URL, EMAIL_ENV, PASSWORD_ENV, PIN_ENV,
};
pub use error::{BlueLinkError, Result};
pub use types::*;
pub use vehicle::{RemoteAction, Vehicle};
