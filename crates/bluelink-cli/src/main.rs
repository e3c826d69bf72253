//! BlueLink CLI - remote commands for Hyundai BlueLink vehicles
//!
//! Credentials come from `--email`/`--password`/`--pin` or the
//! `BLUELINK_EMAIL`, `BLUELINK_PASSWORD` and `BLUELINK_PIN` environment variables.

mod commands;
mod config;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use bluelink_client::{BlueLink, BlueLinkError, ClientConfig, Credentials, StartOptions, Temperature};
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::commands::VehicleCommand;
use crate::config::Config;
use crate::output::{OutputContext, OutputFormat};

#[derive(Parser)]
#[command(name = "bluelink")]
#[command(author, version, about = "CLI for Hyundai's BlueLink service")]
#[command(propagate_version = true)]
struct Cli {
    /// Account email (defaults to $BLUELINK_EMAIL)
    #[arg(long, global = true)]
    email: Option<String>,

    /// Account password (defaults to $BLUELINK_PASSWORD)
    #[arg(long, global = true)]
    password: Option<String>,

    /// Account PIN (defaults to $BLUELINK_PIN)
    #[arg(long, global = true)]
    pin: Option<String>,

    /// Configuration file path
    #[arg(short, long, env = "BLUELINK_CONFIG")]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum)]
    output: Option<OutputFormat>,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Minimal output (for scripting)
    #[arg(short, long)]
    quiet: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List vehicles on the account
    Cars,

    /// Lock the doors
    Lock {
        /// Vehicle VIN
        vin: String,
    },

    /// Unlock the doors
    Unlock {
        /// Vehicle VIN
        vin: String,
    },

    /// Start the engine with climate control
    Start {
        /// Vehicle VIN
        vin: String,

        /// Minutes to run the engine (10 max)
        #[arg(long, default_value_t = 10)]
        duration: u32,

        /// Temperature: HI, LO, or a number
        #[arg(long, default_value = "LO")]
        temp: Temperature,

        /// Defrost the car
        #[arg(long)]
        defrost: bool,

        /// Driver seat heat level
        #[arg(long, visible_alias = "dsh", default_value_t = 4)]
        driver_seat_heat: u8,

        /// Passenger seat heat level
        #[arg(long, visible_alias = "psh", default_value_t = 4)]
        passenger_seat_heat: u8,
    },

    /// Stop the engine
    Stop {
        /// Vehicle VIN
        vin: String,
    },

    /// Show the vehicle's location
    Find {
        /// Vehicle VIN
        vin: String,
    },

    /// Show the odometer reading
    Odometer {
        /// Vehicle VIN
        vin: String,
    },
}

impl Commands {
    /// Split a vehicle subcommand into its VIN and action
    fn into_vehicle_command(self) -> Option<(String, VehicleCommand)> {
        Some(match self {
            Commands::Cars => return None,
            Commands::Lock { vin } => (vin, VehicleCommand::Lock),
            Commands::Unlock { vin } => (vin, VehicleCommand::Unlock),
            Commands::Start {
                vin,
                duration,
                temp,
                defrost,
                driver_seat_heat,
                passenger_seat_heat,
            } => (
                vin,
                VehicleCommand::Start(StartOptions {
                    duration,
                    temperature: temp,
                    defrost,
                    driver_seat_heat,
                    passenger_seat_heat,
                }),
            ),
            Commands::Stop { vin } => (vin, VehicleCommand::Stop),
            Commands::Find { vin } => (vin, VehicleCommand::Find),
            Commands::Odometer { vin } => (vin, VehicleCommand::Odometer),
        })
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();

    let ctx = OutputContext::new(cli.output.unwrap_or_default(), cli.no_color, cli.quiet);

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            match e.downcast_ref::<BlueLinkError>() {
                Some(err) if !err.is_request_failure() => {
                    ctx.error("Credentials not found. See docs for info on how to set them.")
                }
                Some(err) => ctx.error(&err.to_string()),
                None => ctx.error(&format!("{:#}", e)),
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    // Load config file
    let config = if let Some(config_path) = &cli.config {
        Config::load_from(config_path)?
    } else {
        Config::load().unwrap_or_default()
    };

    // Merge CLI args with config
    let merged = config.merge_with_args(cli.output, cli.no_color);
    let ctx = OutputContext::new(merged.output, merged.no_color, cli.quiet);

    let credentials = Credentials::resolve(cli.email, cli.password, cli.pin)?;
    let mut session = create_session(credentials, &merged.base_url)?;

    match cli.command.into_vehicle_command() {
        None => {
            commands::cars(&mut session, &ctx).await?;
            Ok(ExitCode::SUCCESS)
        }
        Some((vin, command)) => commands::vehicle(&mut session, &vin, command, &ctx).await,
    }
}

/// Create a BlueLink session for the given service origin
fn create_session(credentials: Credentials, base_url: &str) -> Result<BlueLink> {
    BlueLink::with_config(credentials, ClientConfig::with_base_url(base_url))
        .context("Failed to create BlueLink session")
}
