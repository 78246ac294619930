//! CLI application for controlling Hue lights.
//!
//! This example demonstrates discovery, the link-button authorization flow
//! and per-light control through a bridge.
//!
//! Run with: cargo run --example hue_cli -- --help

use std::time::Duration;

use clap::{Parser, Subcommand};
use hue_bridge_rs::{Bridge, BridgeData};

#[derive(Parser)]
#[command(name = "hue-cli")]
#[command(about = "Control Philips Hue lights from the command line", long_about = None)]
struct Cli {
    /// Id of the bridge (as printed by `discover`)
    #[arg(short, long, global = true)]
    bridge: Option<String>,

    /// IP address of the bridge; looked up through discovery when omitted
    #[arg(short, long, global = true)]
    ip: Option<String>,

    /// Username obtained from `authorize`
    #[arg(short, long, global = true)]
    username: Option<String>,

    /// Transition time in milliseconds
    #[arg(short, long, global = true)]
    time: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List bridges registered from this network
    Discover,

    /// Wait for the link button and print the new username
    Authorize {
        #[arg(long, default_value = "hue_cli")]
        app: String,
        #[arg(long, default_value = "terminal")]
        device: String,
    },

    /// Revoke a username
    Revoke { username: String },

    /// Print the bridge configuration
    Config,

    /// List lights
    Lights,

    /// Print the state of a light
    Status { light: String },

    /// Turn a light on
    On { light: String },

    /// Turn a light off
    Off { light: String },

    /// Set a color from a hex code, e.g. "#ff8000"
    Color { light: String, hex: String },

    /// Set brightness (1-254)
    Brightness {
        light: String,
        #[arg(value_parser = clap::value_parser!(u8).range(1..=254))]
        level: u8,
    },

    /// Set color temperature in mired (153-500)
    Temperature {
        light: String,
        #[arg(value_parser = clap::value_parser!(u16).range(153..=500))]
        mired: u16,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if let Commands::Discover = cli.command {
        println!("Discovering Hue bridges...");
        let bridges = Bridge::discover_bridges().await?;
        if bridges.is_empty() {
            println!("No bridges found.");
        }
        for data in bridges {
            println!(
                "  id: {}  ip: {}",
                data.id,
                data.internalipaddress.as_deref().unwrap_or("?")
            );
        }
        return Ok(());
    }

    let id = cli
        .bridge
        .ok_or("Bridge id is required for this command. Use --bridge <ID>")?;
    let mut data = BridgeData::new(&id);
    if let Some(ip) = &cli.ip {
        data = data.with_ip_address(ip);
    }
    if let Some(username) = &cli.username {
        data = data.with_username(username);
    }
    let time = cli.time.map(Duration::from_millis);

    let (app, device) = match &cli.command {
        Commands::Authorize { app, device } => (app.clone(), device.clone()),
        _ => ("hue_cli".to_string(), "terminal".to_string()),
    };
    let bridge = Bridge::new(data, &app, &device);

    match cli.command {
        Commands::Discover => unreachable!(),

        Commands::Authorize { .. } => {
            println!("Press the link button on bridge {}...", bridge.id());
            bridge.wait_for_authorization().await?;
            println!("Authorized. Username: {}", bridge.username().await);
        }

        Commands::Revoke { username } => {
            let result = bridge.remove_authorization(&username).await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }

        Commands::Config => {
            let config = bridge.get_config(false).await?;
            println!("{}", serde_json::to_string_pretty(&config)?);
        }

        Commands::Lights => {
            for light in bridge.get_lights().await? {
                println!(
                    "  {:>3}  {:30}  {}",
                    light.light_id(),
                    light.name(),
                    light.light_type()
                );
            }
        }

        command => {
            bridge.get_lights().await?;
            let light_id = match &command {
                Commands::Status { light }
                | Commands::On { light }
                | Commands::Off { light }
                | Commands::Color { light, .. }
                | Commands::Brightness { light, .. }
                | Commands::Temperature { light, .. } => light.clone(),
                _ => unreachable!(),
            };
            let mut light = bridge
                .light(&light_id)
                .await
                .ok_or_else(|| format!("No light with id {}", light_id))?;

            match command {
                Commands::Status { .. } => {
                    let state = light.get_state().await?;
                    println!("{} ({})", light.name(), light.light_type());
                    println!("  Power: {}", if state.on { "ON" } else { "OFF" });
                    if let Some(bri) = state.bri {
                        println!("  Brightness: {}", bri);
                    }
                    if let Some(cie) = state.cie() {
                        println!("  Color: {}", cie.to_hex());
                    }
                    if let Some(ct) = state.ct {
                        println!("  Temperature: {} mired", ct);
                    }
                    println!("  Reachable: {}", state.reachable);
                }
                Commands::On { .. } => {
                    light.set_on(true, time).await?;
                }
                Commands::Off { .. } => {
                    light.set_on(false, time).await?;
                }
                Commands::Color { hex, .. } => {
                    light.set_color_hex(&hex, time).await?;
                }
                Commands::Brightness { level, .. } => {
                    light.set_brightness(level, time).await?;
                }
                Commands::Temperature { mired, .. } => {
                    light.set_color_temperature(mired, time).await?;
                }
                _ => unreachable!(),
            }
        }
    }

    Ok(())
}
