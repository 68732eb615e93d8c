// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! cdc_sim - drive a console through a scripted host session
//!
//! Plugs in a loopback device, opens the port, types a few lines (one of
//! them cut short by Ctrl-C), then optionally performs the 1200-baud touch
//! that asks firmware to reboot into its bootloader.

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use cdc_console::config::{
    apply_cli_overrides, apply_environment_overrides, load_config, validate_config,
    CdcConsoleConfig, ConfigError,
};
use cdc_console::driver::{CdcError, DEFAULT_RX_CAPACITY};
use cdc_console::observability::{CrateDebugFlags, LoggingConfig};
use cdc_console::sim::Simulator;

/// Scripted USB CDC console session over an in-memory transport
#[derive(Parser, Debug)]
#[command(name = "cdc_sim", version, author, long_about = None)]
struct Args {
    /// Path to cdc_console.toml (searched for when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Extra line typed after the scripted ones
    #[arg(short, long)]
    input: Vec<String>,

    /// Baud rate used for the interactive part of the session
    #[arg(long, default_value_t = 115_200)]
    baud: u32,

    /// Skip the 1200-baud bootloader touch at the end
    #[arg(long, default_value_t = false)]
    no_reset: bool,

    /// Log level override (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Bounded write retry count override (0 = retry forever)
    #[arg(long)]
    max_write_attempts: Option<u32>,

    /// Enable debug logging for a crate (repeatable)
    #[arg(long = "debug", value_name = "CRATE")]
    debug: Vec<String>,

    /// Enable debug logging for every crate
    #[arg(long, default_value_t = false)]
    debug_all: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = resolve_config(&args)?;
    validate_config(&config).context("Invalid configuration")?;

    let mut flags = CrateDebugFlags::default()
        .with_crates(&config.logging.debug_crates)
        .with_crates(&args.debug)
        .with_env();
    if args.debug_all {
        flags = flags.with_crates(["all"]);
    }
    let logging = LoggingConfig::with_level(config.logging.level.clone());

    #[cfg(feature = "file-logging")]
    let _guard = cdc_console::observability::init_logging(&flags, &logging)?;
    #[cfg(not(feature = "file-logging"))]
    cdc_console::observability::init_console_logging(&flags, &logging)?;

    info!(
        version = cdc_console::observability::VERSION,
        rx_buffer = config.console.rx_buffer_size,
        "cdc_sim starting"
    );

    let mut sim: Simulator<DEFAULT_RX_CAPACITY> = Simulator::from_config(&config)?;
    run_session(&mut sim, &args)?;

    println!("\n--- host terminal ---");
    println!("{}", String::from_utf8_lossy(&sim.host_output()));
    println!("--- session report ---");
    println!("{}", sim.report());
    if sim.report().resets > 0 {
        println!("✓ Bootloader reset requested");
    }
    Ok(())
}

fn resolve_config(args: &Args) -> Result<CdcConsoleConfig> {
    let mut overrides = HashMap::new();
    if let Some(level) = &args.log_level {
        overrides.insert("log_level".to_string(), level.clone());
    }
    if let Some(attempts) = args.max_write_attempts {
        overrides.insert("max_write_attempts".to_string(), attempts.to_string());
    }

    match load_config(args.config.as_deref(), Some(&overrides)) {
        Ok(config) => Ok(config),
        Err(ConfigError::FileNotFound(_)) if args.config.is_none() => {
            let mut config = CdcConsoleConfig::default();
            apply_environment_overrides(&mut config);
            apply_cli_overrides(&mut config, &overrides);
            Ok(config)
        }
        Err(e) => Err(e).context("Failed to load configuration"),
    }
}

fn run_session(sim: &mut Simulator<DEFAULT_RX_CAPACITY>, args: &Args) -> Result<()> {
    if !sim.plug_in() {
        anyhow::bail!("Loopback device failed to enable");
    }
    sim.open_port(args.baud)?;

    step(sim, b"1 + 1\r")?;
    step(sim, b"while True: pass\x03")?;
    for line in &args.input {
        let mut bytes = line.clone().into_bytes();
        bytes.push(b'\r');
        step(sim, &bytes)?;
    }
    sim.close_port()?;

    if !args.no_reset {
        info!("Touching the port at 1200 baud");
        sim.open_port(cdc_console::driver::BOOTLOADER_RESET_BAUD)?;
        sim.close_port()?;
    }
    Ok(())
}

/// Type `text` then let the foreground drain it
fn step(sim: &mut Simulator<DEFAULT_RX_CAPACITY>, text: &[u8]) -> Result<(), CdcError> {
    if let Err(e) = sim.type_text(text) {
        warn!(%e, "Receive handler reported an error");
    }
    let read = sim.run_foreground()?;
    info!(read, interrupts = sim.host().cancellations(), "Foreground pass done");
    Ok(())
}
