//! Command signing utility
//! Prints a signed command exactly as the ground station transmits it

use anyhow::Context;
use pysquared_rs::auth::HmacAuthenticator;
use pysquared_rs::command::envelope;
use pysquared_rs::core::SatelliteConfig;
use serde_json::{Map, Value};
use std::env;
use tracing_subscriber::{fmt::format::FmtSpan, prelude::*, EnvFilter};

fn main() -> anyhow::Result<()> {
    let filter_layer = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;

    let format_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::NONE)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(format_layer)
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 4 {
        eprintln!("Usage: {} <config.json> <counter> <command> [args...]", args[0]);
        eprintln!("Example: {} config.json 17 change_radio_modulation FSK", args[0]);
        eprintln!("\nThe counter must be greater than the last one the satellite accepted.");
        std::process::exit(1);
    }

    let config = SatelliteConfig::load(&args[1])
        .with_context(|| format!("loading config {}", args[1]))?;
    let counter: u64 = args[2]
        .parse()
        .with_context(|| format!("counter must be a non-negative integer, got {:?}", args[2]))?;
    let command = &args[3];
    let command_args: Vec<Value> = args[4..].iter().cloned().map(Value::from).collect();

    if command.is_empty() {
        anyhow::bail!("command name is empty");
    }

    let mut body = Map::new();
    body.insert("name".to_string(), Value::from(config.cubesat_name.as_str()));
    body.insert("command".to_string(), Value::from(command.as_str()));
    if !command_args.is_empty() {
        body.insert("args".to_string(), Value::Array(command_args));
    }

    let authenticator = HmacAuthenticator::new(&config.hmac_secret);
    let sealed = envelope::seal(&authenticator, body, counter)?;

    tracing::info!(satellite = %config.cubesat_name, counter, command = %command, "Signed command");
    println!("{}", Value::Object(sealed));

    Ok(())
}
