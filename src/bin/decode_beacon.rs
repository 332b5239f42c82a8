//! Beacon decoding utility
//! Decodes a captured telemetry record and prints its fields in wire order

use anyhow::Context;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use pysquared_rs::formats::{load_capture, CaptureMetadata, KeyMap};
use pysquared_rs::telemetry::decode_binary_beacon;
use std::env;
use tracing_subscriber::{fmt::format::FmtSpan, prelude::*, EnvFilter};

fn main() -> anyhow::Result<()> {
    let filter_layer = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;

    let format_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::NONE);

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(format_layer)
        .init();

    let mut args: Vec<String> = env::args().collect();
    let base64_input = match args.iter().position(|a| a == "--base64") {
        Some(idx) => {
            args.remove(idx);
            true
        }
        None => false,
    };

    if args.len() < 2 || args.len() > 3 {
        eprintln!("Usage: {} [--base64] <capture file> [key_map.json]", args[0]);
        eprintln!("\nExamples:");
        eprintln!("  {} beacon.cap                 # Capture file with embedded key map", args[0]);
        eprintln!("  {} beacon.bin keys.json       # Raw record plus key map sidecar", args[0]);
        eprintln!("  {} --base64 beacon.txt        # Base64 text of a raw record", args[0]);
        std::process::exit(1);
    }

    let input = &args[1];
    let (record, metadata) = if base64_input {
        let text = std::fs::read_to_string(input).with_context(|| format!("reading {input}"))?;
        let record = STANDARD
            .decode(text.trim())
            .with_context(|| format!("{input} is not valid base64"))?;
        (record, CaptureMetadata::default())
    } else {
        load_capture(input).with_context(|| format!("loading {input}"))?
    };

    let mut key_map = metadata.key_map.clone();
    if let Some(path) = args.get(2) {
        let sidecar = KeyMap::load(path).with_context(|| format!("loading key map {path}"))?;
        key_map.merge(&sidecar);
    }

    tracing::info!(
        bytes = record.len(),
        keys = key_map.len(),
        "Decoding beacon"
    );
    if !metadata.cubesat_name.is_empty() {
        println!("Satellite: {}", metadata.cubesat_name);
    }
    if let Some(at) = metadata.captured_at {
        println!("Captured:  {}", at.format("%Y-%m-%d %H:%M:%S UTC"));
    }
    if let Some(rssi) = metadata.rssi {
        println!("RSSI:      {} dBm", rssi);
    }

    let decoded = decode_binary_beacon(&record, (!key_map.is_empty()).then_some(&key_map));
    println!("Fields:    {}\n", decoded.len());

    let width = decoded.fields().map(|(name, _)| name.len()).max().unwrap_or(0);
    for (name, value) in decoded.fields() {
        println!("{:<width$}  {:>8}  {}", name, value.tag(), value, width = width);
    }

    if !decoded.is_complete() {
        tracing::warn!(
            consumed = decoded.consumed(),
            total = record.len(),
            "Record is truncated or malformed; trailing bytes ignored"
        );
    }

    Ok(())
}
