// Telemetry beacon and its sensor seam
pub mod beacon;

pub use beacon::{
    decode_binary_beacon, encode_state, Beacon, BeaconError, BeaconState, BeaconValue,
    ReadingValue, SensorError, SensorReading, SensorResult,
    TelemetrySource,
};
