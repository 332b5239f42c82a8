// Signed JSON command envelope
// {"name":..,"command":..,"args":[..],"counter":N,"hmac":"<64 hex>"}
// The signed message is the compact JSON of the object without "hmac",
// keys in the order they were sent, non-ASCII escaped as \uXXXX

use crate::auth::HmacAuthenticator;
use serde::Serialize;
use serde_json::ser::Formatter;
use serde_json::{Map, Value};
use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EnvelopeError {
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Command message is not a JSON object")]
    NotAnObject,

    #[error("Invalid counter: {0}")]
    InvalidCounter(String),

    #[error("Missing field: {0}")]
    MissingField(&'static str),

    #[error("Signature does not match")]
    InvalidSignature,
}

pub type Result<T> = std::result::Result<T, EnvelopeError>;

pub const FIELD_COUNTER: &str = "counter";
pub const FIELD_HMAC: &str = "hmac";

/// Parse a packet into a JSON object
pub fn parse_object(text: &str) -> Result<Map<String, Value>> {
    match serde_json::from_str(text)? {
        Value::Object(map) => Ok(map),
        _ => Err(EnvelopeError::NotAnObject),
    }
}

/// Compact JSON of `body` as it is signed.
///
/// Keys keep insertion order (the order they arrived in, for a received
/// packet) and every non-ASCII character is written as a lowercase `\uXXXX`
/// escape, so the bytes match what the ground station's encoder signed.
pub fn canonical_message(body: &Map<String, Value>) -> Result<String> {
    let mut out = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, AsciiFormatter);
    body.serialize(&mut serializer)?;
    // Only ASCII is ever written
    Ok(String::from_utf8_lossy(&out).into_owned())
}

/// Compact formatter that escapes everything outside ASCII
struct AsciiFormatter;

impl Formatter for AsciiFormatter {
    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        let mut units = [0u16; 2];
        for c in fragment.chars() {
            if c.is_ascii() {
                writer.write_all(&[c as u8])?;
            } else {
                for unit in c.encode_utf16(&mut units) {
                    write!(writer, "\\u{:04x}", unit)?;
                }
            }
        }
        Ok(())
    }
}

/// True when the message carries both a counter and a signature
pub fn is_signed(msg: &Map<String, Value>) -> bool {
    msg.contains_key(FIELD_COUNTER) && msg.contains_key(FIELD_HMAC)
}

/// Read the counter as a non-negative integer; numeric strings are accepted
pub fn parse_counter(value: &Value) -> Result<u64> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .ok_or_else(|| EnvelopeError::InvalidCounter(n.to_string())),
        Value::String(s) => s
            .trim()
            .parse::<u64>()
            .map_err(|_| EnvelopeError::InvalidCounter(s.clone())),
        other => Err(EnvelopeError::InvalidCounter(other.to_string())),
    }
}

/// Append `counter` to `body` and sign it, producing the object to transmit.
/// `counter` goes last unless `body` already carries one.
pub fn seal(
    authenticator: &HmacAuthenticator,
    mut body: Map<String, Value>,
    counter: u64,
) -> Result<Map<String, Value>> {
    body.shift_remove(FIELD_HMAC);
    body.insert(FIELD_COUNTER.to_string(), Value::from(counter));
    let signature = authenticator.generate_hmac(&canonical_message(&body)?, counter);
    body.insert(FIELD_HMAC.to_string(), Value::String(signature));
    Ok(body)
}

/// Verify the signature of a received message and return its counter.
/// Replay checks are the caller's job.
pub fn verify(authenticator: &HmacAuthenticator, msg: &Map<String, Value>) -> Result<u64> {
    let counter = parse_counter(msg.get(FIELD_COUNTER).ok_or(EnvelopeError::MissingField(FIELD_COUNTER))?)?;
    let signature = msg
        .get(FIELD_HMAC)
        .and_then(Value::as_str)
        .ok_or(EnvelopeError::MissingField(FIELD_HMAC))?;

    // shift_remove keeps the remaining keys in arrival order
    let mut body = msg.clone();
    body.shift_remove(FIELD_HMAC);

    if authenticator.verify_hmac(&canonical_message(&body)?, counter, signature) {
        Ok(counter)
    } else {
        Err(EnvelopeError::InvalidSignature)
    }
}

/// Parse and verify a received packet in one step
pub fn open(
    authenticator: &HmacAuthenticator,
    packet: &[u8],
) -> Result<(Map<String, Value>, u64)> {
    let msg = match serde_json::from_slice(packet)? {
        Value::Object(map) => map,
        _ => return Err(EnvelopeError::NotAnObject),
    };
    let counter = verify(authenticator, &msg)?;
    Ok((msg, counter))
}
