// Constants shared by the telemetry codec, the authenticator and command handling

/// Bytes in a field header: 4-byte key hash followed by the 1-byte type tag
pub const FIELD_HEADER_LEN: usize = 5;

/// Longest string payload a single length byte can describe
pub const MAX_STRING_LEN: usize = 255;

/// Prefix of the synthesized name for a hash missing from the key map
pub const PLACEHOLDER_PREFIX: &str = "field_";

/// Separator between message and counter in the HMAC signing input
pub const COUNTER_SEPARATOR: char = '|';

/// Length of a rendered HMAC-SHA256 signature (32 bytes as hex)
pub const SIGNATURE_HEX_LEN: usize = 64;

/// Payload sent back to the ground station before a command runs
pub const ACK: &[u8] = b"ACK";

/// Radio modulations the transport collaborator knows how to switch to
pub const MODULATIONS: &[&str] = &["LoRa", "FSK"];

/// Password accepted for amateur-radio (OSCAR) commands when none is configured
pub const DEFAULT_OSCAR_PASSWORD: &str = "Hello World!";

// Command names as they appear in the JSON `command` field
pub const COMMAND_RESET: &str = "reset";
pub const COMMAND_CHANGE_RADIO_MODULATION: &str = "change_radio_modulation";
pub const COMMAND_SEND_JOKE: &str = "send_joke";
pub const OSCAR_PING: &str = "ping";
pub const OSCAR_REPEAT: &str = "repeat";
