// Packet link seam between the link layer and the radio transport

use crate::core::constants::ACK;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LinkError {
    #[error("Radio error: {0}")]
    Radio(String),
}

pub type Result<T> = std::result::Result<T, LinkError>;

/// Half-duplex packet transport (radio packet manager)
///
/// Implementations own packetization, modulation and retries on the air;
/// this crate only hands them whole payloads.
pub trait PacketLink: Send {
    /// Transmit one payload. Returns false when the radio refused it.
    async fn send(&mut self, data: &[u8]) -> Result<bool>;

    /// Wait up to `timeout` for one payload
    async fn listen(&mut self, timeout: Duration) -> Result<Option<Vec<u8>>>;

    /// Tell the ground station its command was accepted
    async fn send_acknowledgement(&mut self) -> Result<bool> {
        self.send(ACK).await
    }

    /// Signal strength of the last received packet, in dBm
    fn last_rssi(&self) -> Option<i16>;
}
