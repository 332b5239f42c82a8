// Mock packet link for testing without a radio

use super::traits::{LinkError, PacketLink, Result};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// In-memory link: queued inbound packets, recorded outbound packets
#[derive(Clone, Default)]
pub struct MockLink {
    /// Packets to be received (simulates the other end transmitting)
    inbound: Arc<Mutex<VecDeque<Vec<u8>>>>,

    /// Packets that were sent
    sent: Arc<Mutex<Vec<Vec<u8>>>>,

    rssi: Option<i16>,

    /// Refuse every send with this error message
    fail_sends: Option<String>,
}

impl MockLink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rssi(mut self, rssi: i16) -> Self {
        self.rssi = Some(rssi);
        self
    }

    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.fail_sends = Some(message.into());
        self
    }

    /// Queue a packet for the next `listen`
    pub fn push_inbound(&self, packet: &[u8]) {
        self.inbound.lock().unwrap().push_back(packet.to_vec());
    }

    /// Everything sent so far
    pub fn sent(&self) -> Vec<Vec<u8>> {
        self.sent.lock().unwrap().clone()
    }

    /// Sent packets decoded as text
    pub fn sent_text(&self) -> Vec<String> {
        self.sent()
            .iter()
            .map(|packet| String::from_utf8_lossy(packet).into_owned())
            .collect()
    }

    pub fn pending_inbound(&self) -> usize {
        self.inbound.lock().unwrap().len()
    }
}

impl PacketLink for MockLink {
    async fn send(&mut self, data: &[u8]) -> Result<bool> {
        if let Some(message) = &self.fail_sends {
            return Err(LinkError::Radio(message.clone()));
        }
        self.sent.lock().unwrap().push(data.to_vec());
        Ok(true)
    }

    // An empty queue behaves like a listen window that elapsed with nothing heard
    async fn listen(&mut self, _timeout: Duration) -> Result<Option<Vec<u8>>> {
        tokio::task::yield_now().await;
        Ok(self.inbound.lock().unwrap().pop_front())
    }

    fn last_rssi(&self) -> Option<i16> {
        self.rssi
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::constants::ACK;

    #[tokio::test]
    async fn test_mock_link_basic() {
        let mut link = MockLink::new();
        link.push_inbound(b"hello");

        let packet = link.listen(Duration::from_secs(1)).await.unwrap();
        assert_eq!(packet.as_deref(), Some(b"hello".as_slice()));
        assert_eq!(link.listen(Duration::from_secs(1)).await.unwrap(), None);

        assert!(link.send(b"world").await.unwrap());
        assert_eq!(link.sent(), vec![b"world".to_vec()]);
    }

    #[tokio::test]
    async fn test_mock_link_ack() {
        let mut link = MockLink::new();
        link.send_acknowledgement().await.unwrap();
        assert_eq!(link.sent(), vec![ACK.to_vec()]);
    }

    #[tokio::test]
    async fn test_mock_link_failure() {
        let mut link = MockLink::new().failing("transmitter off");
        assert!(matches!(link.send(b"x").await, Err(LinkError::Radio(_))));
        assert!(link.sent().is_empty());
    }

    #[tokio::test]
    async fn test_clones_share_queues() {
        let link = MockLink::new().with_rssi(-97);
        let mut other = link.clone();
        link.push_inbound(b"shared");

        assert_eq!(other.listen(Duration::ZERO).await.unwrap(), Some(b"shared".to_vec()));
        assert_eq!(link.pending_inbound(), 0);
        assert_eq!(other.last_rssi(), Some(-97));
    }
}
