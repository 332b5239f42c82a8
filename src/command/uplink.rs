// Ground-station side of the command link

use super::envelope::{self, EnvelopeError};
use crate::auth::HmacAuthenticator;
use crate::core::constants::ACK;
use crate::core::SatelliteConfig;
use crate::link::{LinkError, PacketLink};
use serde_json::{Map, Value};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum UplinkError {
    #[error("Link error: {0}")]
    Link(#[from] LinkError),

    #[error("Failed to sign command: {0}")]
    Envelope(#[from] EnvelopeError),

    #[error("No response after {attempts} attempts")]
    NoResponse { attempts: u32 },
}

pub type Result<T> = std::result::Result<T, UplinkError>;

/// Signs and sends commands to one satellite
pub struct Uplink {
    authenticator: HmacAuthenticator,
    cubesat_name: String,
    oscar_password: String,
    counter: u64,
    retries: u32,
    listen_timeout: Duration,
}

impl Uplink {
    /// `last_counter` is the last counter this station used; the next command
    /// goes out with `last_counter + 1`.
    pub fn new(config: &SatelliteConfig, last_counter: u64) -> Self {
        Self {
            authenticator: HmacAuthenticator::new(&config.hmac_secret),
            cubesat_name: config.cubesat_name.clone(),
            oscar_password: config.oscar_password.clone(),
            counter: last_counter,
            retries: config.uplink_retries.max(1),
            listen_timeout: config.listen_timeout(),
        }
    }

    /// Last counter used, for persisting between sessions
    pub fn counter(&self) -> u64 {
        self.counter
    }

    /// Build the next signed command, consuming a counter.
    /// Keys go out as name, command, args (only when present), counter, hmac.
    pub fn build_command(&mut self, command: &str, args: &[String]) -> Result<Map<String, Value>> {
        self.counter += 1;
        let mut body = Map::new();
        body.insert("name".to_string(), Value::from(self.cubesat_name.as_str()));
        body.insert("command".to_string(), Value::from(command));
        if !args.is_empty() {
            body.insert("args".to_string(), Value::from(args.to_vec()));
        }
        Ok(envelope::seal(&self.authenticator, body, self.counter)?)
    }

    /// Build an unsigned amateur-radio command
    pub fn build_oscar_command(&self, command: &str, args: &[String]) -> Map<String, Value> {
        let mut body = Map::new();
        body.insert("password".to_string(), Value::from(self.oscar_password.as_str()));
        body.insert("command".to_string(), Value::from(command));
        body.insert("args".to_string(), Value::from(args.to_vec()));
        body
    }

    /// Sign and send a command, returning the satellite's response
    pub async fn send_command<L: PacketLink>(
        &mut self,
        link: &mut L,
        command: &str,
        args: &[String],
    ) -> Result<Vec<u8>> {
        let message = self.build_command(command, args)?;
        self.transmit(link, &message).await
    }

    pub async fn send_oscar_command<L: PacketLink>(
        &mut self,
        link: &mut L,
        command: &str,
        args: &[String],
    ) -> Result<Vec<u8>> {
        let message = self.build_oscar_command(command, args);
        self.transmit(link, &message).await
    }

    // The same message is resent on every attempt. If the satellite ran it
    // but the ACK was lost, the resend is dropped as a replay.
    async fn transmit<L: PacketLink>(
        &mut self,
        link: &mut L,
        message: &Map<String, Value>,
    ) -> Result<Vec<u8>> {
        let payload = Value::Object(message.clone()).to_string();

        for attempt in 1..=self.retries {
            debug!(attempt, counter = self.counter, "Sending command");
            if !link.send(payload.as_bytes()).await? {
                warn!(attempt, "Radio refused command packet");
                continue;
            }

            match link.listen(self.listen_timeout).await? {
                Some(reply) if reply == ACK => {}
                Some(reply) => {
                    warn!(attempt, reply = %String::from_utf8_lossy(&reply), "Expected ACK");
                    continue;
                }
                None => {
                    warn!(attempt, "No ACK received, retrying");
                    continue;
                }
            }

            match link.listen(self.listen_timeout).await? {
                Some(response) => {
                    info!(attempt, len = response.len(), "Command response received");
                    return Ok(response);
                }
                None => warn!(attempt, "ACK received but no response, retrying"),
            }
        }

        Err(UplinkError::NoResponse {
            attempts: self.retries,
        })
    }
}
