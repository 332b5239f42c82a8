// Satellite-side command handling
// Authenticates uplinked packets, acknowledges them and executes the command

use super::envelope::{self, EnvelopeError};
use super::replay::{ReplayError, ReplayGuard};
use super::types::{Command, ParseError};
use crate::auth::{compare_digest, HmacAuthenticator};
use crate::core::SatelliteConfig;
use crate::link::{LinkError, PacketLink};
use serde_json::{Map, Value};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info, warn};

#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Failed to process command message: {0}")]
    Malformed(String),

    #[error("Message carries no signature and legacy password auth is disabled")]
    Unauthenticated,

    #[error("Invalid password in message")]
    InvalidPassword,

    #[error("Command addressed to {received:?}, this satellite is {expected:?}")]
    NameMismatch {
        expected: String,
        received: Option<String>,
    },

    #[error(transparent)]
    Envelope(#[from] EnvelopeError),

    #[error(transparent)]
    Replay(#[from] ReplayError),

    #[error("No command found in message")]
    MissingCommand,

    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl CommandError {
    /// Text to send back to the ground station. Authentication failures get
    /// no reply so a forger learns nothing.
    pub fn reply(&self) -> Option<String> {
        match self {
            CommandError::Malformed(_) | CommandError::MissingCommand | CommandError::Parse(_) => {
                Some(self.to_string())
            }
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, CommandError>;

/// What happened to one listen window
#[derive(Debug)]
pub enum Outcome {
    /// Nothing was received
    Idle,
    Rejected(CommandError),
    /// Acknowledged and executed. `Command::Reset` still has to be carried
    /// out by the caller.
    Executed(Command),
}

impl Outcome {
    pub fn is_reset(&self) -> bool {
        matches!(self, Outcome::Executed(Command::Reset))
    }
}

/// Owns the satellite config, the authenticator and the replay guard
pub struct CommandHandler {
    config: SatelliteConfig,
    authenticator: HmacAuthenticator,
    replay: ReplayGuard,
    next_joke: usize,
}

impl CommandHandler {
    pub fn new(config: SatelliteConfig) -> Self {
        let authenticator = HmacAuthenticator::new(&config.hmac_secret);
        Self {
            config,
            authenticator,
            replay: ReplayGuard::new(),
            next_joke: 0,
        }
    }

    /// Resume with a replay guard restored from persistent storage
    pub fn with_replay_guard(mut self, replay: ReplayGuard) -> Self {
        self.replay = replay;
        self
    }

    pub fn config(&self) -> &SatelliteConfig {
        &self.config
    }

    /// Counter to persist so replay protection survives a reboot
    pub fn last_accepted_counter(&self) -> Option<u64> {
        self.replay.last_accepted()
    }

    /// Decide whether `packet` is a command this satellite should run
    pub fn authenticate(&mut self, packet: &[u8]) -> Result<Command> {
        let text =
            std::str::from_utf8(packet).map_err(|e| CommandError::Malformed(e.to_string()))?;
        let msg = envelope::parse_object(text).map_err(|e| CommandError::Malformed(e.to_string()))?;

        // Amateur radio operators: fixed password, no counter
        if let Some(password) = msg.get("password").and_then(Value::as_str) {
            if compare_digest(password, &self.config.oscar_password) {
                let (name, args) = command_fields(&msg)?;
                return Ok(Command::parse_oscar(name, &args)?);
            }
        }

        if envelope::is_signed(&msg) {
            let counter = envelope::verify(&self.authenticator, &msg)?;
            self.replay.accept(counter)?;
            self.check_name(&msg)?;
            debug!(counter, "Signature verified");
        } else if self.config.legacy_password_auth {
            let expected = self.config.super_secret_code.as_deref().unwrap_or_default();
            let password = msg.get("password").and_then(Value::as_str).unwrap_or_default();
            if expected.is_empty() || !compare_digest(password, expected) {
                return Err(CommandError::InvalidPassword);
            }
            self.check_name(&msg)?;
        } else {
            return Err(CommandError::Unauthenticated);
        }

        let (name, args) = command_fields(&msg)?;
        Ok(Command::parse(name, &args)?)
    }

    fn check_name(&self, msg: &Map<String, Value>) -> Result<()> {
        let received = msg.get("name").and_then(Value::as_str);
        if received == Some(self.config.cubesat_name.as_str()) {
            Ok(())
        } else {
            Err(CommandError::NameMismatch {
                expected: self.config.cubesat_name.clone(),
                received: received.map(str::to_string),
            })
        }
    }

    /// Authenticate, acknowledge and execute one received packet.
    /// Link failures are returned as errors; everything else is an outcome.
    pub async fn handle_packet<L: PacketLink>(
        &mut self,
        link: &mut L,
        packet: &[u8],
    ) -> std::result::Result<Outcome, LinkError> {
        let command = match self.authenticate(packet) {
            Ok(command) => command,
            Err(err) => {
                debug!(error = %err, len = packet.len(), "Command rejected");
                if let Some(reply) = err.reply() {
                    send_reply(link, &reply).await?;
                }
                return Ok(Outcome::Rejected(err));
            }
        };

        // Give the ground station time to switch to receive
        tokio::time::sleep(self.config.send_delay()).await;
        if !link.send_acknowledgement().await? {
            warn!(%command, "Acknowledgement was not transmitted");
        }

        info!(%command, "Executing command");
        self.execute(link, &command).await?;
        Ok(Outcome::Executed(command))
    }

    /// Listen once for up to `timeout` and handle whatever arrives
    pub async fn listen_for_commands<L: PacketLink>(
        &mut self,
        link: &mut L,
        timeout: Duration,
    ) -> std::result::Result<Outcome, LinkError> {
        match link.listen(timeout).await? {
            Some(packet) => self.handle_packet(link, &packet).await,
            None => Ok(Outcome::Idle),
        }
    }

    async fn execute<L: PacketLink>(
        &mut self,
        link: &mut L,
        command: &Command,
    ) -> std::result::Result<(), LinkError> {
        match command {
            Command::Reset => {
                send_reply(link, "Resetting satellite").await?;
            }
            Command::ChangeRadioModulation(modulation) => {
                match self.config.set_modulation(modulation) {
                    Ok(()) => {
                        info!(modulation = %modulation, "Radio modulation changed");
                        send_reply(link, &format!("Radio modulation changed: {modulation}")).await?;
                    }
                    Err(e) => {
                        error!(error = %e, "Failed to change radio modulation");
                        send_reply(link, &format!("Failed to change radio modulation: {e}"))
                            .await?;
                    }
                }
            }
            Command::SendJoke => {
                if self.config.jokes.is_empty() {
                    warn!("No jokes configured");
                    send_reply(link, "No jokes configured").await?;
                } else {
                    let joke = self.config.jokes[self.next_joke % self.config.jokes.len()].clone();
                    self.next_joke = self.next_joke.wrapping_add(1);
                    send_reply(link, &joke).await?;
                }
            }
            Command::Ping => {
                let rssi = link
                    .last_rssi()
                    .map_or_else(|| "unknown".to_string(), |r| r.to_string());
                send_reply(link, &format!("Pong! {rssi}")).await?;
            }
            Command::Repeat(text) => {
                send_reply(link, text).await?;
            }
        }
        Ok(())
    }
}

async fn send_reply<L: PacketLink>(link: &mut L, reply: &str) -> std::result::Result<(), LinkError> {
    if !link.send(reply.as_bytes()).await? {
        warn!(reply, "Reply was not transmitted");
    }
    Ok(())
}

/// Command name and its arguments rendered as strings
fn command_fields(msg: &Map<String, Value>) -> Result<(&str, Vec<String>)> {
    let name = msg
        .get("command")
        .and_then(Value::as_str)
        .ok_or(CommandError::MissingCommand)?;
    let args = match msg.get("args") {
        Some(Value::Array(values)) => values
            .iter()
            .map(|v| match v {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect(),
        _ => Vec::new(),
    };
    Ok((name, args))
}
