// Commands the satellite understands

use crate::core::constants::{
    COMMAND_CHANGE_RADIO_MODULATION, COMMAND_RESET, COMMAND_SEND_JOKE, OSCAR_PING, OSCAR_REPEAT,
};
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Unknown command: {0}")]
    Unknown(String),

    #[error("Unknown OSCAR command: {0}")]
    UnknownOscar(String),

    #[error("No modulation specified. Please provide a modulation type.")]
    MissingModulation,

    #[error("No message specified for repeat command.")]
    MissingRepeatMessage,
}

/// A command that passed authentication
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Reset the flight computer; performed by the caller
    Reset,
    ChangeRadioModulation(String),
    SendJoke,
    /// OSCAR: reply with signal strength
    Ping,
    /// OSCAR: echo the arguments back
    Repeat(String),
}

impl Command {
    /// Parse a command from the authenticated (HMAC or legacy) path
    pub fn parse(name: &str, args: &[String]) -> Result<Self, ParseError> {
        match name {
            COMMAND_RESET => Ok(Command::Reset),
            COMMAND_CHANGE_RADIO_MODULATION => args
                .first()
                .map(|m| Command::ChangeRadioModulation(m.clone()))
                .ok_or(ParseError::MissingModulation),
            COMMAND_SEND_JOKE => Ok(Command::SendJoke),
            other => Err(ParseError::Unknown(other.to_string())),
        }
    }

    /// Parse a command from the OSCAR password path
    pub fn parse_oscar(name: &str, args: &[String]) -> Result<Self, ParseError> {
        match name {
            OSCAR_PING => Ok(Command::Ping),
            OSCAR_REPEAT if args.is_empty() => Err(ParseError::MissingRepeatMessage),
            OSCAR_REPEAT => Ok(Command::Repeat(args.join(" "))),
            other => Err(ParseError::UnknownOscar(other.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Command::Reset => COMMAND_RESET,
            Command::ChangeRadioModulation(_) => COMMAND_CHANGE_RADIO_MODULATION,
            Command::SendJoke => COMMAND_SEND_JOKE,
            Command::Ping => OSCAR_PING,
            Command::Repeat(_) => OSCAR_REPEAT,
        }
    }

    pub fn is_oscar(&self) -> bool {
        matches!(self, Command::Ping | Command::Repeat(_))
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::ChangeRadioModulation(m) => write!(f, "{} {}", self.name(), m),
            Command::Repeat(text) => write!(f, "{} {:?}", self.name(), text),
            _ => f.write_str(self.name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse() {
        assert_eq!(Command::parse("reset", &[]), Ok(Command::Reset));
        assert_eq!(Command::parse("send_joke", &args(&["ignored"])), Ok(Command::SendJoke));
        assert_eq!(
            Command::parse("change_radio_modulation", &args(&["FSK"])),
            Ok(Command::ChangeRadioModulation("FSK".to_string()))
        );
        assert_eq!(
            Command::parse("change_radio_modulation", &[]),
            Err(ParseError::MissingModulation)
        );
        assert_eq!(
            Command::parse("self_destruct", &[]),
            Err(ParseError::Unknown("self_destruct".to_string()))
        );
    }

    #[test]
    fn test_oscar_commands_need_oscar_path() {
        assert!(Command::parse("ping", &[]).is_err());
        assert!(Command::parse_oscar("reset", &[]).is_err());
        assert_eq!(Command::parse_oscar("ping", &[]), Ok(Command::Ping));
        assert_eq!(
            Command::parse_oscar("repeat", &args(&["hello", "world"])),
            Ok(Command::Repeat("hello world".to_string()))
        );
        assert_eq!(Command::parse_oscar("repeat", &[]), Err(ParseError::MissingRepeatMessage));
        assert!(Command::Ping.is_oscar());
        assert!(!Command::Reset.is_oscar());
    }

    #[test]
    fn test_display() {
        assert_eq!(Command::Reset.to_string(), "reset");
        assert_eq!(
            Command::ChangeRadioModulation("LoRa".to_string()).to_string(),
            "change_radio_modulation LoRa"
        );
        assert_eq!(Command::Repeat("hi".to_string()).to_string(), "repeat \"hi\"");
    }
}
